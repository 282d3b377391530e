use sqlparser::dialect::dialect_from_str;
use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::{Token, Tokenizer};
use thiserror::Error;

/// Outcome of checking a query. Invalid SQL is an ordinary result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxCheck {
    Valid,
    Invalid { diagnostic: String },
}

impl SyntaxCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, SyntaxCheck::Valid)
    }
}

/// The validator could not reach a verdict.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("unsupported SQL dialect: {0}")]
    UnknownDialect(String),
    #[error("SQL validator aborted: {0}")]
    Aborted(String),
}

pub trait SqlValidator: Send + Sync {
    fn validate(&self, sql: &str) -> Result<SyntaxCheck, ValidatorError>;
}

/// Parses with `sqlparser` in the configured dialect.
pub struct SqlParserValidator {
    dialect: String,
}

impl SqlParserValidator {
    pub fn new(dialect: &str) -> Result<Self, ValidatorError> {
        if dialect_from_str(dialect).is_none() {
            return Err(ValidatorError::UnknownDialect(dialect.to_string()));
        }
        Ok(Self {
            dialect: dialect.to_string(),
        })
    }
}

impl SqlValidator for SqlParserValidator {
    fn validate(&self, sql: &str) -> Result<SyntaxCheck, ValidatorError> {
        let dialect = dialect_from_str(&self.dialect)
            .ok_or_else(|| ValidatorError::UnknownDialect(self.dialect.clone()))?;

        let tokens = match Tokenizer::new(dialect.as_ref(), sql).tokenize() {
            Ok(tokens) => tokens,
            Err(e) => {
                return Ok(SyntaxCheck::Invalid {
                    diagnostic: e.to_string(),
                })
            }
        };

        let statements = Parser::new(dialect.as_ref())
            .with_tokens(strip_collation_directive(tokens))
            .parse_statements();

        match statements {
            Ok(statements) if statements.is_empty() => Ok(SyntaxCheck::Invalid {
                diagnostic: "no SQL statement found".to_string(),
            }),
            Ok(_) => Ok(SyntaxCheck::Valid),
            Err(ParserError::RecursionLimitExceeded) => Err(ValidatorError::Aborted(
                "recursion limit exceeded".to_string(),
            )),
            Err(e) => Ok(SyntaxCheck::Invalid {
                diagnostic: e.to_string(),
            }),
        }
    }
}

fn is_insignificant(token: &Token) -> bool {
    matches!(token, Token::Whitespace(_) | Token::EOF)
}

fn last_significant(tokens: &[Token], before: usize) -> Option<usize> {
    tokens[..before].iter().rposition(|token| !is_insignificant(token))
}

/// Drops a trailing `COLLATE <name>` so the case-insensitivity directive parses
/// even where it follows a statement terminator or a table name.
fn strip_collation_directive(mut tokens: Vec<Token>) -> Vec<Token> {
    let Some(name_at) = last_significant(&tokens, tokens.len()) else {
        return tokens;
    };
    let Some(collate_at) = last_significant(&tokens, name_at) else {
        return tokens;
    };

    if let (Token::Word(collate), Token::Word(_)) = (&tokens[collate_at], &tokens[name_at]) {
        if collate.keyword == Keyword::COLLATE {
            tokens.truncate(collate_at);
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(sql: &str) -> SyntaxCheck {
        SqlParserValidator::new("generic").unwrap().validate(sql).unwrap()
    }

    #[test]
    fn well_formed_statements_are_valid() {
        let cases = [
            "SELECT * FROM t;",
            "SELECT * FROM users;",
            "SELECT name FROM users WHERE age > 25 ORDER BY name;",
            "INSERT INTO users (name, age) VALUES ('John Doe', 30);",
            "SELECT * FROM users WHERE name LIKE '%John%'",
            "UPDATE users SET age = 35 WHERE name = 'Jane Doe';",
            "DELETE FROM users WHERE age < 18;",
        ];

        for sql in cases {
            assert_eq!(check(sql), SyntaxCheck::Valid, "sql: {sql}");
        }
    }

    #[test]
    fn prose_is_invalid_with_a_diagnostic() {
        for text in ["not sql at all", "INVALID SQL QUERY"] {
            match check(text) {
                SyntaxCheck::Invalid { diagnostic } => assert!(!diagnostic.is_empty()),
                SyntaxCheck::Valid => panic!("{text:?} should not parse"),
            }
        }
    }

    #[test]
    fn unterminated_string_is_invalid() {
        assert!(!check("SELECT * FROM users WHERE name = 'oops").is_valid());
    }

    #[test]
    fn collation_directive_is_accepted() {
        assert!(check("SELECT * FROM t; COLLATE NOCASE ").is_valid());
        assert!(check("SELECT * FROM users COLLATE NOCASE ").is_valid());
        assert!(check("SELECT * FROM cars WHERE car_name = 'ford torino' COLLATE NOCASE ").is_valid());
        assert!(!check("not sql at all COLLATE NOCASE ").is_valid());
    }

    #[test]
    fn collation_suffix_tokens_are_dropped_across_whitespace() {
        let dialect = dialect_from_str("generic").unwrap();
        let tokens = Tokenizer::new(dialect.as_ref(), "SELECT 1;  COLLATE\tNOCASE \n")
            .tokenize()
            .unwrap();

        let kept = strip_collation_directive(tokens);

        let last = kept.iter().rev().find(|token| !is_insignificant(token));
        assert_eq!(last, Some(&Token::SemiColon));
    }

    #[test]
    fn empty_text_is_invalid() {
        assert!(!check("").is_valid());
        assert!(!check(" COLLATE NOCASE ").is_valid());
    }

    #[test]
    fn deeply_nested_expression_aborts_validation() {
        let depth = 200;
        let sql = format!("SELECT {}1{}", "(".repeat(depth), ")".repeat(depth));

        let result = SqlParserValidator::new("generic").unwrap().validate(&sql);

        assert!(matches!(result, Err(ValidatorError::Aborted(_))));
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        assert!(matches!(
            SqlParserValidator::new("cobol"),
            Err(ValidatorError::UnknownDialect(_))
        ));
        assert!(SqlParserValidator::new("sqlite").is_ok());
    }
}
