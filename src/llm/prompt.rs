const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant to convert text to \
SQL query.Answer exactly in one line from the schema. \
Generate a single SQL query for the question from schema below : ";

/// Renders the instruction template with its two slots filled.
///
/// Schema and retrieved examples share the single `schema` slot.
pub fn render(question: &str, schema: &str) -> String {
    format!(
        "### System: \n {SYSTEM_INSTRUCTION}{schema} \n### User: \n{question}\n### Assistant:\n "
    )
}

pub fn build_prompt(question: &str, schema: &str, examples: &str) -> String {
    render(question, &format!("{schema}{examples}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_layout() {
        let prompt = render("how many cars?", "CREATE TABLE cars(id INT);");

        assert_eq!(
            prompt,
            "### System: \n You are a helpful assistant to convert text to SQL query.\
Answer exactly in one line from the schema. Generate a single SQL query for the question \
from schema below : CREATE TABLE cars(id INT); \n### User: \nhow many cars?\n### Assistant:\n "
        );
    }

    #[test]
    fn examples_follow_schema_in_the_same_slot() {
        let examples = "{\n    'question': 'q',\n    'sql_query': 's'\n}";
        let prompt = build_prompt("count rows", "SCHEMA", examples);

        assert!(prompt.contains(&format!("SCHEMA{examples} \n### User: \ncount rows")));
    }

    #[test]
    fn empty_examples_leave_schema_untouched() {
        assert_eq!(build_prompt("q", "SCHEMA", ""), render("q", "SCHEMA"));
    }
}
