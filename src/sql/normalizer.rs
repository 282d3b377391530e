use regex::Regex;
use std::sync::LazyLock;

/// Appended to every normalized query so comparisons ignore letter case.
pub const CASE_INSENSITIVE_SUFFIX: &str = " COLLATE NOCASE ";

// Opening fence with an optional language tag, e.g. "```sql\n", anywhere in the text
static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*[ \t]*\r?\n").expect("valid fence pattern"));

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?[ \t]*```\s*$").expect("valid fence pattern"));

/// Removes markdown fences and stray backticks, then trims.
pub fn strip_fences(raw: &str) -> String {
    let text = OPENING_FENCE.replace_all(raw, "");
    let text = CLOSING_FENCE.replace(&text, "");
    text.replace('`', "").trim().to_string()
}

pub fn add_case_insensitivity(sql: &str) -> String {
    format!("{}{}", sql, CASE_INSENSITIVE_SUFFIX)
}

/// Cleans a raw completion into SQL text.
///
/// The suffix is appended on every call, so normalizing twice appends it twice.
pub fn normalize(raw: &str) -> String {
    add_case_insensitivity(&strip_fences(raw))
}
