use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:sql)?").expect("valid fence pattern"));

static FORBIDDEN_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(INSERT|UPDATE|DELETE|DROP|ALTER|TRUNCATE|CREATE|GRANT|REVOKE)\b")
        .expect("valid keyword pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqlValidationError {
    #[error("Generated SQL is empty")]
    Empty,
    #[error("Only SELECT queries are allowed, got statement starting with '{0}'")]
    NotReadOnly(String),
    #[error("Multiple SQL statements are not allowed")]
    MultipleStatements,
    #[error("Forbidden keyword in generated SQL: {0}")]
    ForbiddenKeyword(String),
}

/// SQL produced by the language model after cleaning and read-only validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GeneratedSql(String);

impl GeneratedSql {
    /// Strips markdown code fences, SQL comments and surrounding whitespace.
    pub fn clean(raw: &str) -> String {
        let unfenced = CODE_FENCE.replace_all(raw, "");
        strip_comments(&unfenced).trim().to_string()
    }

    pub fn parse(raw: &str) -> Result<Self, SqlValidationError> {
        let cleaned = Self::clean(raw);
        let statement = cleaned.trim_end_matches(|c: char| c == ';' || c.is_whitespace());

        if statement.is_empty() {
            return Err(SqlValidationError::Empty);
        }

        if statement.contains(';') {
            return Err(SqlValidationError::MultipleStatements);
        }

        let first_word = statement
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_uppercase();
        if first_word != "SELECT" && first_word != "WITH" {
            return Err(SqlValidationError::NotReadOnly(first_word));
        }

        if let Some(found) = FORBIDDEN_KEYWORD.find(statement) {
            return Err(SqlValidationError::ForbiddenKeyword(
                found.as_str().to_uppercase(),
            ));
        }

        Ok(Self(statement.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Removes `--` and (nested) `/* */` comments outside quoted literals and identifiers.
fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('\'', _) | ('"', _) => {
                quote = Some(c);
                out.push(c);
            }
            ('-', Some('-')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut depth = 1;
                while depth > 0 {
                    match (chars.next(), chars.peek()) {
                        (Some('*'), Some('/')) => {
                            chars.next();
                            depth -= 1;
                        }
                        (Some('/'), Some('*')) => {
                            chars.next();
                            depth += 1;
                        }
                        (Some(_), _) => {}
                        (None, _) => break,
                    }
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

impl std::fmt::Display for GeneratedSql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
