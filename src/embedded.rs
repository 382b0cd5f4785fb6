//! Reindenting SQL held in Go raw-string literals.
//!
//! Only backtick literals passed directly to one of the configured methods
//! (`db.Exec(`...`)`, `db.QueryContext(ctx, `...`)`) are touched. Everything
//! else in the document is copied through byte for byte.

use memchr::memchr;
use regex::Regex;
use tracing::warn;

use crate::api::format;
use crate::error::{FormatError, SqlreindentError};
use crate::mode::FormatOptions;

/// A literal that could not be reindented and was left as it was.
#[derive(Debug)]
pub struct LiteralFailure {
    /// Byte offset of the literal body in the source.
    pub offset: usize,
    pub error: FormatError,
}

/// Outcome of rewriting one source document.
#[derive(Debug)]
pub struct Rewrite {
    pub text: String,
    /// Literals whose text changed.
    pub replaced: usize,
    pub failures: Vec<LiteralFailure>,
}

/// Join alternatives into a non-capturing regex group.
fn group(alternatives: &[String]) -> String {
    format!("(?:{})", alternatives.join("|"))
}

/// Match a call to one of `methods` up to and including the backtick that
/// opens its SQL argument.
pub fn call_pattern(methods: &[String]) -> Result<Regex, SqlreindentError> {
    if methods.is_empty() {
        return Err(SqlreindentError::Config(
            "no methods configured for embedded SQL".to_string(),
        ));
    }
    let mut names: Vec<String> = methods.iter().map(|m| regex::escape(m)).collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    let pattern = format!(
        r"\.{}(?:Context\(\s*[A-Za-z_][A-Za-z0-9_.]*\s*,|\()\s*`",
        group(&names)
    );
    Regex::new(&pattern)
        .map_err(|e| SqlreindentError::Config(format!("invalid method name pattern: {}", e)))
}

/// Reindent every matching SQL literal in `source`.
pub fn rewrite_source(
    source: &str,
    options: &FormatOptions,
    methods: &[String],
) -> Result<Rewrite, SqlreindentError> {
    let pattern = call_pattern(methods)?;
    let bytes = source.as_bytes();
    let mut text = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut replaced = 0;
    let mut failures = Vec::new();

    for call in pattern.find_iter(source) {
        // A match ending on a literal's closing backtick.
        if call.start() < cursor {
            continue;
        }
        let open = call.end();
        let Some(len) = memchr(b'`', &bytes[open..]) else {
            break;
        };
        let close = open + len;
        text.push_str(&source[cursor..open]);
        cursor = close;

        let literal = &source[open..close];
        let body = literal.trim();
        if body.is_empty() {
            text.push_str(literal);
            continue;
        }
        match format(body, options) {
            Ok(formatted) => {
                let lead = &literal[..literal.len() - literal.trim_start().len()];
                let trail = &literal[literal.trim_end().len()..];
                text.push_str(lead);
                text.push_str(&formatted);
                text.push_str(trail);
                if formatted != body {
                    replaced += 1;
                }
            }
            Err(error) => {
                warn!(offset = open, %error, literal = body, "leaving SQL literal unchanged");
                text.push_str(literal);
                failures.push(LiteralFailure {
                    offset: open,
                    error,
                });
            }
        }
    }
    text.push_str(&source[cursor..]);

    Ok(Rewrite {
        text,
        replaced,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn methods() -> Vec<String> {
        vec!["Exec".to_string(), "Query".to_string(), "QueryRow".to_string()]
    }

    fn rewrite(source: &str) -> Rewrite {
        rewrite_source(source, &FormatOptions::default(), &methods()).unwrap()
    }

    #[test]
    fn test_call_pattern() {
        let re = call_pattern(&methods()).unwrap();
        assert!(re.is_match("db.Exec(`"));
        assert!(re.is_match("tx.QueryRow( `"));
        assert!(re.is_match("db.QueryContext(ctx, `"));
        assert!(re.is_match("db.ExecContext(r.Context, `"));
        assert!(!re.is_match("db.Exec(query)"));
        assert!(!re.is_match("db.Exec(\"SELECT 1\")"));
        assert!(!re.is_match("Exec(`"));
    }

    #[test]
    fn test_no_methods_is_config_error() {
        assert!(matches!(
            call_pattern(&[]),
            Err(SqlreindentError::Config(_))
        ));
    }

    #[test]
    fn test_rewrites_literal() {
        let result = rewrite("rows, err := db.Query(`select a, b from t`)\n");
        assert_eq!(
            result.text,
            "rows, err := db.Query(`SELECT\n  a,\n  b\nFROM t`)\n"
        );
        assert_eq!(result.replaced, 1);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_keeps_surrounding_whitespace() {
        let result = rewrite("db.Exec(`\n\tdelete from t\n`)");
        assert_eq!(result.text, "db.Exec(`\n\tDELETE\nFROM t\n`)");
    }

    #[test]
    fn test_context_variant_and_args() {
        let result = rewrite("db.QueryRowContext(ctx, `select a from t where id = $1`, id)");
        assert_eq!(
            result.text,
            "db.QueryRowContext(ctx, `SELECT\n  a\nFROM t\nWHERE id = $1`, id)"
        );
    }

    #[test]
    fn test_failure_leaves_literal_and_continues() {
        let source = "db.Exec(`select 'oops`)\ndb.Exec(`select 1`)";
        let result = rewrite(source);
        assert_eq!(result.text, "db.Exec(`select 'oops`)\ndb.Exec(`SELECT\n  1`)");
        assert_eq!(result.replaced, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].offset, 9);
        assert!(matches!(result.failures[0].error, FormatError::Lex(_)));
    }

    #[test]
    fn test_untouched_without_calls() {
        let source = "package main\n\nvar q = `select 1`\n";
        let result = rewrite(source);
        assert_eq!(result.text, source);
        assert_eq!(result.replaced, 0);
    }

    #[test]
    fn test_unterminated_literal_is_copied() {
        let source = "db.Exec(`select 1";
        assert_eq!(rewrite(source).text, source);
    }

    #[test]
    fn test_formatted_source_is_stable() {
        let once = rewrite("db.Exec(`update t set a = 1, b = 2 where id = $1`)").text;
        let twice = rewrite(&once);
        assert_eq!(twice.text, once);
        assert_eq!(twice.replaced, 0);
    }
}
