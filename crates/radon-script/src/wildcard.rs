//! The wildcard engine.
//!
//! A wildcard is a 3-character placeholder `\N\` with `N ∈ 0..=9`, embeddable
//! in any string field (URL, HTTP body, header name/value) and in string
//! parameters of nested scripts. Three pure operations are defined over it:
//!
//! - **count**: `args_count` = `1 + max(N)` over every token found (0 if none)
//! - **replace**: substitute every token positionally from a value slice
//! - **splice**: substitute one index and renumber every higher index down
//!   by one (used exclusively by Modal provider expansion)
//!
//! At most 10 indices (`0`–`9`) are supported. A backslash-delimited run of
//! two or more digits (`\10\` and up) is an explicit validation error, never
//! a silent skip.

use crate::error::{Result, ScriptError};

/// Number of supported wildcard indices (`0`–`9`).
pub const WILDCARD_LIMIT: usize = 10;

/// A parsed fragment of a wildcard-bearing string.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    /// Verbatim text between tokens.
    Literal(&'a str),
    /// A `\N\` token.
    Token(u32),
}

/// Split a string into literal runs and wildcard tokens.
///
/// A lone backslash, or a backslash not followed by `digits + backslash`, is
/// literal text. A multi-digit run (`\10\`) is a range error.
fn parse_pieces(s: &str) -> Result<Vec<Piece<'_>>> {
    let bytes = s.as_bytes();
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let digits_start = i + 1;
            let mut j = digits_start;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > digits_start && j < bytes.len() && bytes[j] == b'\\' {
                let digits = &s[digits_start..j];
                if digits.len() > 1 {
                    // `\10\` and up name a real out-of-range index; leading
                    // zeros (`\00\`) and overflows are malformed tokens.
                    return Err(match digits.parse::<u32>() {
                        Ok(index) if index as usize >= WILDCARD_LIMIT => {
                            ScriptError::WildcardOutOfRange { index }
                        }
                        _ => ScriptError::MalformedWildcard {
                            token: format!("\\{digits}\\"),
                        },
                    });
                }
                if literal_start < i {
                    pieces.push(Piece::Literal(&s[literal_start..i]));
                }
                // Single ASCII digit, parse cannot fail.
                pieces.push(Piece::Token(digits.parse::<u32>().unwrap_or(0)));
                i = j + 1;
                literal_start = i;
                continue;
            }
        }
        i += 1;
    }
    if literal_start < bytes.len() {
        pieces.push(Piece::Literal(&s[literal_start..]));
    }
    Ok(pieces)
}

/// `1 + max(N)` over every wildcard token in the string; 0 if none.
pub fn args_count(s: &str) -> Result<usize> {
    let mut count = 0;
    for piece in parse_pieces(s)? {
        if let Piece::Token(index) = piece {
            count = count.max(index as usize + 1);
        }
    }
    Ok(count)
}

/// Replace every wildcard token positionally from `values`.
///
/// Fails with [`ScriptError::ArityMismatch`] when any token's index has no
/// corresponding value; insufficient arguments are never silently left in
/// place.
pub fn replace<S: AsRef<str>>(s: &str, values: &[S]) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    for piece in parse_pieces(s)? {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Token(index) => {
                let value = values.get(index as usize).ok_or(ScriptError::ArityMismatch {
                    expected: index as usize + 1,
                    actual: values.len(),
                })?;
                out.push_str(value.as_ref());
            }
        }
    }
    Ok(out)
}

/// Replace wildcard `index` with `value` and renumber every higher index
/// down by one. Lower indices are untouched.
pub fn splice(s: &str, index: u32, value: &str) -> Result<String> {
    if index as usize >= WILDCARD_LIMIT {
        return Err(ScriptError::WildcardOutOfRange { index });
    }
    let mut out = String::with_capacity(s.len());
    for piece in parse_pieces(s)? {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Token(n) if n == index => out.push_str(value),
            Piece::Token(n) if n > index => {
                out.push('\\');
                out.push_str(&(n - 1).to_string());
                out.push('\\');
            }
            Piece::Token(n) => {
                out.push('\\');
                out.push_str(&n.to_string());
                out.push('\\');
            }
        }
    }
    Ok(out)
}

/// Whether the string contains the given wildcard index.
pub fn contains(s: &str, index: u32) -> Result<bool> {
    Ok(parse_pieces(s)?
        .iter()
        .any(|piece| matches!(piece, Piece::Token(n) if *n == index)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_count_empty_and_plain() {
        assert_eq!(args_count("").unwrap(), 0);
        assert_eq!(args_count("https://example.com/price").unwrap(), 0);
    }

    #[test]
    fn test_args_count_is_one_plus_max_index() {
        assert_eq!(args_count("https://x/\\0\\").unwrap(), 1);
        assert_eq!(args_count("\\0\\-\\3\\").unwrap(), 4);
        // Repeats do not inflate the count.
        assert_eq!(args_count("\\1\\ and \\1\\").unwrap(), 2);
    }

    #[test]
    fn test_lone_backslash_is_literal() {
        assert_eq!(args_count("C:\\path\\file").unwrap(), 0);
        assert_eq!(replace::<&str>("a\\b", &[]).unwrap(), "a\\b");
    }

    #[test]
    fn test_multi_digit_index_is_an_error() {
        assert_eq!(
            args_count("\\10\\"),
            Err(ScriptError::WildcardOutOfRange { index: 10 })
        );
        assert_eq!(
            replace("\\12\\", &["a"]),
            Err(ScriptError::WildcardOutOfRange { index: 12 })
        );
    }

    /// A leading-zero token is malformed, not a bogus "index 0 out of
    /// range" report; overflowing digit runs get the same treatment.
    #[test]
    fn test_leading_zero_token_is_malformed() {
        assert_eq!(
            args_count("\\00\\"),
            Err(ScriptError::MalformedWildcard {
                token: "\\00\\".to_string()
            })
        );
        assert_eq!(
            args_count("\\09\\"),
            Err(ScriptError::MalformedWildcard {
                token: "\\09\\".to_string()
            })
        );
        assert!(matches!(
            args_count("\\99999999999\\"),
            Err(ScriptError::MalformedWildcard { .. })
        ));
    }

    #[test]
    fn test_replace_positionally() {
        assert_eq!(
            replace("https://x/\\0\\?vs=\\1\\", &["BTC", "USD"]).unwrap(),
            "https://x/BTC?vs=USD"
        );
    }

    #[test]
    fn test_replace_fails_on_missing_value() {
        assert_eq!(
            replace("\\0\\ \\1\\", &["only one"]),
            Err(ScriptError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_replace_with_extra_values_is_fine() {
        // Extra values are harmless here; retrieval-level folding checks the
        // other direction of the arity.
        assert_eq!(replace("\\0\\", &["a", "b"]).unwrap(), "a");
    }

    /// Two `\0\` occurrences plus one `\1\`: splicing index 0 substitutes
    /// both occurrences and leaves `\0\` (renumbered from `\1\`) as the
    /// sole remaining wildcard.
    #[test]
    fn test_splice_renumbers_higher_indices() {
        let spliced = splice("\\0\\x\\0\\y\\1\\", 0, "P").unwrap();
        assert_eq!(spliced, "PxPy\\0\\");
        assert_eq!(args_count(&spliced).unwrap(), 1);
    }

    #[test]
    fn test_splice_leaves_lower_indices_alone() {
        assert_eq!(splice("\\0\\-\\2\\", 2, "Z").unwrap(), "\\0\\-Z");
    }

    #[test]
    fn test_splice_out_of_range_index() {
        assert_eq!(
            splice("anything", 10, "v"),
            Err(ScriptError::WildcardOutOfRange { index: 10 })
        );
    }

    #[test]
    fn test_contains() {
        assert!(contains("\\0\\", 0).unwrap());
        assert!(!contains("\\1\\", 0).unwrap());
        assert!(!contains("plain", 0).unwrap());
    }
}
