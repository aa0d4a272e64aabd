//! Shell-style pattern matching used to decide which columns a rule applies
//! to. Supports `|`-separated alternatives, `*`, `?` and `[...]` character
//! classes. Matching is case-insensitive unless requested otherwise.

use crate::error::{SculptError, SculptResult};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern with the default case-insensitive matching.
    pub fn new(pattern: &str) -> SculptResult<Self> {
        Self::with_case_sensitivity(pattern, false)
    }

    pub fn case_sensitive(pattern: &str) -> SculptResult<Self> {
        Self::with_case_sensitivity(pattern, true)
    }

    fn with_case_sensitivity(pattern: &str, case_sensitive: bool) -> SculptResult<Self> {
        let alternatives: Vec<String> = pattern
            .split('|')
            .map(translate_alternative)
            .collect::<SculptResult<_>>()?;

        let flags = if case_sensitive { "" } else { "(?i)" };
        let source = format!("{}^(?:{})$", flags, alternatives.join("|"));

        let regex = Regex::new(&source).map_err(|e| SculptError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when any of the given patterns matches `text`.
    pub fn any_match(patterns: &[Pattern], text: &str) -> bool {
        patterns.iter().any(|p| p.matches(text))
    }
}

/// Translate one `|`-free alternative into an anchored regex fragment.
fn translate_alternative(alt: &str) -> SculptResult<String> {
    let mut out = String::with_capacity(alt.len() * 2);
    let mut chars = alt.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let mut class = String::from("[");
                // fnmatch negation spelling
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    match inner {
                        ']' => {
                            closed = true;
                            break;
                        }
                        // an escaped character never closes the class
                        '\\' => match chars.next() {
                            Some(escaped) => {
                                class.push('\\');
                                class.push(escaped);
                            }
                            None => break,
                        },
                        _ => class.push(inner),
                    }
                }
                if !closed {
                    return Err(SculptError::Pattern {
                        pattern: alt.to_string(),
                        reason: "unterminated character class".to_string(),
                    });
                }
                class.push(']');
                out.push_str(&class);
            }
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternatives_and_wildcards() {
        let p = Pattern::new("*At|*_at").unwrap();
        assert!(p.matches("deletedAt"));
        assert!(p.matches("deleted_at"));
        assert!(!p.matches("deletedAtTime"));
    }

    #[test]
    fn case_insensitive_by_default() {
        let p = Pattern::new("gray|grey").unwrap();
        assert!(p.matches("Grey"));
        assert!(p.matches("GRAY"));

        let strict = Pattern::case_sensitive("gray|grey").unwrap();
        assert!(!strict.matches("Grey"));
        assert!(strict.matches("grey"));
    }

    #[test]
    fn character_classes() {
        let p = Pattern::new("word_[0-9][0-9][0-9]").unwrap();
        assert!(p.matches("word_123"));
        assert!(!p.matches("word_12"));
        assert!(!p.matches("word_1234"));
    }

    #[test]
    fn negated_class() {
        let p = Pattern::new("id[!0-9]").unwrap();
        assert!(p.matches("idx"));
        assert!(!p.matches("id1"));
    }

    #[test]
    fn escaped_bracket_stays_inside_the_class() {
        let p = Pattern::new(r"id[\]x]").unwrap();
        assert!(p.matches("id]"));
        assert!(p.matches("idx"));
        assert!(!p.matches("idy"));

        // a trailing escape leaves the class unterminated
        assert!(Pattern::new(r"id[a\").is_err());
    }

    #[test]
    fn question_mark_matches_one_char() {
        let p = Pattern::new("a?c").unwrap();
        assert!(p.matches("abc"));
        assert!(!p.matches("ac"));
        assert!(!p.matches("abbc"));
    }

    #[test]
    fn literal_metacharacters_are_escaped() {
        let p = Pattern::new("created.at").unwrap();
        assert!(p.matches("created.at"));
        assert!(!p.matches("createdXat"));
    }

    #[test]
    fn unterminated_class_is_an_error() {
        assert!(Pattern::new("word_[0-9").is_err());
    }
}
