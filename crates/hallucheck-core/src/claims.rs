//! Claim parsing: turns a bullet-formatted extraction reply into claims.
//!
//! The parse is line-oriented and permissive. Each line loses at most one
//! leading list marker (dash, asterisk, bullet glyph, or a short numeral such
//! as `1.` or `2)`) and surrounding whitespace. Trailing dashes are dropped as
//! well. Lines left empty are discarded, never turned into empty claims.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::Claim;

lazy_static! {
    /// One leading list marker, after optional indentation.
    ///
    /// The marker must be followed by whitespace or end the line, so
    /// markdown emphasis (`**Bell**`), "1876 was..." and "3.14 is..." are
    /// left alone.
    static ref LEADING_MARKER: Regex = Regex::new(
        r"^\s*(?:[-*+•‣◦▪–—]|\d{1,3}[.)])(?:\s+|$)"
    ).unwrap();
}

/// Turns raw extraction replies into an ordered list of claims.
///
/// Implementations must preserve the order in which the model listed
/// claims and must never return empty claims.
pub trait ClaimParser: Send + Sync {
    fn parse(&self, reply: &str) -> Vec<Claim>;
}

/// Line-oriented bullet parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulletClaimParser;

impl BulletClaimParser {
    pub fn new() -> Self {
        Self
    }
}

impl ClaimParser for BulletClaimParser {
    fn parse(&self, reply: &str) -> Vec<Claim> {
        reply.lines().filter_map(strip_line).collect()
    }
}

/// Parse an extraction reply with the default [`BulletClaimParser`].
pub fn parse_claims(reply: &str) -> Vec<Claim> {
    BulletClaimParser.parse(reply)
}

fn strip_line(line: &str) -> Option<Claim> {
    let without_marker = LEADING_MARKER.replace(line, "");
    let stripped = without_marker.trim_end_matches(|c: char| c == '-' || c.is_whitespace());
    Claim::new(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn texts(claims: &[Claim]) -> Vec<&str> {
        claims.iter().map(Claim::as_str).collect()
    }

    #[test]
    fn test_dash_bullets() {
        let reply = "- Alexander Graham Bell invented the telephone.\n- It was patented in 1876.";
        let claims = parse_claims(reply);
        assert_eq!(
            texts(&claims),
            vec!["Alexander Graham Bell invented the telephone.", "It was patented in 1876."]
        );
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let reply = "\n- First claim.\n\n   \n- Second claim.\n\n";
        assert_eq!(texts(&parse_claims(reply)), vec!["First claim.", "Second claim."]);
    }

    #[test]
    fn test_empty_reply_yields_no_claims() {
        assert!(parse_claims("").is_empty());
        assert!(parse_claims("   \n\t\n  ").is_empty());
    }

    #[test]
    fn test_marker_only_lines_are_dropped() {
        assert!(parse_claims("-\n- \n*\n•").is_empty());
    }

    #[test]
    fn test_other_bullet_glyphs() {
        let reply = "* Asterisk claim.\n• Dot claim.\n1. Numbered claim.\n2) Paren claim.\n+ Plus claim.";
        assert_eq!(
            texts(&parse_claims(reply)),
            vec![
                "Asterisk claim.",
                "Dot claim.",
                "Numbered claim.",
                "Paren claim.",
                "Plus claim."
            ]
        );
    }

    #[test]
    fn test_leading_numbers_inside_claims_survive() {
        let reply = "- 1876 was the patent year.\n3.14 is an approximation of pi.";
        assert_eq!(
            texts(&parse_claims(reply)),
            vec!["1876 was the patent year.", "3.14 is an approximation of pi."]
        );
    }

    #[test]
    fn test_markdown_emphasis_is_kept() {
        let reply = "**Bold** claim\n- **Bell** invented the telephone.\n* *Italic* claim";
        assert_eq!(
            texts(&parse_claims(reply)),
            vec![
                "**Bold** claim",
                "**Bell** invented the telephone.",
                "*Italic* claim"
            ]
        );
    }

    #[test]
    fn test_only_one_marker_is_stripped() {
        let reply = "- 100. Napoleon was short.\n  1. - Nested dash stays.";
        assert_eq!(
            texts(&parse_claims(reply)),
            vec!["100. Napoleon was short.", "- Nested dash stays."]
        );
    }

    #[test]
    fn test_trailing_dashes_and_crlf() {
        let reply = "- Paris is in France. -\r\n- Rome is in Italy.\r\n";
        assert_eq!(
            texts(&parse_claims(reply)),
            vec!["Paris is in France.", "Rome is in Italy."]
        );
    }

    #[test]
    fn test_unbulleted_lines_are_claims() {
        assert_eq!(texts(&parse_claims("Plain line")), vec!["Plain line"]);
    }

    proptest! {
        #[test]
        fn prop_k_bulleted_lines_yield_k_claims_in_order(
            lines in prop::collection::vec("[A-Z][a-z ]{0,30}[a-z.]", 0..10),
            bullet in prop::sample::select(vec!["- ", "* ", "• ", "1. ", "  - ", ""]),
        ) {
            let reply = lines
                .iter()
                .map(|l| format!("{}{}", bullet, l))
                .collect::<Vec<_>>()
                .join("\n");

            let claims = parse_claims(&reply);
            prop_assert_eq!(claims.len(), lines.len());
            for (claim, line) in claims.iter().zip(&lines) {
                prop_assert_eq!(claim.as_str(), line.trim());
            }
        }

        #[test]
        fn prop_whitespace_only_replies_yield_nothing(reply in "[ \t\r\n]{0,40}") {
            prop_assert!(parse_claims(&reply).is_empty());
        }

        #[test]
        fn prop_claims_are_never_empty(reply in "\\PC{0,200}") {
            for claim in parse_claims(&reply) {
                prop_assert!(!claim.as_str().is_empty());
                prop_assert_eq!(claim.as_str(), claim.as_str().trim());
            }
        }
    }
}
