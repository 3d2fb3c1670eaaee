//! Reading grammars from their one-rule-per-line text format.
//!
//! ```text
//! # comment
//! 1. START -> NP VP
//! 2. NP -> 'the' N
//! 3. B ->
//! ```
//!
//! Leading `N. ` rule numbers are stripped; an empty rhs is the epsilon
//! rule. A line without `->` is skipped (with a warning) when reading a
//! file, unlike programmatic rule construction where it is an error.

use std::fs;
use std::path::Path;

use log::warn;

use crate::grammar::{GrammarError, Rule};

pub fn rules_from_text(text: &str) -> Result<Vec<Rule>, GrammarError> {
    let mut rules = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = strip_rule_number(raw.trim());
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match Rule::parse(line) {
            Ok(rule) => rules.push(rule),
            Err(GrammarError::MissingArrow(_)) => {
                warn!("skipping grammar line {}: no '->' in {line:?}", lineno + 1);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(rules)
}

pub fn rules_from_file(path: &Path) -> Result<Vec<Rule>, GrammarError> {
    let text = fs::read_to_string(path)
        .map_err(|e| GrammarError::Io(format!("{}: {e}", path.display())))?;
    rules_from_text(&text)
}

fn strip_rule_number(line: &str) -> &str {
    if let Some((head, tail)) = line.split_once(". ") {
        if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) {
            return tail.trim_start();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn reads_rules_comments_and_numbers() {
        let text = indoc! {"
            # a comment
            1. START -> NP VP
            NP -> 'the' N

            17. B ->
        "};
        let rules = rules_from_text(text).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].to_string(), "START -> NP VP");
        assert!(rules[1].lexical());
        assert!(rules[2].is_epsilon());
    }

    #[test]
    fn lines_without_arrow_are_skipped() {
        let rules = rules_from_text("START -> A\nnot a rule\nA -> 'x'").unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn malformed_lexical_rules_are_fatal() {
        let err = rules_from_text("START -> A 'x'");
        assert!(matches!(err, Err(GrammarError::LexicalAfterNonterminal(_))));
    }

    #[test]
    fn numeric_prefix_only_strips_at_line_start() {
        let rules = rules_from_text("START -> A. B").unwrap();
        assert_eq!(rules[0].rhs().len(), 2);
        assert_eq!(rules[0].rhs()[0].as_str(), "A.");
    }
}
