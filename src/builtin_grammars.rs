//! Hand-built grammars and vocabularies used by the tests and the demo
//! commands.

use indoc::indoc;

use crate::grammar::Grammar;
use crate::grammar_file::rules_from_text;
use crate::vocabulary::Vocabulary;

pub trait SampleSet {
    fn name(&self) -> &'static str;
    fn grammar_text(&self) -> &'static str;
    fn vocabulary_json(&self) -> &'static str;
    /// `(sentence, accepted, derivations)`
    fn sentences(&self) -> Vec<(&'static str, bool, u64)>;

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::from_json(self.vocabulary_json()).expect("sample vocabulary loads")
    }

    fn grammar(&self) -> Grammar {
        let rules = rules_from_text(self.grammar_text()).expect("sample grammar reads");
        Grammar::from_rules(rules, &self.vocabulary().parts_of_speech())
            .expect("sample grammar is well-formed")
    }
}

pub fn all_samples() -> Vec<Box<dyn SampleSet>> {
    vec![
        Box::new(PpAttachment),
        Box::new(LexicalPrefix),
        Box::new(UnitCycle),
        Box::new(EpsilonSuffix),
        Box::new(CatalanBlowup),
    ]
}

/// The classic prepositional-phrase attachment grammar: "the boy saw the boy
/// with the telescope" has exactly two readings.
pub struct PpAttachment;

impl SampleSet for PpAttachment {
    fn name(&self) -> &'static str {
        "PpAttachment"
    }
    fn grammar_text(&self) -> &'static str {
        indoc! {"
            # prepositional-phrase attachment
            1. START -> NP VP
            2. NP -> D N
            3. NP -> PN
            4. NP -> NP PP
            5. VP -> V1 NP
            6. VP -> VP PP
            7. PP -> P NP
        "}
    }
    fn vocabulary_json(&self) -> &'static str {
        indoc! {r#"
            {
              "POSWithPossibleWords": {
                "D": ["the"],
                "N": ["boy", "telescope"],
                "V1": ["saw"],
                "P": ["with"],
                "PN": ["john", "mary"]
              }
            }
        "#}
    }
    fn sentences(&self) -> Vec<(&'static str, bool, u64)> {
        vec![
            ("john saw mary", true, 1),
            ("the boy saw the telescope", true, 1),
            ("the boy saw the boy with the telescope", true, 2),
            ("saw", false, 0),
            ("john saw", false, 0),
        ]
    }
}

/// A lexicalized rule: the determiner is spelled inside the rhs instead of
/// coming from the vocabulary.
pub struct LexicalPrefix;

impl SampleSet for LexicalPrefix {
    fn name(&self) -> &'static str {
        "LexicalPrefix"
    }
    fn grammar_text(&self) -> &'static str {
        indoc! {"
            START -> NP VP
            NP -> 'the' N
            VP -> V1
        "}
    }
    fn vocabulary_json(&self) -> &'static str {
        indoc! {r#"
            {
              "POSWithPossibleWords": {
                "N": ["dog"],
                "V1": ["runs"]
              }
            }
        "#}
    }
    fn sentences(&self) -> Vec<(&'static str, bool, u64)> {
        vec![("the dog runs", true, 1), ("a dog runs", false, 0), ("the dog", false, 0)]
    }
}

/// Unit-production cycle `A -> B -> A`; the forest is cyclic but only the
/// finite derivation counts.
pub struct UnitCycle;

impl SampleSet for UnitCycle {
    fn name(&self) -> &'static str {
        "UnitCycle"
    }
    fn grammar_text(&self) -> &'static str {
        indoc! {"
            START -> A
            A -> B
            A -> 'x'
            B -> A
        "}
    }
    fn vocabulary_json(&self) -> &'static str {
        r#"{ "POSWithPossibleWords": {} }"#
    }
    fn sentences(&self) -> Vec<(&'static str, bool, u64)> {
        vec![("x", true, 1), ("y", false, 0), ("x x", false, 0)]
    }
}

/// An epsilon rule completing right after the last token.
pub struct EpsilonSuffix;

impl SampleSet for EpsilonSuffix {
    fn name(&self) -> &'static str {
        "EpsilonSuffix"
    }
    fn grammar_text(&self) -> &'static str {
        indoc! {"
            START -> A B
            A -> 'x'
            B ->
        "}
    }
    fn vocabulary_json(&self) -> &'static str {
        r#"{ "POSWithPossibleWords": {} }"#
    }
    fn sentences(&self) -> Vec<(&'static str, bool, u64)> {
        vec![("x", true, 1)]
    }
}

/// Catalan-sized ambiguity: `A -> A A | 'x'` has C(n-1) derivations over n
/// tokens. Useful for exercising packing and the completed-state cap.
pub struct CatalanBlowup;

impl SampleSet for CatalanBlowup {
    fn name(&self) -> &'static str {
        "CatalanBlowup"
    }
    fn grammar_text(&self) -> &'static str {
        indoc! {"
            START -> A
            A -> A A
            A -> 'x'
        "}
    }
    fn vocabulary_json(&self) -> &'static str {
        r#"{ "POSWithPossibleWords": {} }"#
    }
    fn sentences(&self) -> Vec<(&'static str, bool, u64)> {
        vec![("x", true, 1), ("x x", true, 1), ("x x x", true, 2), ("x x x x", true, 5)]
    }
}
