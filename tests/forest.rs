use std::collections::HashSet;

use charley::builtin_grammars::{CatalanBlowup, PpAttachment, SampleSet, UnitCycle};
use charley::parser::Parser;
use smol_str::SmolStr;

fn tokens(sentence: &str) -> Vec<SmolStr> {
    sentence.split_whitespace().map(SmolStr::new).collect()
}

fn parser_for(sample: &dyn SampleSet, sentence: &str) -> Parser {
    Parser::new(sample.grammar(), &sample.vocabulary(), tokens(sentence), 0)
}

#[test]
fn unit_cycles_contribute_zero_derivations() {
    let mut parser = parser_for(&UnitCycle, "x");
    let (accepted, indicator) = parser.parse_sentence();
    assert!(accepted);
    assert_eq!(indicator, 1);
    // the A -> B -> A loop is cut; only the lexical derivation is finite
    assert_eq!(parser.count_derivations(), 1);
    assert_eq!(parser.formatted_strings(0, false), vec!["(START (X1 x))"]);
}

#[test]
fn acyclic_count_matches_enumeration() {
    for sentence in ["x", "x x", "x x x", "x x x x", "x x x x x"] {
        let mut parser = parser_for(&CatalanBlowup, sentence);
        parser.parse_sentence();
        let count = parser.count_derivations();
        let trees = parser.formatted_strings(0, false);
        assert_eq!(count, trees.len() as u64, "{sentence:?}");
        let distinct: HashSet<&String> = trees.iter().collect();
        assert_eq!(distinct.len(), trees.len(), "{sentence:?}");
    }
}

#[test]
fn items_never_span_backwards() {
    let mut parser = parser_for(&PpAttachment, "the boy saw the boy with the telescope");
    parser.parse_sentence();
    for item in parser.chart().items() {
        assert!(item.start <= item.end, "{item}");
    }
}

#[test]
fn local_ambiguity_is_packed_per_signature() {
    let mut parser = parser_for(&PpAttachment, "the boy saw the boy with the telescope");
    parser.parse_sentence();
    for column in parser.chart().columns() {
        let signatures = column.reductor_signatures();
        let distinct: HashSet<_> = signatures.iter().collect();
        assert_eq!(distinct.len(), signatures.len(), "column {}", column.index());
    }
    // the attachment ambiguity is packed into one span with two reductors
    assert!(parser.chart().spans().iter().any(|span| span.reductors.len() == 2));
}
