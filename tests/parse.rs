use charley::builtin_grammars::{all_samples, LexicalPrefix, PpAttachment, SampleSet};
use charley::grammar::Grammar;
use charley::grammar_file::rules_from_text;
use charley::parser::Parser;
use charley::vocabulary::Vocabulary;
use smol_str::SmolStr;

fn tokens(sentence: &str) -> Vec<SmolStr> {
    sentence.split_whitespace().map(SmolStr::new).collect()
}

fn parser_for(sample: &dyn SampleSet, sentence: &str) -> Parser {
    Parser::new(sample.grammar(), &sample.vocabulary(), tokens(sentence), 0)
}

#[test]
fn all_builtin_sentences() {
    for sample in all_samples() {
        for (sentence, accepted, derivations) in sample.sentences() {
            let mut parser = parser_for(sample.as_ref(), sentence);
            let (ok, indicator) = parser.parse_sentence();
            assert_eq!(ok, accepted, "{}: {sentence:?}", sample.name());
            assert_eq!(indicator, u64::from(accepted), "{}: {sentence:?}", sample.name());
            assert_eq!(
                parser.count_derivations(),
                derivations,
                "{}: {sentence:?}",
                sample.name()
            );
        }
    }
}

#[test]
fn simple_sentence_has_one_reading() {
    let mut parser = parser_for(&PpAttachment, "john saw mary");
    let (accepted, indicator) = parser.parse_sentence();
    assert!(accepted);
    assert_eq!(indicator, 1);
    assert!(parser.has_derivation());
    assert_eq!(parser.count_derivations(), 1);
    assert_eq!(parser.formatted_strings(0, true), vec!["PN V1 PN"]);

    let trees = parser.formatted_strings(0, false);
    assert_eq!(trees.len(), 1);
    assert!(trees[0].starts_with("(START "));
    assert!(trees[0].contains("(PN john)"));
    assert!(trees[0].contains("(V1 saw)"));
    assert!(trees[0].contains("(PN mary)"));
}

#[test]
fn pp_attachment_is_ambiguous() {
    let mut parser = parser_for(&PpAttachment, "the boy saw the boy with the telescope");
    let (accepted, indicator) = parser.parse_sentence();
    assert!(accepted);
    assert_eq!(indicator, 1);
    assert_eq!(parser.count_derivations(), 2);

    let yields = parser.formatted_strings(0, true);
    assert_eq!(yields, vec!["D N V1 D N P D N"; 2]);

    let trees = parser.formatted_strings(0, false);
    assert_eq!(trees.len(), 2);
    assert_ne!(trees[0], trees[1]);
}

#[test]
fn unparsable_input_is_rejected() {
    let mut parser = parser_for(&PpAttachment, "saw");
    assert_eq!(parser.parse_sentence(), (false, 0));
    assert!(!parser.has_derivation());
    assert_eq!(parser.count_derivations(), 0);
    assert!(parser.formatted_strings(0, false).is_empty());
}

#[test]
fn lexical_prefix_rules_consume_their_literals() {
    let mut parser = parser_for(&LexicalPrefix, "the dog runs");
    let (accepted, _) = parser.parse_sentence();
    assert!(accepted);
    assert_eq!(parser.count_derivations(), 1);
    // the literal determiner carries no part of speech
    assert_eq!(parser.formatted_strings(0, true), vec!["N V1"]);
    let trees = parser.formatted_strings(0, false);
    assert!(trees[0].contains("the ("));
}

#[test]
fn empty_input_accepts_an_epsilon_start() {
    let vocabulary = Vocabulary::default();
    let rules = rules_from_text("START ->").unwrap();
    let grammar = Grammar::from_rules(rules, &vocabulary.parts_of_speech()).unwrap();
    let mut parser = Parser::new(grammar, &vocabulary, Vec::new(), 0);
    let (accepted, indicator) = parser.parse_sentence();
    assert!(accepted);
    assert_eq!(indicator, 1);
    assert_eq!(parser.count_derivations(), 1);
    assert_eq!(parser.formatted_strings(0, false), vec!["(START)"]);
}
