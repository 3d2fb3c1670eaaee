use charley::builtin_grammars::{CatalanBlowup, PpAttachment, SampleSet};
use charley::grammar::{Grammar, Symbol};
use charley::grammar_file::rules_from_text;
use charley::parser::Parser;
use smol_str::SmolStr;

fn tokens(sentence: &str) -> Vec<SmolStr> {
    sentence.split_whitespace().map(SmolStr::new).collect()
}

#[test]
fn reparse_is_idempotent() {
    let sample = PpAttachment;
    let mut parser = Parser::new(
        sample.grammar(),
        &sample.vocabulary(),
        tokens("the boy saw the boy with the telescope"),
        0,
    );
    let first = parser.parse_sentence();
    let first_count = parser.count_derivations();
    let first_trees = parser.formatted_strings(0, false);

    let second = parser.parse_sentence();
    assert_eq!(first, second);
    assert_eq!(parser.count_derivations(), first_count);
    assert_eq!(parser.formatted_strings(0, false), first_trees);
}

#[test]
fn grammar_swap_and_back_is_bit_exact() {
    let sample = PpAttachment;
    // without the transitive VP rule nothing covers the verb
    let crippled = sample.grammar_text().replace("5. VP -> V1 NP\n", "");
    assert_ne!(crippled, sample.grammar_text());
    let pos = sample.vocabulary().parts_of_speech();
    let g2 = Grammar::from_rules(rules_from_text(&crippled).unwrap(), &pos).unwrap();

    let mut parser =
        Parser::new(sample.grammar(), &sample.vocabulary(), tokens("john saw mary"), 0);
    let first = parser.parse_sentence();
    assert_eq!(first, (true, 1));
    let first_trees = parser.formatted_strings(0, false);

    assert_eq!(parser.parse_sentence_with(g2), (false, 0));
    assert!(!parser.has_derivation());

    assert_eq!(parser.parse_sentence_with(sample.grammar()), first);
    assert_eq!(parser.formatted_strings(0, false), first_trees);
}

#[test]
fn prescanned_terminals_survive_reset() {
    let sample = PpAttachment;
    let pos = sample.vocabulary().parts_of_speech();
    let mut parser =
        Parser::new(sample.grammar(), &sample.vocabulary(), tokens("john saw mary"), 0);

    let pos_signatures = |parser: &Parser| -> Vec<Vec<(Symbol, usize)>> {
        parser
            .chart()
            .columns()
            .iter()
            .map(|column| {
                column
                    .reductor_signatures()
                    .into_iter()
                    .filter(|(lhs, _)| pos.contains(lhs.as_str()))
                    .collect()
            })
            .collect()
    };

    parser.parse_sentence();
    let first = pos_signatures(&parser);
    assert!(first[0].contains(&(Symbol::new("PN"), 1)));
    assert!(first[1].contains(&(Symbol::new("V1"), 1)));

    parser.parse_sentence();
    assert_eq!(pos_signatures(&parser), first);
}

#[test]
fn column_overflow_rejects_cleanly() {
    let sample = CatalanBlowup;
    let mut parser = Parser::new(
        sample.grammar(),
        &sample.vocabulary(),
        tokens("x x x x x x x x"),
        0,
    );
    parser.set_completed_cap(5);
    assert_eq!(parser.parse_sentence(), (false, 0));
    assert!(parser.chart().agendas_empty());

    // the same parser recovers once the cap allows the chart to finish
    parser.set_completed_cap(50_000);
    let (accepted, _) = parser.parse_sentence();
    assert!(accepted);
    assert_eq!(parser.count_derivations(), 429);
}
