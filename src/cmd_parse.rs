use std::path::PathBuf;
use std::process;

use argh::FromArgs;
use smol_str::SmolStr;

use charley::grammar::Grammar;
use charley::grammar_file::rules_from_file;
use charley::parser::{Parser, DEFAULT_COMPLETED_CAP};
use charley::vocabulary::Vocabulary;

#[derive(FromArgs)]
/// Parse a sentence against a grammar and vocabulary
#[argh(subcommand, name = "parse")]
pub struct Parse {
    /// grammar file, one rule per line
    #[argh(option, short = 'g')]
    grammar: PathBuf,

    /// vocabulary file (JSON)
    #[argh(option, short = 'v')]
    vocabulary: PathBuf,

    /// sentence to parse
    #[argh(option, short = 's')]
    sentence: String,

    /// print part-of-speech yields instead of bracketed trees
    #[argh(switch)]
    pos_yield: bool,

    /// completed-state cap per chart column
    #[argh(option, default = "DEFAULT_COMPLETED_CAP")]
    cap: usize,
}

impl Parse {
    pub fn run(self) {
        let vocabulary = Vocabulary::from_file(&self.vocabulary).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        });
        let rules = rules_from_file(&self.grammar).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        });
        let grammar =
            Grammar::from_rules(rules, &vocabulary.parts_of_speech()).unwrap_or_else(|e| {
                eprintln!("{e}");
                process::exit(1);
            });

        let tokens: Vec<SmolStr> = self
            .sentence
            .split_whitespace()
            .map(|word| SmolStr::new(word.to_lowercase()))
            .collect();
        let mut parser = Parser::new(grammar, &vocabulary, tokens, 0);
        parser.set_completed_cap(self.cap);

        let (accepted, _) = parser.parse_sentence();
        if !accepted {
            println!("not a sentence");
            process::exit(2);
        }
        println!("accepted, {} derivation(s)", parser.count_derivations());
        for tree in parser.formatted_strings(0, self.pos_yield) {
            println!("{tree}");
        }
    }
}
