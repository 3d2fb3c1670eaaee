use std::path::PathBuf;
use std::process;

use argh::FromArgs;

use charley::grammar::Grammar;
use charley::grammar_file::rules_from_file;
use charley::parser::{Parser, DEFAULT_COMPLETED_CAP};
use charley::vocabulary::Vocabulary;

#[derive(FromArgs)]
/// Generate the part-of-speech yields derivable within a word limit
#[argh(subcommand, name = "generate")]
pub struct Generate {
    /// grammar file, one rule per line
    #[argh(option, short = 'g')]
    grammar: PathBuf,

    /// vocabulary file (JSON)
    #[argh(option, short = 'v')]
    vocabulary: PathBuf,

    /// maximum sentence length in words
    #[argh(option, short = 'w', default = "8")]
    max_words: usize,

    /// completed-state cap per chart column
    #[argh(option, default = "DEFAULT_COMPLETED_CAP")]
    cap: usize,
}

impl Generate {
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

        let mut parser = Parser::new(grammar, &vocabulary, Vec::new(), self.max_words);
        parser.set_completed_cap(self.cap);
        match parser.generate_sentence() {
            Ok(yields) => {
                for sentence in yields {
                    println!("{sentence}");
                }
            }
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    }
}
