//! Surface words and their part-of-speech tags.
//!
//! A vocabulary file is a JSON object with a single required property,
//! `POSWithPossibleWords`, mapping each tag to its lowercase surface forms:
//!
//! ```json
//! { "POSWithPossibleWords": { "D": ["the"], "N": ["boy", "telescope"] } }
//! ```
//!
//! The loader also builds the inverse word -> tags map, which is what the
//! parser's pre-scan consults.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use smol_str::SmolStr;

use crate::grammar::{PartsOfSpeech, Symbol};

#[derive(Debug)]
pub enum VocabularyError {
    Io(String),
    Json(String),
    /// Out-of-vocabulary word during corpus statistics.
    UnknownWord(String),
}

impl fmt::Display for VocabularyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "cannot read vocabulary: {msg}"),
            Self::Json(msg) => write!(f, "malformed vocabulary: {msg}"),
            Self::UnknownWord(word) => write!(f, "word not in vocabulary: {word:?}"),
        }
    }
}

impl Error for VocabularyError {}

#[derive(Debug, Deserialize)]
struct VocabularyDoc {
    #[serde(rename = "POSWithPossibleWords")]
    pos_with_possible_words: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    pos_with_possible_words: HashMap<Symbol, Vec<Symbol>>,
    word_with_possible_pos: HashMap<Symbol, Vec<Symbol>>,
}

impl Vocabulary {
    pub fn from_json(text: &str) -> Result<Vocabulary, VocabularyError> {
        let doc: VocabularyDoc =
            serde_json::from_str(text).map_err(|e| VocabularyError::Json(e.to_string()))?;
        let mut vocabulary = Vocabulary::default();
        for (tag, words) in &doc.pos_with_possible_words {
            vocabulary.add_tag(tag, words.iter().map(String::as_str));
        }
        Ok(vocabulary)
    }

    pub fn from_file(path: &Path) -> Result<Vocabulary, VocabularyError> {
        let text = fs::read_to_string(path)
            .map_err(|e| VocabularyError::Io(format!("{}: {e}", path.display())))?;
        Vocabulary::from_json(&text)
    }

    /// Register a tag and its words; both directions are kept sorted so
    /// repeated parses see identical pre-scan order.
    pub fn add_tag<'a>(&mut self, tag: &str, words: impl IntoIterator<Item = &'a str>) {
        let tag = SmolStr::new(tag);
        for word in words {
            let word = SmolStr::new(word);
            let forms = self.pos_with_possible_words.entry(tag.clone()).or_default();
            if !forms.contains(&word) {
                forms.push(word.clone());
                forms.sort();
            }
            let tags = self.word_with_possible_pos.entry(word).or_default();
            if !tags.contains(&tag) {
                tags.push(tag.clone());
                tags.sort();
            }
        }
        self.pos_with_possible_words.entry(tag).or_default();
    }

    /// Tags this surface form can carry, sorted; empty when out of
    /// vocabulary.
    pub fn pos_for(&self, word: &str) -> &[Symbol] {
        self.word_with_possible_pos.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Surface forms of a tag, sorted; empty for unknown tags.
    pub fn words_for(&self, tag: &str) -> &[Symbol] {
        self.pos_with_possible_words.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.word_with_possible_pos.contains_key(word)
    }

    pub fn parts_of_speech(&self) -> PartsOfSpeech {
        PartsOfSpeech::new(self.pos_with_possible_words.keys().cloned())
    }

    /// Count part-of-speech bigrams over a tokenized corpus. Ambiguous words
    /// contribute one count per tag pair. An out-of-vocabulary word is fatal.
    pub fn bigram_counts(
        &self,
        sentences: &[Vec<Symbol>],
    ) -> Result<HashMap<(Symbol, Symbol), u64>, VocabularyError> {
        let mut counts: HashMap<(Symbol, Symbol), u64> = HashMap::new();
        for sentence in sentences {
            for word in sentence {
                if self.pos_for(word.as_str()).is_empty() {
                    return Err(VocabularyError::UnknownWord(word.to_string()));
                }
            }
            for pair in sentence.windows(2) {
                for first in self.pos_for(pair[0].as_str()) {
                    for second in self.pos_for(pair[1].as_str()) {
                        *counts.entry((first.clone(), second.clone())).or_insert(0) += 1;
                    }
                }
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r#"
        {
          "POSWithPossibleWords": {
            "D": ["the"],
            "N": ["boy", "telescope"],
            "PN": ["john"]
          }
        }
    "#};

    #[test]
    fn loads_both_directions() {
        let vocabulary = Vocabulary::from_json(SAMPLE).unwrap();
        assert_eq!(vocabulary.words_for("N"), ["boy", "telescope"]);
        assert_eq!(vocabulary.pos_for("the"), ["D"]);
        assert!(vocabulary.pos_for("unknown").is_empty());
        assert!(vocabulary.parts_of_speech().contains("PN"));
    }

    #[test]
    fn missing_property_is_an_error() {
        let err = Vocabulary::from_json(r#"{"Words": {}}"#);
        assert!(matches!(err, Err(VocabularyError::Json(_))));
    }

    #[test]
    fn ambiguous_words_share_tags() {
        let mut vocabulary = Vocabulary::default();
        vocabulary.add_tag("N", ["saw"]);
        vocabulary.add_tag("V1", ["saw"]);
        assert_eq!(vocabulary.pos_for("saw"), ["N", "V1"]);
    }

    #[test]
    fn bigrams_count_tag_pairs() {
        let vocabulary = Vocabulary::from_json(SAMPLE).unwrap();
        let corpus = vec![vec![Symbol::new("the"), Symbol::new("boy")]];
        let counts = vocabulary.bigram_counts(&corpus).unwrap();
        assert_eq!(counts[&(Symbol::new("D"), Symbol::new("N"))], 1);
    }

    #[test]
    fn bigrams_reject_out_of_vocabulary_words() {
        let vocabulary = Vocabulary::from_json(SAMPLE).unwrap();
        let corpus = vec![vec![Symbol::new("the"), Symbol::new("dragon")]];
        let err = vocabulary.bigram_counts(&corpus);
        assert!(matches!(err, Err(VocabularyError::UnknownWord(word)) if word == "dragon"));
    }
}
