//! The Earley parser driver.
//!
//! A [`Parser`] is constructed once over a fixed token sequence; the chart
//! columns live for the parser's lifetime. Each call to
//! [`Parser::parse_sentence`] rebuilds the items and spans from scratch,
//! re-installing the cached vocabulary pre-scan, so the same parser can be
//! re-run under different grammars with identical forest topology.
//!
//! Within a column the loop alternates between draining the completion
//! agenda (largest start index first) and the prediction agenda until both
//! are empty; an epsilon completion can re-arm the completion agenda after
//! prediction has run, which is why a single pass of each is not enough.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use log::{debug, info, trace};

use crate::chart::{Chart, Item, ItemId};
use crate::forest;
use crate::grammar::{quoted_text, Grammar, PartsOfSpeech, Rule, ScannedRules, Symbol, GAMMA, START};
use crate::vocabulary::Vocabulary;

/// Per-column limit on completed states before a parse is rejected.
pub const DEFAULT_COMPLETED_CAP: usize = 50_000;

#[derive(Debug)]
pub enum ParseError {
    /// Generator-mode overflow: the chart grew past any useful size.
    TooManyItems(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TooManyItems(n) => write!(f, "too many items in the chart ({n})"),
        }
    }
}

impl Error for ParseError {}

pub struct Parser {
    grammar: Grammar,
    pos: PartsOfSpeech,
    scanned: ScannedRules,
    tokens: Vec<Symbol>,
    chart: Chart,
    /// Vocabulary pre-scan, computed once and re-installed on every parse.
    prescanned: Vec<(usize, Item)>,
    gamma: Rc<Rule>,
    max_words: usize,
    completed_cap: usize,
}

impl Parser {
    /// Set up columns over `tokens` and pre-scan their part-of-speech
    /// terminals. With no tokens the chart is sized for generator mode
    /// (`max_words` positions).
    pub fn new(
        grammar: Grammar,
        vocabulary: &Vocabulary,
        tokens: Vec<Symbol>,
        max_words: usize,
    ) -> Parser {
        let pos = vocabulary.parts_of_speech();
        let scanned = ScannedRules::build(&pos);
        let width = if tokens.is_empty() { max_words } else { tokens.len() };
        let chart = Chart::new(&tokens, width + 1);

        let mut prescanned = Vec::new();
        for (i, word) in tokens.iter().enumerate() {
            for tag in vocabulary.pos_for(word.as_str()) {
                if let Some(rule) = scanned.rule_for(tag.as_str()) {
                    prescanned.push((i, Item::spanning(rule.clone(), 1, i, i + 1)));
                }
            }
        }

        let gamma = Rc::new(Rule::synthetic(GAMMA, vec![Symbol::new(START)]));
        Parser {
            grammar,
            pos,
            scanned,
            tokens,
            chart,
            prescanned,
            gamma,
            max_words,
            completed_cap: DEFAULT_COMPLETED_CAP,
        }
    }

    pub fn set_completed_cap(&mut self, cap: usize) {
        self.completed_cap = cap;
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parse the construction-time tokens. Returns acceptance and a
    /// derivation indicator: 1 when at least one derivation exists, else 0.
    pub fn parse_sentence(&mut self) -> (bool, u64) {
        self.seed_parse();
        match self.run_columns(false) {
            Ok(true) => {}
            _ => return (false, 0),
        }
        let accepted = self.has_derivation();
        info!(
            "parse finished: accepted={accepted}, {} items, {} spans",
            self.chart.items().len(),
            self.chart.spans().len()
        );
        let indicator = u64::from(accepted && self.count_derivations() > 0);
        (accepted, indicator)
    }

    /// Reparse the same input under a different grammar.
    pub fn parse_sentence_with(&mut self, grammar: Grammar) -> (bool, u64) {
        self.grammar = grammar;
        self.parse_sentence()
    }

    /// Generator mode: derive every sentence of up to `max_words` words,
    /// scanning a wildcard terminal for each part of speech at each
    /// position. Returns the part-of-speech yields.
    pub fn generate_sentence(&mut self) -> Result<Vec<String>, ParseError> {
        self.seed_generate();
        self.run_columns(true)?;
        Ok(self.formatted_strings(0, true))
    }

    pub fn has_derivation(&self) -> bool {
        self.chart.start_span(self.tokens.len()).is_some()
    }

    pub fn count_derivations(&self) -> u64 {
        self.derivations_of_length(self.tokens.len())
    }

    /// Enumerate the derivations of the `START` spans at a column, either as
    /// fully bracketed trees or as part-of-speech yields.
    pub fn formatted_strings(&self, column_index: usize, pos_yield_only: bool) -> Vec<String> {
        forest::formatted_strings(&self.chart, &self.pos, column_index, pos_yield_only)
    }

    fn derivations_of_length(&self, length: usize) -> u64 {
        match self.chart.start_span(length) {
            Some(sid) => forest::count_span(&self.chart, sid, &mut HashMap::new()),
            None => 0,
        }
    }

    /// Reset the chart and install everything that exists before the main
    /// loop runs: the cached pre-scan, lexicalized-prefix matches, and the
    /// `Gamma -> START` seed.
    fn seed_parse(&mut self) {
        self.chart.reset();
        for (_, item) in self.prescanned.clone() {
            let id = self.chart.alloc_item(item);
            self.chart.insert_reductor(id);
        }
        self.install_lexical();
        let seed = Item::predicted(self.gamma.clone(), 0);
        self.chart.add_state(seed, 0, &self.grammar);
    }

    fn seed_generate(&mut self) {
        self.chart.reset();
        let rules: Vec<Rc<Rule>> = self
            .pos
            .iter()
            .filter_map(|tag| self.scanned.rule_for(tag.as_str()).cloned())
            .collect();
        for i in 0..self.max_words {
            for rule in &rules {
                let id = self.chart.alloc_item(Item::spanning(rule.clone(), 1, i, i + 1));
                self.chart.insert_reductor(id);
            }
        }
        let seed = Item::predicted(self.gamma.clone(), 0);
        self.chart.add_state(seed, 0, &self.grammar);
    }

    /// Match every lexical rule's literal prefix at every input position.
    /// A full-prefix match over the whole rhs becomes a pre-completed span;
    /// a partial one becomes an active item with its dot past the literals.
    fn install_lexical(&mut self) {
        let n = self.tokens.len();
        for rule in self.grammar.lexical_rules() {
            let k = rule.literal_prefix_len();
            for i in 0..n {
                if i + k > n {
                    break;
                }
                let matched = rule.rhs()[..k]
                    .iter()
                    .zip(&self.tokens[i..i + k])
                    .all(|(lit, word)| quoted_text(lit.as_str()) == word.as_str());
                if !matched {
                    continue;
                }
                let item = Item::spanning(rule.clone(), k, i, i + k);
                if k == rule.len() {
                    let id = self.chart.alloc_item(item);
                    self.chart.insert_reductor(id);
                } else {
                    self.chart.add_state(item, i + k, &self.grammar);
                }
            }
        }
    }

    /// Process every column in index order. `Ok(false)` is a clean rejection
    /// (completed-state cap); in generator mode both caps abort instead.
    fn run_columns(&mut self, generating: bool) -> Result<bool, ParseError> {
        for index in 0..self.chart.columns().len() {
            loop {
                let mut progressed = false;
                while let Some(item) = self.chart.dequeue_complete(index) {
                    self.complete(index, item);
                    progressed = true;
                }
                while let Some(nt) = self.chart.dequeue_predict(index) {
                    self.predict(index, nt);
                    progressed = true;
                }
                if !progressed {
                    break;
                }
            }
            trace!("{}", self.chart.column(index).dump(&self.chart));
            let completed = self.chart.column(index).completed_state_count();
            if completed > self.completed_cap {
                debug!(
                    "column {index} overflowed: {completed} completed states (cap {})",
                    self.completed_cap
                );
                self.chart.drain_agendas();
                if generating {
                    return Err(ParseError::TooManyItems(completed));
                }
                return Ok(false);
            }
            if generating {
                let derivations = self.derivations_of_length(index);
                if derivations > 2 * self.completed_cap as u64 {
                    self.chart.drain_agendas();
                    return Err(ParseError::TooManyItems(derivations as usize));
                }
            }
        }
        Ok(true)
    }

    /// Insert a fresh dot-0 item for every non-lexical rule of `nt`.
    fn predict(&mut self, index: usize, nt: Symbol) {
        debug!("PREDICT {nt} at column {index}");
        let rules: Vec<Rc<Rule>> = match self.grammar.rules_for(nt.as_str()) {
            Some(rules) => rules.iter().filter(|rule| !rule.lexical()).cloned().collect(),
            None => return,
        };
        for rule in rules {
            self.chart.add_state(Item::predicted(rule, index), index, &self.grammar);
        }
    }

    /// Pack the reductor into its span and, when the span is new, advance
    /// every predecessor awaiting its lhs at the span's start column. On
    /// local ambiguity the predecessors already have consequents pointing at
    /// this span, so nothing further is propagated.
    fn complete(&mut self, index: usize, reductor: ItemId) {
        let (sid, already_packed) = self.chart.insert_reductor(reductor);
        if already_packed {
            debug!("COMPLETE {} (packed, span already propagated)", self.chart.item(reductor));
            return;
        }
        let (lhs, start) = {
            let span = self.chart.span(sid);
            (span.lhs.clone(), span.start)
        };
        debug!("COMPLETE {}", self.chart.span(sid));
        for pid in self.chart.column(start).predecessors_for(lhs.as_str()) {
            let (rule, dot, pred_start) = {
                let pred = self.chart.item(pid);
                (pred.rule.clone(), pred.dot, pred.start)
            };
            let advanced = Item {
                rule,
                dot: dot + 1,
                start: pred_start,
                end: index,
                predecessor: Some(pid),
                reductor: Some(sid),
            };
            self.chart.add_state(advanced, index, &self.grammar);
        }
    }
}
