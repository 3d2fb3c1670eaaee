//! Context-free grammars over interned word symbols.
//!
//! A grammar is a map of definitions: lhs `Symbol` -> list of [`Rule`]s,
//! restricted to the rules reachable from `START`. The full set of rules as
//! written (the *schematic* set) is kept alongside, so inserting a rule later
//! can retroactively make earlier schematic rules reachable.
//!
//! Right-hand sides mix nonterminals, part-of-speech tags, and single-quoted
//! word literals (e.g. `NP -> 'the' N`). A rule whose rhs *begins* with
//! literals is lexical; a literal after a nonterminal is a format error.
//!
//! Before a grammar is built from user rules, [`Grammar::from_rules`]
//! normalizes them: every non-`START` nonterminal is renamed to `X1, X2, …`
//! (part-of-speech tags are preserved), and every part-of-speech tag on an
//! rhs is re-introduced through a dedicated fresh rule `Xk -> POS`, so that
//! scanning is uniform.

use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use smol_str::SmolStr;

/// Interned string; O(1) to clone.
pub type Symbol = SmolStr;

/// The distinguished start category. Never appears on a right-hand side.
pub const START: &str = "START";
/// Lhs of the synthetic seed rule `Gamma -> START`.
pub const GAMMA: &str = "Gamma";
/// Printed in place of an empty right-hand side.
pub const EPSILON: &str = "Epsilon";
/// Terminal matched by the per-POS scanned rules; stands for "any word".
pub const WILDCARD: &str = "*";

/// Is this rhs symbol a single-quoted word literal?
pub fn is_quoted(sym: &str) -> bool {
    sym.len() >= 2 && sym.starts_with('\'') && sym.ends_with('\'')
}

/// The text inside a quoted literal; non-literals are returned unchanged.
pub fn quoted_text(sym: &str) -> &str {
    if is_quoted(sym) {
        &sym[1..sym.len() - 1]
    } else {
        sym
    }
}

#[derive(Debug)]
pub enum GrammarError {
    /// Programmatic rule construction from a line without `->`.
    MissingArrow(String),
    MissingStart,
    DuplicateStart,
    /// `START` may not be referenced by any rule.
    StartOnRhs(String),
    /// A quoted literal may not follow a nonterminal on an rhs.
    LexicalAfterNonterminal(String),
    Io(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MissingArrow(line) => write!(f, "no '->' in rule {line:?}"),
            Self::MissingStart => write!(f, "grammar has no {START} rule"),
            Self::DuplicateStart => write!(f, "grammar has more than one {START} rule"),
            Self::StartOnRhs(rule) => write!(f, "{START} used on a right-hand side: {rule}"),
            Self::LexicalAfterNonterminal(rule) => {
                write!(f, "quoted literal after a nonterminal: {rule}")
            }
            Self::Io(msg) => write!(f, "cannot read grammar: {msg}"),
        }
    }
}

impl Error for GrammarError {}

/// An immutable production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    lhs: Symbol,
    rhs: Vec<Symbol>,
    lexical: bool,
    prefix: usize,
}

impl Rule {
    /// Build a rule, checking the literal-prefix format: quoted literals may
    /// only appear as a leading run.
    pub fn new(lhs: impl Into<Symbol>, rhs: Vec<Symbol>) -> Result<Rule, GrammarError> {
        let lhs = lhs.into();
        let prefix = rhs.iter().take_while(|sym| is_quoted(sym.as_str())).count();
        if rhs.iter().skip(prefix).any(|sym| is_quoted(sym.as_str())) {
            let shown = format!("{} -> {}", lhs, rhs.iter().join(" "));
            return Err(GrammarError::LexicalAfterNonterminal(shown));
        }
        Ok(Self::with_prefix(lhs, rhs, prefix))
    }

    /// Parse a `LHS -> RHS…` line. Unlike the file reader, a missing arrow
    /// is an error here.
    pub fn parse(line: &str) -> Result<Rule, GrammarError> {
        let Some((lhs, rhs)) = line.split_once("->") else {
            return Err(GrammarError::MissingArrow(line.to_string()));
        };
        let lhs = lhs.trim();
        if lhs.is_empty() {
            return Err(GrammarError::MissingArrow(line.to_string()));
        }
        let rhs = rhs.split_whitespace().map(SmolStr::new).collect();
        Rule::new(SmolStr::new(lhs), rhs)
    }

    /// Constructor for rules known to satisfy the literal-prefix format
    /// (the gamma rule, scanned rules).
    pub(crate) fn synthetic(lhs: impl Into<Symbol>, rhs: Vec<Symbol>) -> Rule {
        let prefix = rhs.iter().take_while(|sym| is_quoted(sym.as_str())).count();
        Self::with_prefix(lhs.into(), rhs, prefix)
    }

    fn with_prefix(lhs: Symbol, rhs: Vec<Symbol>, prefix: usize) -> Rule {
        Rule { lhs, lexical: prefix > 0, prefix, rhs }
    }

    pub fn lhs(&self) -> &Symbol {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }

    /// Does the rhs open with quoted word literals?
    pub fn lexical(&self) -> bool {
        self.lexical
    }

    /// Length of the leading run of quoted literals.
    pub fn literal_prefix_len(&self) -> usize {
        self.prefix
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} -> {EPSILON}", self.lhs)
        } else {
            write!(f, "{} -> {}", self.lhs, self.rhs.iter().join(" "))
        }
    }
}

/// The set of part-of-speech tags, injected once and treated as read-only.
#[derive(Debug, Clone, Default)]
pub struct PartsOfSpeech {
    tags: Vec<Symbol>,
}

impl PartsOfSpeech {
    pub fn new<I, S>(tags: I) -> PartsOfSpeech
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let tags: Vec<Symbol> = tags.into_iter().map(Into::into).sorted().dedup().collect();
        PartsOfSpeech { tags }
    }

    pub fn contains(&self, sym: &str) -> bool {
        self.tags.binary_search_by(|tag| tag.as_str().cmp(sym)).is_ok()
    }

    /// Tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// One scanned rule `P -> '*'` per part of speech. Built before any parser
/// and never written afterwards; pre-scanning synthesizes completed items
/// over these rules.
#[derive(Debug, Clone, Default)]
pub struct ScannedRules {
    rules: HashMap<Symbol, Rc<Rule>>,
}

impl ScannedRules {
    pub fn build(pos: &PartsOfSpeech) -> ScannedRules {
        let mut rules = HashMap::new();
        for tag in pos.iter() {
            let rhs = vec![Symbol::new(format!("'{WILDCARD}'"))];
            rules.insert(tag.clone(), Rc::new(Rule::synthetic(tag.clone(), rhs)));
        }
        ScannedRules { rules }
    }

    pub fn rule_for(&self, pos: &str) -> Option<&Rc<Rule>> {
        self.rules.get(pos)
    }
}

/// The primary owner of all grammar data.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    /// Rules reachable from `START`, indexed by lhs.
    reachable: HashMap<Symbol, Vec<Rc<Rule>>>,
    /// Every rule as written, whether reachable or not.
    schematic: Vec<Rc<Rule>>,
    /// Reachable rules in admission order, for deterministic iteration.
    admitted: Vec<Rc<Rule>>,
    /// Nonterminals known reachable from `START` (as lhs candidates).
    reached: HashSet<Symbol>,
}

impl Grammar {
    pub fn new() -> Grammar {
        let mut reached = HashSet::new();
        reached.insert(Symbol::new(START));
        Grammar { reachable: HashMap::new(), schematic: Vec::new(), admitted: Vec::new(), reached }
    }

    /// Normalize (rename + POS assignment) and index a rule set.
    pub fn from_rules(rules: Vec<Rule>, pos: &PartsOfSpeech) -> Result<Grammar, GrammarError> {
        let mut grammar = Grammar::new();
        for rule in normalize(rules, pos)? {
            grammar.insert(rule);
        }
        Ok(grammar)
    }

    /// Record a rule; index it under its lhs if it is reachable from `START`.
    pub fn insert(&mut self, rule: Rule) {
        let rule = Rc::new(rule);
        self.schematic.push(rule.clone());
        if rule.lhs().as_str() == START || self.reached.contains(rule.lhs()) {
            self.admit(rule);
        }
    }

    /// Closure step: admitting a rule can make further schematic rules
    /// reachable. The worklist carries `(rule, lhs)` tuples so a
    /// linear-indexed subclass could concretize one schematic rule under
    /// several categories; the CFG case realizes each rule as itself.
    fn admit(&mut self, rule: Rc<Rule>) {
        let mut queue: VecDeque<(Rc<Rule>, Symbol)> = VecDeque::new();
        queue.push_back((rule.clone(), rule.lhs().clone()));
        while let Some((rule, lhs)) = queue.pop_front() {
            let entry = self.reachable.entry(lhs).or_default();
            if entry.iter().any(|known| Rc::ptr_eq(known, &rule)) {
                continue;
            }
            entry.push(rule.clone());
            self.admitted.push(rule.clone());
            for sym in rule.rhs() {
                if is_quoted(sym.as_str()) {
                    continue;
                }
                if self.reached.insert(sym.clone()) {
                    let unlocked: Vec<Rc<Rule>> = self
                        .schematic
                        .iter()
                        .filter(|pending| pending.lhs() == sym)
                        .cloned()
                        .collect();
                    for pending in unlocked {
                        let lhs = pending.lhs().clone();
                        queue.push_back((pending, lhs));
                    }
                }
            }
        }
    }

    /// Reachable rules with this lhs, if any.
    pub fn rules_for(&self, lhs: &str) -> Option<&[Rc<Rule>]> {
        self.reachable.get(lhs).map(Vec::as_slice)
    }

    /// Is this symbol an lhs in the reachable map?
    pub fn contains(&self, sym: &str) -> bool {
        self.reachable.contains_key(sym)
    }

    /// Reachable lexical rules, in admission order.
    pub fn lexical_rules(&self) -> Vec<Rc<Rule>> {
        self.admitted.iter().filter(|rule| rule.lexical()).cloned().collect()
    }

    /// Number of reachable rules.
    pub fn rule_count(&self) -> usize {
        self.admitted.len()
    }

    /// Number of rules as written, reachable or not.
    pub fn schematic_count(&self) -> usize {
        self.schematic.len()
    }

    /// Mark every nonterminal reachable from `start`.
    pub fn dfs(&self, start: &str, visited: &mut HashSet<Symbol>) {
        if !visited.insert(Symbol::new(start)) {
            return;
        }
        if let Some(rules) = self.reachable.get(start) {
            for rule in rules.clone() {
                for sym in rule.rhs() {
                    if !is_quoted(sym.as_str()) {
                        self.dfs(sym.as_str(), visited);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut builder = string_builder::Builder::default();
        for rule in &self.admitted {
            builder.append(rule.to_string());
            builder.append("\n");
        }
        match builder.string() {
            Ok(text) => write!(f, "{text}"),
            Err(_) => Err(fmt::Error),
        }
    }
}

struct Renamer {
    names: HashMap<Symbol, Symbol>,
    next: usize,
}

impl Renamer {
    fn new() -> Renamer {
        Renamer { names: HashMap::new(), next: 0 }
    }

    fn mint(&mut self) -> Symbol {
        self.next += 1;
        Symbol::new(format!("X{}", self.next))
    }

    fn rename(&mut self, sym: &Symbol, pos: &PartsOfSpeech) -> Symbol {
        if sym.as_str() == START || pos.contains(sym.as_str()) || is_quoted(sym.as_str()) {
            return sym.clone();
        }
        if let Some(known) = self.names.get(sym) {
            return known.clone();
        }
        let fresh = self.mint();
        self.names.insert(sym.clone(), fresh.clone());
        fresh
    }
}

/// Rename nonterminals to `X1, X2, …` and give every part of speech a single
/// dedicated introduction rule.
fn normalize(rules: Vec<Rule>, pos: &PartsOfSpeech) -> Result<Vec<Rule>, GrammarError> {
    match rules.iter().filter(|rule| rule.lhs().as_str() == START).count() {
        0 => return Err(GrammarError::MissingStart),
        1 => {}
        _ => return Err(GrammarError::DuplicateStart),
    }
    if let Some(rule) = rules.iter().find(|rule| rule.rhs().iter().any(|s| s.as_str() == START)) {
        return Err(GrammarError::StartOnRhs(rule.to_string()));
    }

    let mut renamer = Renamer::new();
    let mut renamed = Vec::with_capacity(rules.len());
    for rule in &rules {
        let lhs = renamer.rename(rule.lhs(), pos);
        let rhs = rule.rhs().iter().map(|sym| renamer.rename(sym, pos)).collect();
        renamed.push(Rule::new(lhs, rhs)?);
    }

    // POS assignment: each part of speech referenced on an rhs gets exactly
    // one introduction rule `Xk -> POS`, and references go through `Xk`.
    let mut aliases: HashMap<Symbol, Symbol> = HashMap::new();
    let mut alias_order: Vec<(Symbol, Symbol)> = Vec::new();
    let mut rewritten = Vec::with_capacity(renamed.len());
    for rule in &renamed {
        let rhs: Vec<Symbol> = rule
            .rhs()
            .iter()
            .map(|sym| {
                if !pos.contains(sym.as_str()) {
                    return sym.clone();
                }
                match aliases.get(sym) {
                    Some(alias) => alias.clone(),
                    None => {
                        let alias = renamer.mint();
                        aliases.insert(sym.clone(), alias.clone());
                        alias_order.push((sym.clone(), alias.clone()));
                        alias
                    }
                }
            })
            .collect();
        rewritten.push(Rule::new(rule.lhs().clone(), rhs)?);
    }
    for (tag, alias) in alias_order {
        rewritten.push(Rule::new(alias, vec![tag])?);
    }
    Ok(rewritten)
}
