//! The Earley chart: columns, items, packed spans, and the arenas that own
//! them.
//!
//! Items and spans reference each other through stable integer handles
//! ([`ItemId`], [`SpanId`]) into arenas owned by the [`Chart`]; back-pointer
//! cycles (unit productions) are therefore representable and are broken only
//! during forest traversal, never by mutation.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use log::trace;
use multimap::MultiMap;

use crate::agenda::{CompletedAgenda, PredictAgenda};
use crate::grammar::{Grammar, Rule, Symbol, EPSILON, START};

const DOTSEP: &str = "•";

/// Handle of an [`Item`] in the chart arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub usize);

/// Handle of a [`Span`] in the chart arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(pub usize);

/// An Earley state: a dotted rule with a start column, and the back-pointers
/// recording how it was derived. `predecessor` is the item with one fewer
/// dot; `reductor` is the packed completed node that advanced it.
#[derive(Debug, Clone)]
pub struct Item {
    pub rule: Rc<Rule>,
    pub dot: usize,
    pub start: usize,
    pub end: usize,
    pub predecessor: Option<ItemId>,
    pub reductor: Option<SpanId>,
}

impl Item {
    /// A fresh prediction: dot at the far left, no progress.
    pub fn predicted(rule: Rc<Rule>, at: usize) -> Item {
        Item { rule, dot: 0, start: at, end: at, predecessor: None, reductor: None }
    }

    /// An item whose progress over `start..end` was matched directly against
    /// the input (vocabulary pre-scan, lexicalized prefixes).
    pub fn spanning(rule: Rc<Rule>, dot: usize, start: usize, end: usize) -> Item {
        Item { rule, dot, start, end, predecessor: None, reductor: None }
    }

    pub fn completed(&self) -> bool {
        self.dot == self.rule.len()
    }

    /// The symbol after the dot, when not completed.
    pub fn next_term(&self) -> Option<&Symbol> {
        self.rule.rhs().get(self.dot)
    }
}

/// Identity is the dotted rule plus the start column; `end` and the
/// back-pointers are derived.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.dot == other.dot && self.start == other.start && *self.rule == *other.rule
    }
}

impl Eq for Item {}

impl std::hash::Hash for Item {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rule.hash(state);
        self.dot.hash(state);
        self.start.hash(state);
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let done = self.rule.rhs().iter().take(self.dot).join(" ");
        let remain = self.rule.rhs().iter().skip(self.dot).join(" ");
        write!(
            f,
            "[{}:{}] {} -> {done} {DOTSEP} {remain}",
            self.start,
            self.end,
            self.rule.lhs()
        )
    }
}

/// A packed local-ambiguity node: every completed item sharing
/// `(lhs, start, end)`. Each reductor is a distinct derivation.
#[derive(Debug, Clone)]
pub struct Span {
    pub lhs: Symbol,
    pub start: usize,
    pub end: usize,
    pub reductors: Vec<ItemId>,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}:{}]x{}", self.lhs, self.start, self.end, self.reductors.len())
    }
}

/// One Earley set: everything recorded at a single input position.
#[derive(Debug)]
pub struct Column {
    index: usize,
    token: Symbol,
    /// Non-completed items living here, keyed by the symbol after their dot.
    predecessors: MultiMap<Symbol, ItemId>,
    /// Spans *starting* here: lhs -> span length -> handle.
    reductors: HashMap<Symbol, HashMap<usize, SpanId>>,
    actionable_complete: CompletedAgenda,
    actionable_predict: PredictAgenda,
    completed_state_count: usize,
}

impl Column {
    fn new(index: usize, token: Symbol) -> Column {
        Column {
            index,
            token,
            predecessors: MultiMap::new(),
            reductors: HashMap::new(),
            actionable_complete: CompletedAgenda::new(),
            actionable_predict: PredictAgenda::new(),
            completed_state_count: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The input token at this position; empty at column 0 and in generator
    /// mode.
    pub fn token(&self) -> &Symbol {
        &self.token
    }

    pub fn completed_state_count(&self) -> usize {
        self.completed_state_count
    }

    /// Clear everything built during a parse; the token survives.
    fn reset(&mut self) {
        self.predecessors = MultiMap::new();
        self.reductors.clear();
        self.actionable_complete.clear();
        self.actionable_predict.clear();
        self.completed_state_count = 0;
    }

    pub fn predecessors_for(&self, sym: &str) -> Vec<ItemId> {
        self.predecessors.get_vec(sym).cloned().unwrap_or_default()
    }

    pub fn span_for(&self, lhs: &str, len: usize) -> Option<SpanId> {
        self.reductors.get(lhs)?.get(&len).copied()
    }

    /// All spans starting here under `lhs`, shortest first.
    pub fn spans_for(&self, lhs: &str) -> Vec<SpanId> {
        match self.reductors.get(lhs) {
            Some(by_len) => by_len
                .iter()
                .sorted_by_key(|(len, _)| **len)
                .map(|(_, sid)| *sid)
                .collect(),
            None => Vec::new(),
        }
    }

    /// `(lhs, length)` signatures of the spans starting here, sorted.
    pub fn reductor_signatures(&self) -> Vec<(Symbol, usize)> {
        self.reductors
            .iter()
            .flat_map(|(lhs, by_len)| by_len.keys().map(move |len| (lhs.clone(), *len)))
            .sorted()
            .collect()
    }

    pub fn agendas_empty(&self) -> bool {
        self.actionable_complete.is_empty() && self.actionable_predict.is_empty()
    }

    /// Multi-line listing of everything recorded at this column, for trace
    /// logging. Takes the chart to resolve handles into items and spans.
    pub fn dump(&self, chart: &Chart) -> String {
        let mut builder = string_builder::Builder::default();
        if self.token.is_empty() {
            builder.append(format!("column {}:\n", self.index));
        } else {
            builder.append(format!("column {} {:?}:\n", self.index, self.token.as_str()));
        }
        for sym in self.predecessors.keys().sorted() {
            for id in self.predecessors_for(sym.as_str()) {
                builder.append(format!("  {}\n", chart.item(id)));
            }
        }
        for (lhs, len) in self.reductor_signatures() {
            if let Some(sid) = self.span_for(lhs.as_str(), len) {
                let span = chart.span(sid);
                if span.is_empty() {
                    builder.append(format!("  {span} ({EPSILON})\n"));
                } else {
                    builder.append(format!("  {span}\n"));
                }
            }
        }
        builder.append(format!("  {} completed state(s)\n", self.completed_state_count));
        builder.string().unwrap_or_default()
    }
}

/// Columns plus the arenas owning every item and span of a parse.
#[derive(Debug)]
pub struct Chart {
    columns: Vec<Column>,
    items: Vec<Item>,
    spans: Vec<Span>,
}

impl Chart {
    /// Build `width` columns over the input; column `i > 0` carries token
    /// `i - 1`.
    pub fn new(tokens: &[Symbol], width: usize) -> Chart {
        let columns = (0..width)
            .map(|i| {
                let token = if i == 0 {
                    Symbol::default()
                } else {
                    tokens.get(i - 1).cloned().unwrap_or_default()
                };
                Column::new(i, token)
            })
            .collect();
        Chart { columns, items: Vec::new(), spans: Vec::new() }
    }

    /// Drop all items and spans and clear every column.
    pub fn reset(&mut self) {
        self.items.clear();
        self.spans.clear();
        for column in &mut self.columns {
            column.reset();
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.0]
    }

    pub fn span(&self, id: SpanId) -> &Span {
        &self.spans[id.0]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn alloc_item(&mut self, item: Item) -> ItemId {
        let id = ItemId(self.items.len());
        self.items.push(item);
        id
    }

    /// Insert an item into column `at`, wiring up the column indexes.
    ///
    /// Active items are recorded under the symbol they await; if that symbol
    /// is new here and predictable, it is queued for prediction, and any span
    /// already indexed under it triggers a *spontaneous dot shift* (the
    /// reductor arrived before this predecessor). Completed items are counted
    /// and queued on the completion agenda.
    pub fn add_state(&mut self, mut item: Item, at: usize, grammar: &Grammar) -> ItemId {
        item.end = at;
        match item.next_term().cloned() {
            None => {
                let start = item.start;
                trace!("chart: completed {item}");
                let id = self.alloc_item(item);
                let column = &mut self.columns[at];
                column.completed_state_count += 1;
                column.actionable_complete.enqueue(start, id);
                id
            }
            Some(awaited) => {
                trace!("chart: {item} awaits {awaited}");
                let id = self.alloc_item(item);
                let column = &mut self.columns[at];
                if !column.predecessors.contains_key(awaited.as_str())
                    && grammar.contains(awaited.as_str())
                {
                    column.actionable_predict.enqueue(awaited.clone());
                }
                column.predecessors.insert(awaited.clone(), id);
                for sid in self.columns[at].spans_for(awaited.as_str()) {
                    let end = self.spans[sid.0].end;
                    let (rule, dot, start) = {
                        let source = &self.items[id.0];
                        (source.rule.clone(), source.dot, source.start)
                    };
                    trace!("chart: dot shift of item {} against span {}", id.0, sid.0);
                    let advanced = Item {
                        rule,
                        dot: dot + 1,
                        start,
                        end,
                        predecessor: Some(id),
                        reductor: Some(sid),
                    };
                    self.add_state(advanced, end, grammar);
                }
                id
            }
        }
    }

    /// Index a completed item into the span table of its start column.
    ///
    /// Returns the span handle and whether local ambiguity was found: `true`
    /// means a span with this `(lhs, start, end)` already existed and the item
    /// was packed into it, so it must not be propagated to predecessors
    /// again.
    pub fn insert_reductor(&mut self, id: ItemId) -> (SpanId, bool) {
        let (lhs, start, end) = {
            let item = &self.items[id.0];
            (item.rule.lhs().clone(), item.start, item.end)
        };
        let len = end - start;
        let next = SpanId(self.spans.len());
        match self.columns[start].reductors.entry(lhs.clone()).or_default().entry(len) {
            Entry::Occupied(slot) => {
                let sid = *slot.get();
                self.spans[sid.0].reductors.push(id);
                (sid, true)
            }
            Entry::Vacant(slot) => {
                slot.insert(next);
                self.spans.push(Span { lhs, start, end, reductors: vec![id] });
                (next, false)
            }
        }
    }

    /// The root of the forest: the `START` span of the given length at
    /// column 0.
    pub fn start_span(&self, length: usize) -> Option<SpanId> {
        self.columns.first()?.span_for(START, length)
    }

    pub fn dequeue_complete(&mut self, index: usize) -> Option<ItemId> {
        self.columns[index].actionable_complete.dequeue()
    }

    pub fn dequeue_predict(&mut self, index: usize) -> Option<Symbol> {
        self.columns[index].actionable_predict.dequeue()
    }

    /// Empty every column's agendas; used when a parse is rejected so the
    /// chart is left quiescent.
    pub fn drain_agendas(&mut self) {
        for column in &mut self.columns {
            column.actionable_complete.clear();
            column.actionable_predict.clear();
        }
    }

    pub fn agendas_empty(&self) -> bool {
        self.columns.iter().all(Column::agendas_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s)
    }

    #[test]
    fn spans_report_their_width() {
        let span = Span { lhs: sym("A"), start: 1, end: 3, reductors: vec![ItemId(0)] };
        assert_eq!(span.len(), 2);
        assert!(!span.is_empty());

        let epsilon = Span { lhs: sym("B"), start: 2, end: 2, reductors: vec![ItemId(1)] };
        assert_eq!(epsilon.len(), 0);
        assert!(epsilon.is_empty());
    }

    #[test]
    fn dump_lists_items_and_spans() {
        let mut grammar = Grammar::new();
        grammar.insert(Rule::new("START", vec![sym("A")]).unwrap());
        grammar.insert(Rule::new("A", vec![sym("'x'")]).unwrap());

        let tokens = [sym("x")];
        let mut chart = Chart::new(&tokens, 2);
        let start_rule = grammar.rules_for(START).unwrap()[0].clone();
        chart.add_state(Item::predicted(start_rule, 0), 0, &grammar);
        // a completed epsilon item packs into a zero-width span
        let epsilon_rule = Rc::new(Rule::new("B", Vec::new()).unwrap());
        let id = chart.alloc_item(Item::spanning(epsilon_rule, 0, 0, 0));
        chart.insert_reductor(id);

        let dump = chart.column(0).dump(&chart);
        assert!(dump.contains("column 0"), "{dump}");
        assert!(dump.contains("START ->"), "{dump}");
        assert!(dump.contains("B[0:0]"), "{dump}");
        assert!(dump.contains(EPSILON), "{dump}");

        // column 1 carries its token in the header
        assert!(chart.column(1).dump(&chart).contains("\"x\""));
    }
}
