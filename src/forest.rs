//! Queries over the shared packed parse forest.
//!
//! The forest is the graph of items and spans linked by back-pointers; unit
//! productions make it cyclic, so every traversal colours spans as it
//! descends. A span found grey (on the current path) contributes zero
//! derivations: counting and enumeration therefore cover exactly the finite
//! derivations.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::chart::{Chart, ItemId, SpanId};
use crate::grammar::{quoted_text, PartsOfSpeech, START, WILDCARD};

/// Number of derivations rooted at a span. `visited` doubles as the colour
/// map: an entry of 0 marks a span grey (on the current path); a finished
/// span stores its total.
pub fn count_span(chart: &Chart, sid: SpanId, visited: &mut HashMap<SpanId, u64>) -> u64 {
    if let Some(&memo) = visited.get(&sid) {
        return memo;
    }
    visited.insert(sid, 0);
    let total = chart
        .span(sid)
        .reductors
        .iter()
        .map(|&rid| count_item(chart, rid, visited))
        .fold(0u64, u64::saturating_add);
    visited.insert(sid, total);
    total
}

/// Number of derivations through one reductor item: the product of its
/// predecessor chain and its reductor span (leaves count once).
pub fn count_item(chart: &Chart, id: ItemId, visited: &mut HashMap<SpanId, u64>) -> u64 {
    let item = chart.item(id);
    let reduced = match item.reductor {
        Some(sid) => count_span(chart, sid, visited),
        None => 1,
    };
    let earlier = match item.predecessor {
        Some(pid) if item.dot > 1 => count_item(chart, pid, visited),
        _ => 0,
    };
    if earlier > 0 {
        earlier.saturating_mul(reduced)
    } else {
        reduced
    }
}

/// Every derivation rooted at a span, bracketed (`(lhs inner)`) or as a
/// part-of-speech yield. `path` is the grey set; spans on the current path
/// yield nothing.
pub fn enumerate_span(
    chart: &Chart,
    pos: &PartsOfSpeech,
    sid: SpanId,
    path: &mut HashSet<SpanId>,
    pos_yield: bool,
) -> Vec<String> {
    if path.contains(&sid) {
        return Vec::new();
    }
    let span = chart.span(sid);
    if pos_yield && pos.contains(span.lhs.as_str()) {
        return vec![span.lhs.to_string()];
    }
    path.insert(sid);
    let mut out = Vec::new();
    for &rid in &span.reductors {
        for inner in enumerate_item(chart, pos, rid, path, pos_yield) {
            if pos_yield {
                out.push(inner);
            } else if inner.is_empty() {
                out.push(format!("({})", span.lhs));
            } else {
                out.push(format!("({} {})", span.lhs, inner));
            }
        }
    }
    path.remove(&sid);
    out
}

/// Cross product of an item's predecessor enumeration and its reductor
/// enumeration. Items without a reductor span are leaves: their consumed
/// literal prefix is the yield (with the wildcard replaced by the column's
/// token), or nothing in part-of-speech mode.
pub fn enumerate_item(
    chart: &Chart,
    pos: &PartsOfSpeech,
    id: ItemId,
    path: &mut HashSet<SpanId>,
    pos_yield: bool,
) -> Vec<String> {
    let item = chart.item(id);
    let inners: Vec<String> = match item.reductor {
        Some(sid) => enumerate_span(chart, pos, sid, path, pos_yield),
        None => {
            if pos_yield {
                vec![String::new()]
            } else {
                let words = item.rule.rhs()[..item.dot]
                    .iter()
                    .map(|lit| {
                        let text = quoted_text(lit.as_str());
                        if text == WILDCARD {
                            let token = chart.column(item.end).token();
                            if token.is_empty() {
                                WILDCARD.to_string()
                            } else {
                                token.to_string()
                            }
                        } else {
                            text.to_string()
                        }
                    })
                    .join(" ");
                vec![words]
            }
        }
    };
    let earlier: Vec<String> = match item.predecessor {
        Some(pid) if item.dot > 1 => enumerate_item(chart, pos, pid, path, pos_yield),
        _ => Vec::new(),
    };
    if earlier.is_empty() {
        inners
    } else {
        earlier
            .iter()
            .cartesian_product(inners.iter())
            .map(|(left, right)| join_words(left, right))
            .collect()
    }
}

fn join_words(left: &str, right: &str) -> String {
    if left.is_empty() {
        right.to_string()
    } else if right.is_empty() {
        left.to_string()
    } else {
        format!("{left} {right}")
    }
}

/// The derivations of every `START` span at a column, shortest span first.
/// Parse mode has exactly one such span (the whole input); generator mode
/// has one per achievable sentence length.
pub fn formatted_strings(
    chart: &Chart,
    pos: &PartsOfSpeech,
    column_index: usize,
    pos_yield_only: bool,
) -> Vec<String> {
    let Some(column) = chart.columns().get(column_index) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for sid in column.spans_for(START) {
        out.extend(enumerate_span(chart, pos, sid, &mut HashSet::new(), pos_yield_only));
    }
    out
}
