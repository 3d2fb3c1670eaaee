//! Agendas driving the main loop of the parser.
//!
//! Completion follows Stolcke's priority discipline: within a column,
//! completed items are processed in decreasing order of their start column,
//! ties broken by insertion order. The agenda pairs a max-heap of *distinct*
//! start indices with one FIFO batch per index; pushing a key only when its
//! batch is created keeps duplicate keys out of the heap, which would
//! otherwise drain a batch out of order.

use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::chart::ItemId;
use crate::grammar::Symbol;

/// Completed items keyed by decreasing start column.
#[derive(Debug, Default)]
pub struct CompletedAgenda {
    keys: BinaryHeap<usize>,
    batches: HashMap<usize, VecDeque<ItemId>>,
}

impl CompletedAgenda {
    pub fn new() -> CompletedAgenda {
        CompletedAgenda::default()
    }

    pub fn enqueue(&mut self, start: usize, item: ItemId) {
        match self.batches.entry(start) {
            Entry::Occupied(batch) => batch.into_mut().push_back(item),
            Entry::Vacant(slot) => {
                self.keys.push(start);
                slot.insert(VecDeque::from([item]));
            }
        }
    }

    /// The oldest item at the maximum start index.
    pub fn dequeue(&mut self) -> Option<ItemId> {
        let top = *self.keys.peek()?;
        let batch = self.batches.get_mut(&top)?;
        let item = batch.pop_front();
        if batch.is_empty() {
            self.batches.remove(&top);
            self.keys.pop();
        }
        item
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.batches.values().map(VecDeque::len).sum()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.batches.clear();
    }
}

/// Nonterminals awaiting prediction, FIFO, at most one entry per nonterminal
/// for the lifetime of the column (the seen-set outlives dequeue).
#[derive(Debug, Default)]
pub struct PredictAgenda {
    queue: VecDeque<Symbol>,
    seen: HashSet<Symbol>,
}

impl PredictAgenda {
    pub fn new() -> PredictAgenda {
        PredictAgenda::default()
    }

    pub fn enqueue(&mut self, sym: Symbol) {
        if self.seen.insert(sym.clone()) {
            self.queue.push_back(sym);
        }
    }

    pub fn dequeue(&mut self) -> Option<Symbol> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_drain_by_decreasing_start_then_fifo() {
        let mut agenda = CompletedAgenda::new();
        agenda.enqueue(0, ItemId(10));
        agenda.enqueue(2, ItemId(11));
        agenda.enqueue(1, ItemId(12));
        agenda.enqueue(2, ItemId(13));
        let drained: Vec<ItemId> = std::iter::from_fn(|| agenda.dequeue()).collect();
        assert_eq!(drained, vec![ItemId(11), ItemId(13), ItemId(12), ItemId(10)]);
        assert!(agenda.is_empty());
    }

    #[test]
    fn duplicate_keys_do_not_duplicate_heap_entries() {
        let mut agenda = CompletedAgenda::new();
        agenda.enqueue(3, ItemId(0));
        agenda.enqueue(3, ItemId(1));
        agenda.enqueue(3, ItemId(2));
        assert_eq!(agenda.len(), 3);
        assert_eq!(agenda.dequeue(), Some(ItemId(0)));
        assert_eq!(agenda.dequeue(), Some(ItemId(1)));
        assert_eq!(agenda.dequeue(), Some(ItemId(2)));
        assert_eq!(agenda.dequeue(), None);
    }

    #[test]
    fn a_key_reappearing_after_its_batch_drained_is_reinserted() {
        let mut agenda = CompletedAgenda::new();
        agenda.enqueue(1, ItemId(0));
        assert_eq!(agenda.dequeue(), Some(ItemId(0)));
        agenda.enqueue(1, ItemId(1));
        assert_eq!(agenda.dequeue(), Some(ItemId(1)));
        assert!(agenda.is_empty());
    }

    #[test]
    fn predictions_are_fifo_and_deduplicated() {
        let mut agenda = PredictAgenda::new();
        agenda.enqueue(Symbol::new("A"));
        agenda.enqueue(Symbol::new("B"));
        agenda.enqueue(Symbol::new("A"));
        assert_eq!(agenda.dequeue(), Some(Symbol::new("A")));
        // still deduplicated after A has been dequeued
        agenda.enqueue(Symbol::new("A"));
        assert_eq!(agenda.dequeue(), Some(Symbol::new("B")));
        assert_eq!(agenda.dequeue(), None);
    }
}
