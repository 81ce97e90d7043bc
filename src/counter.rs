//! Counters: markers placed on objects.
//!
//! A counter is not an object and has no properties. It is identified by a
//! name or by a (numeric value, symbol) pair. Opposing-sign counters of the
//! same symbol never cancel; both persist until individually removed.
//! Counters vanish when removed or when their host ceases to exist.

use std::collections::HashMap;

/// The symbol a marked counter modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterSymbol {
    Power,
    Defense,
    Life,
}

impl CounterSymbol {
    pub fn property(&self) -> crate::property::PropertyKind {
        use crate::property::PropertyKind;
        match self {
            CounterSymbol::Power => PropertyKind::Power,
            CounterSymbol::Defense => PropertyKind::Defense,
            CounterSymbol::Life => PropertyKind::Life,
        }
    }
}

/// Identity of a counter.
///
/// `Marked { value: 1, symbol: Power }` and `Marked { value: -1, symbol:
/// Power }` are distinct kinds; the map below keeps both populations alive
/// side by side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// A named counter (e.g. "frostbite", "aim").
    Named(String),
    /// A numeric counter on a symbol (e.g. +1 power, -1 defense).
    Marked { value: i32, symbol: CounterSymbol },
}

impl CounterKind {
    pub fn named(name: &str) -> Self {
        CounterKind::Named(name.to_string())
    }

    pub fn marked(value: i32, symbol: CounterSymbol) -> Self {
        CounterKind::Marked { value, symbol }
    }
}

/// The counters on one object.
#[derive(Debug, Clone, Default)]
pub struct CounterMap {
    counters: HashMap<CounterKind, u32>,
}

impl CounterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add counters of the given kind.
    pub fn add(&mut self, kind: CounterKind, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.counters.entry(kind).or_insert(0) += amount;
    }

    /// Remove counters of the given kind. Returns the number actually removed.
    pub fn remove(&mut self, kind: &CounterKind, amount: u32) -> u32 {
        let Some(current) = self.counters.get_mut(kind) else {
            return 0;
        };
        let removed = (*current).min(amount);
        *current -= removed;
        if *current == 0 {
            self.counters.remove(kind);
        }
        removed
    }

    /// Number of counters of the given kind.
    pub fn count(&self, kind: &CounterKind) -> u32 {
        self.counters.get(kind).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Net contribution of marked counters to one symbol. Opposing signs
    /// both persist; only the evaluation sums them.
    pub fn symbol_sum(&self, symbol: CounterSymbol) -> i32 {
        self.counters
            .iter()
            .filter_map(|(kind, count)| match kind {
                CounterKind::Marked { value, symbol: s } if *s == symbol => {
                    Some(value * *count as i32)
                }
                _ => None,
            })
            .sum()
    }

    /// Snapshot of all counters in deterministic order (for LKI capture).
    pub fn snapshot(&self) -> Vec<(CounterKind, u32)> {
        let mut entries: Vec<_> = self
            .counters
            .iter()
            .map(|(kind, count)| (kind.clone(), *count))
            .collect();
        entries.sort_by_key(|(kind, _)| format!("{kind:?}"));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposing_signs_never_cancel() {
        let mut map = CounterMap::new();
        map.add(CounterKind::marked(1, CounterSymbol::Power), 3);
        map.add(CounterKind::marked(-1, CounterSymbol::Power), 2);

        // Both populations persist.
        assert_eq!(map.count(&CounterKind::marked(1, CounterSymbol::Power)), 3);
        assert_eq!(map.count(&CounterKind::marked(-1, CounterSymbol::Power)), 2);

        // Evaluation sums them.
        assert_eq!(map.symbol_sum(CounterSymbol::Power), 1);
    }

    #[test]
    fn test_individual_removal() {
        let mut map = CounterMap::new();
        map.add(CounterKind::marked(1, CounterSymbol::Power), 2);
        map.add(CounterKind::marked(-1, CounterSymbol::Power), 2);

        let removed = map.remove(&CounterKind::marked(-1, CounterSymbol::Power), 5);
        assert_eq!(removed, 2);
        assert_eq!(map.count(&CounterKind::marked(1, CounterSymbol::Power)), 2);
        assert_eq!(map.symbol_sum(CounterSymbol::Power), 2);
    }

    #[test]
    fn test_named_counters() {
        let mut map = CounterMap::new();
        map.add(CounterKind::named("frostbite"), 1);
        assert_eq!(map.count(&CounterKind::named("frostbite")), 1);
        assert_eq!(map.symbol_sum(CounterSymbol::Power), 0);
    }

    #[test]
    fn test_zero_add_is_noop() {
        let mut map = CounterMap::new();
        map.add(CounterKind::named("aim"), 0);
        assert!(map.is_empty());
    }
}
