//! Incremental reconciliation of the hovered feature set.
//!
//! Every hover flag change is a call into the renderer, so moving from one
//! hovered set to the next touches only the symmetric difference.

use std::collections::BTreeSet;

/// Minimal operations taking one set to another
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetDelta<K> {
    pub removed: Vec<K>,
    pub added: Vec<K>,
}

impl<K> SetDelta<K> {
    pub fn len(&self) -> usize {
        self.removed.len() + self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

impl<K> Default for SetDelta<K> {
    fn default() -> Self {
        Self {
            removed: Vec::new(),
            added: Vec::new(),
        }
    }
}

/// `removed = prev \ next`, `added = next \ prev`, both in key order
pub fn diff_sets<K: Ord + Clone>(prev: &BTreeSet<K>, next: &BTreeSet<K>) -> SetDelta<K> {
    SetDelta {
        removed: prev.difference(next).cloned().collect(),
        added: next.difference(prev).cloned().collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverUpdate<K> {
    pub delta: SetDelta<K>,
    /// The set went from empty to non-empty or back
    pub hovering_changed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverIndex<K> {
    current: BTreeSet<K>,
}

impl<K: Ord + Clone> Default for HoverIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> HoverIndex<K> {
    pub fn new() -> Self {
        Self {
            current: BTreeSet::new(),
        }
    }

    pub fn update(&mut self, next: BTreeSet<K>) -> HoverUpdate<K> {
        let delta = diff_sets(&self.current, &next);
        let was_hovering = self.is_hovering();
        self.current = next;

        HoverUpdate {
            delta,
            hovering_changed: was_hovering != self.is_hovering(),
        }
    }

    /// Pointer left the map: everything is un-hovered
    pub fn clear(&mut self) -> HoverUpdate<K> {
        self.update(BTreeSet::new())
    }

    /// Forget the hovered set without emitting anything
    ///
    /// For when the renderer already dropped all feature state, e.g. after a style swap.
    pub fn reset(&mut self) -> bool {
        let was_hovering = self.is_hovering();
        self.current.clear();
        was_hovering
    }

    pub fn is_hovering(&self) -> bool {
        !self.current.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.current.contains(key)
    }

    pub fn current(&self) -> &BTreeSet<K> {
        &self.current
    }
}
