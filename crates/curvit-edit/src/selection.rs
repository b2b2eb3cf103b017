#![forbid(unsafe_code)]

//! The set of selected keys.
//!
//! Order is the order keys were selected in. The set itself is only
//! mutated by edit commands so that selection changes take part in
//! undo/redo; [`SelectionSet::combine`] lets an interaction layer compute
//! the id list for a [`SelectKeysCommand`](crate::commands::SelectKeysCommand)
//! from a fresh set of hits.

use crate::id::KeyId;

/// How new hits combine with the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Hits become the selection.
    #[default]
    Replace,
    /// Hits are added.
    Union,
    /// Hits are removed.
    Except,
    /// Only keys both selected and hit remain.
    Intersect,
}

/// Ordered set of selected key ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<KeyId>,
}

impl SelectionSet {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids, in selection order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[KeyId] {
        &self.ids
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: KeyId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selection resulting from applying `hits` with `mode`.
    ///
    /// Does not modify `self`.
    #[must_use]
    pub fn combine(&self, hits: &[KeyId], mode: SelectionMode) -> Vec<KeyId> {
        match mode {
            SelectionMode::Replace => dedup(hits.iter().copied()),
            SelectionMode::Union => dedup(self.ids.iter().chain(hits).copied()),
            SelectionMode::Except => self
                .ids
                .iter()
                .copied()
                .filter(|id| !hits.contains(id))
                .collect(),
            SelectionMode::Intersect => self
                .ids
                .iter()
                .copied()
                .filter(|id| hits.contains(id))
                .collect(),
        }
    }

    pub(crate) fn replace(&mut self, ids: impl IntoIterator<Item = KeyId>) {
        self.ids = dedup(ids);
    }

    pub(crate) fn remove(&mut self, id: KeyId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&k| k != id);
        self.ids.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }
}

fn dedup(ids: impl IntoIterator<Item = KeyId>) -> Vec<KeyId> {
    let mut out: Vec<KeyId> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<KeyId> {
        raw.iter().copied().map(KeyId::new).collect()
    }

    fn selected(raw: &[u64]) -> SelectionSet {
        let mut set = SelectionSet::new();
        set.replace(ids(raw));
        set
    }

    #[test]
    fn replace_drops_duplicates_keeping_first() {
        let set = selected(&[3, 1, 3, 2]);
        assert_eq!(set.ids(), ids(&[3, 1, 2]).as_slice());
    }

    #[test]
    fn combine_modes() {
        let set = selected(&[1, 2, 3]);
        let hits = ids(&[3, 4]);
        assert_eq!(set.combine(&hits, SelectionMode::Replace), ids(&[3, 4]));
        assert_eq!(set.combine(&hits, SelectionMode::Union), ids(&[1, 2, 3, 4]));
        assert_eq!(set.combine(&hits, SelectionMode::Except), ids(&[1, 2]));
        assert_eq!(set.combine(&hits, SelectionMode::Intersect), ids(&[3]));
        // combine never mutates.
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn remove_reports_membership() {
        let mut set = selected(&[1, 2]);
        assert!(set.remove(KeyId::new(1)));
        assert!(!set.remove(KeyId::new(1)));
        assert!(set.contains(KeyId::new(2)));
        set.clear();
        assert!(set.is_empty());
    }
}
