#![forbid(unsafe_code)]

//! Id-keyed wrapper collections with change observers.
//!
//! A [`WrapperCollection`] stores wrappers in a `BTreeMap` keyed by id, so
//! iteration follows creation order. Adding an id that is already present
//! fails with [`DuplicateIdError`] and leaves the collection untouched.
//!
//! Observers registered with [`subscribe`](WrapperCollection::subscribe)
//! are notified synchronously after each insertion or removal, in
//! registration order.

use std::collections::BTreeMap;
use std::fmt;

use crate::wrapper::{CurveWrapper, KeyWrapper, Wrapper};

/// An insertion tried to reuse an id that is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateIdError {
    /// Wrapper kind (`"curve"` or `"key"`).
    pub kind: &'static str,
    /// The conflicting id.
    pub id: u64,
}

impl fmt::Display for DuplicateIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate {} id {}", self.kind, self.id)
    }
}

impl std::error::Error for DuplicateIdError {}

/// Receives change notifications from a [`WrapperCollection`].
pub trait CollectionObserver<W> {
    /// Called after `item` was inserted.
    fn on_added(&mut self, _item: &W) {}

    /// Called after `item` was removed.
    fn on_removed(&mut self, _item: &W) {}
}

/// Wrappers keyed by id.
pub struct WrapperCollection<W: Wrapper> {
    items: BTreeMap<W::Id, W>,
    observers: Vec<Box<dyn CollectionObserver<W>>>,
}

/// Curves keyed by [`CurveId`](crate::id::CurveId).
pub type CurveWrapperCollection = WrapperCollection<CurveWrapper>;

/// Keys keyed by [`KeyId`](crate::id::KeyId).
pub type KeyWrapperCollection = WrapperCollection<KeyWrapper>;

impl<W: Wrapper + fmt::Debug> fmt::Debug for WrapperCollection<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperCollection")
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<W: Wrapper> Default for WrapperCollection<W> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            observers: Vec::new(),
        }
    }
}

impl<W: Wrapper> WrapperCollection<W> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn subscribe(&mut self, observer: Box<dyn CollectionObserver<W>>) {
        self.observers.push(observer);
    }

    /// Insert `item`. Fails without modifying anything if its id exists.
    pub fn add(&mut self, item: W) -> Result<(), DuplicateIdError> {
        let id = item.id();
        if self.items.contains_key(&id) {
            tracing::warn!(kind = W::KIND, id = item.raw_id(), "duplicate id rejected");
            return Err(DuplicateIdError {
                kind: W::KIND,
                id: item.raw_id(),
            });
        }
        self.items.insert(id, item);
        if let Some(stored) = self.items.get(&id) {
            for observer in &mut self.observers {
                observer.on_added(stored);
            }
        }
        Ok(())
    }

    /// Remove and return the wrapper with `id`.
    pub fn remove(&mut self, id: W::Id) -> Option<W> {
        let item = self.items.remove(&id)?;
        for observer in &mut self.observers {
            observer.on_removed(&item);
        }
        Some(item)
    }

    /// Remove every wrapper matching `pred`, in id order.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&W) -> bool) -> Vec<W> {
        let ids: Vec<W::Id> = self
            .items
            .values()
            .filter(|w| pred(w))
            .map(Wrapper::id)
            .collect();
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Wrapper with `id`.
    #[must_use]
    pub fn get(&self, id: W::Id) -> Option<&W> {
        self.items.get(&id)
    }

    /// Mutable wrapper with `id`.
    pub fn get_mut(&mut self, id: W::Id) -> Option<&mut W> {
        self.items.get_mut(&id)
    }

    /// Whether `id` is present.
    #[must_use]
    pub fn contains(&self, id: W::Id) -> bool {
        self.items.contains_key(&id)
    }

    /// Number of wrappers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wrappers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &W> + '_ {
        self.items.values()
    }

    /// Ids in order.
    pub fn ids(&self) -> impl Iterator<Item = W::Id> + '_ {
        self.items.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use curvit_core::TangentMode;

    use super::*;
    use crate::id::{CurveId, KeyId};

    #[derive(Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl CollectionObserver<KeyWrapper> for Recorder {
        fn on_added(&mut self, item: &KeyWrapper) {
            self.events.borrow_mut().push(format!("+{}", item.id()));
        }

        fn on_removed(&mut self, item: &KeyWrapper) {
            self.events.borrow_mut().push(format!("-{}", item.id()));
        }
    }

    fn key(id: u64) -> KeyWrapper {
        KeyWrapper::new(KeyId::new(id), CurveId::new(1), TangentMode::Smooth)
    }

    #[test]
    fn duplicate_add_fails_and_keeps_original() {
        let mut keys = KeyWrapperCollection::new();
        keys.add(key(1)).unwrap();
        let mut other = key(1);
        other.tangent_in_mode = TangentMode::Flat;
        let err = keys.add(other).unwrap_err();
        assert_eq!(err, DuplicateIdError { kind: "key", id: 1 });
        assert_eq!(err.to_string(), "duplicate key id 1");
        assert_eq!(
            keys.get(KeyId::new(1)).unwrap().tangent_in_mode,
            TangentMode::Smooth
        );
    }

    #[test]
    fn observers_fire_after_mutation_in_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut keys = KeyWrapperCollection::new();
        keys.subscribe(Box::new(Recorder {
            events: Rc::clone(&events),
        }));
        keys.add(key(2)).unwrap();
        keys.add(key(1)).unwrap();
        let _ = keys.add(key(1));
        keys.remove(KeyId::new(2));
        assert!(keys.remove(KeyId::new(9)).is_none());
        assert_eq!(*events.borrow(), vec!["+key#2", "+key#1", "-key#2"]);
    }

    #[test]
    fn remove_where_returns_removed_in_id_order() {
        let mut keys = KeyWrapperCollection::new();
        for id in [3, 1, 2, 4] {
            keys.add(key(id)).unwrap();
        }
        let removed = keys.remove_where(|k| k.id().raw() % 2 == 0);
        let ids: Vec<u64> = removed.iter().map(|k| k.id().raw()).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(keys.ids().collect::<Vec<_>>(), vec![KeyId::new(1), KeyId::new(3)]);
    }
}
