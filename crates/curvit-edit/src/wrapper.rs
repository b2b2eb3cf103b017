#![forbid(unsafe_code)]

//! Identity-bearing handles over curves and keyframes.
//!
//! A [`CurveWrapper`] owns its [`Curve`] together with a slot table:
//! `slots[i]` is the [`KeyId`] of `curve.keys()[i]`. Every mutation of the
//! curve goes through a wrapper method that updates both in lockstep, so a
//! key can always be resolved from its id and a keyframe index can always
//! be resolved back to its id, even after keyframes are replaced or
//! re-sorted.
//!
//! A [`KeyWrapper`] carries the editing metadata of one logical key (its
//! tangent modes) and the id of the curve that holds its keyframe.

use curvit_core::{Continuity, Curve, CurveLoop, Keyframe, TangentMode};

use crate::id::{CurveId, KeyId};
use crate::palette::CurveColor;

/// Anything stored in a [`WrapperCollection`](crate::collection::WrapperCollection).
pub trait Wrapper {
    /// Id type used as the collection key.
    type Id: Copy + Ord + std::fmt::Debug;

    /// Human-readable kind, used in diagnostics.
    const KIND: &'static str;

    /// The wrapper's id.
    fn id(&self) -> Self::Id;

    /// Raw id value, used in diagnostics.
    fn raw_id(&self) -> u64;
}

/// Saved keyframes and slot order of one curve.
///
/// Restoring a snapshot puts back every keyframe bit-for-bit, including
/// neighbors whose tangents were recomputed by an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSnapshot {
    /// Curve the snapshot was taken from.
    pub curve: CurveId,
    keys: Vec<Keyframe>,
    slots: Vec<KeyId>,
}

impl CurveSnapshot {
    /// Saved keyframes, in position order.
    #[must_use]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Saved key ids, parallel to [`keys`](Self::keys).
    #[must_use]
    pub fn slots(&self) -> &[KeyId] {
        &self.slots
    }

    /// Approximate heap footprint.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.keys.len() * std::mem::size_of::<Keyframe>()
            + self.slots.len() * std::mem::size_of::<KeyId>()
    }
}

/// A named curve plus its display state and key slot table.
#[derive(Debug, Clone)]
pub struct CurveWrapper {
    id: CurveId,
    name: String,
    path: String,
    /// Color used when drawing the curve.
    pub color: CurveColor,
    /// Hidden curves are neither drawn nor hit-tested.
    pub visible: bool,
    curve: Curve,
    slots: Vec<KeyId>,
}

impl CurveWrapper {
    /// Wrap `curve`, giving each of its existing keys an id from `next_key`.
    pub(crate) fn new(
        id: CurveId,
        path: impl Into<String>,
        curve: Curve,
        color: CurveColor,
        mut next_key: impl FnMut() -> KeyId,
    ) -> Self {
        let path = path.into();
        let name = path.rsplit('.').next().unwrap_or_default().to_string();
        let slots = (0..curve.len()).map(|_| next_key()).collect();
        Self {
            id,
            name,
            path,
            color,
            visible: true,
            curve,
            slots,
        }
    }

    /// Curve id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> CurveId {
        self.id
    }

    /// Leaf name (last path segment).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full dotted path the curve was registered under.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The wrapped curve.
    #[inline]
    #[must_use]
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Key ids in keyframe order.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[KeyId] {
        &self.slots
    }

    /// Keyframe index of `key`.
    #[must_use]
    pub fn index_of(&self, key: KeyId) -> Option<usize> {
        self.slots.iter().position(|&k| k == key)
    }

    /// Current keyframe of `key`.
    #[must_use]
    pub fn keyframe(&self, key: KeyId) -> Option<Keyframe> {
        self.index_of(key).and_then(|i| self.curve.key(i).copied())
    }

    /// `(id, keyframe)` pairs in position order.
    pub fn iter_keys(&self) -> impl Iterator<Item = (KeyId, &Keyframe)> + '_ {
        self.slots.iter().copied().zip(self.curve.keys())
    }

    /// Neighbor ids of `key` as `(previous, next)`.
    #[must_use]
    pub fn neighbors(&self, key: KeyId) -> (Option<KeyId>, Option<KeyId>) {
        let Some(i) = self.index_of(key) else {
            return (None, None);
        };
        let prev = i.checked_sub(1).map(|p| self.slots[p]);
        let next = self.slots.get(i + 1).copied();
        (prev, next)
    }

    // ========================================================================
    // Mutation (crate-internal: keeps keys and slots in lockstep)
    // ========================================================================

    pub(crate) fn insert_key(&mut self, id: KeyId, key: Keyframe) -> usize {
        let index = self.curve.add(key);
        self.slots.insert(index, id);
        index
    }

    pub(crate) fn insert_key_at(&mut self, index: usize, id: KeyId, key: Keyframe) -> usize {
        let index = self.curve.insert_at(index, key);
        self.slots.insert(index, id);
        index
    }

    pub(crate) fn remove_key(&mut self, id: KeyId) -> Option<(usize, Keyframe)> {
        let index = self.index_of(id)?;
        let key = self.curve.remove(index)?;
        self.slots.remove(index);
        Some((index, key))
    }

    pub(crate) fn replace_key(&mut self, id: KeyId, key: Keyframe) -> Option<usize> {
        let index = self.index_of(id)?;
        let new_index = self.curve.replace(index, key)?;
        if new_index != index {
            let slot = self.slots.remove(index);
            self.slots.insert(new_index, slot);
        }
        Some(new_index)
    }

    pub(crate) fn set_tangents(&mut self, id: KeyId, tangent_in: f32, tangent_out: f32) -> bool {
        self.index_of(id)
            .is_some_and(|i| self.curve.set_tangents(i, tangent_in, tangent_out))
    }

    pub(crate) fn set_continuity(&mut self, id: KeyId, continuity: Continuity) -> bool {
        self.index_of(id)
            .is_some_and(|i| self.curve.set_continuity(i, continuity))
    }

    pub(crate) fn set_loops(&mut self, pre: CurveLoop, post: CurveLoop) {
        self.curve.pre_loop = pre;
        self.curve.post_loop = post;
    }

    /// Recompute tangents, looking up each key's modes by id.
    pub(crate) fn compute_tangents(&mut self, modes: impl Fn(KeyId) -> (TangentMode, TangentMode)) {
        let slots = &self.slots;
        self.curve.compute_tangents(|i| modes(slots[i]));
    }

    pub(crate) fn snapshot(&self) -> CurveSnapshot {
        CurveSnapshot {
            curve: self.id,
            keys: self.curve.keys().to_vec(),
            slots: self.slots.clone(),
        }
    }

    /// Put keys and slots back exactly as captured. `false` if the
    /// snapshot's keys are out of order; nothing is changed then.
    pub(crate) fn restore(&mut self, snapshot: &CurveSnapshot) -> bool {
        if !self.curve.restore_keys(snapshot.keys.clone()) {
            return false;
        }
        self.slots = snapshot.slots.clone();
        true
    }
}

impl Wrapper for CurveWrapper {
    type Id = CurveId;
    const KIND: &'static str = "curve";

    fn id(&self) -> CurveId {
        self.id
    }

    fn raw_id(&self) -> u64 {
        self.id.raw()
    }
}

/// One side of a key's tangent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TangentSide {
    /// Incoming tangent (towards the previous key).
    In,
    /// Outgoing tangent (towards the next key).
    Out,
}

impl TangentSide {
    /// Both sides, in then out.
    pub const BOTH: [Self; 2] = [Self::In, Self::Out];
}

/// Editing metadata for one logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyWrapper {
    id: KeyId,
    curve: CurveId,
    /// Mode of the incoming tangent.
    pub tangent_in_mode: TangentMode,
    /// Mode of the outgoing tangent.
    pub tangent_out_mode: TangentMode,
}

impl KeyWrapper {
    /// Create a key wrapper with the same mode on both sides.
    #[must_use]
    pub const fn new(id: KeyId, curve: CurveId, mode: TangentMode) -> Self {
        Self {
            id,
            curve,
            tangent_in_mode: mode,
            tangent_out_mode: mode,
        }
    }

    /// Key id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> KeyId {
        self.id
    }

    /// Curve holding this key's keyframe.
    #[inline]
    #[must_use]
    pub fn curve(&self) -> CurveId {
        self.curve
    }

    /// `(in, out)` tangent modes.
    #[inline]
    #[must_use]
    pub fn modes(&self) -> (TangentMode, TangentMode) {
        (self.tangent_in_mode, self.tangent_out_mode)
    }

    /// Mode of one side.
    #[must_use]
    pub fn mode(&self, side: TangentSide) -> TangentMode {
        match side {
            TangentSide::In => self.tangent_in_mode,
            TangentSide::Out => self.tangent_out_mode,
        }
    }

    pub(crate) fn set_modes(&mut self, tangent_in: TangentMode, tangent_out: TangentMode) {
        self.tangent_in_mode = tangent_in;
        self.tangent_out_mode = tangent_out;
    }
}

impl Wrapper for KeyWrapper {
    type Id = KeyId;
    const KIND: &'static str = "key";

    fn id(&self) -> KeyId {
        self.id
    }

    fn raw_id(&self) -> u64 {
        self.id.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper() -> CurveWrapper {
        let curve = Curve::from_keys([
            Keyframe::new(0.0, 0.0),
            Keyframe::new(1.0, 1.0),
            Keyframe::new(2.0, 0.0),
        ]);
        let mut next = 10;
        CurveWrapper::new(CurveId::new(1), "Obj.Pos.X", curve, CurveColor::WHITE, || {
            next += 1;
            KeyId::new(next)
        })
    }

    #[test]
    fn existing_keys_get_slots() {
        let w = wrapper();
        assert_eq!(w.slots(), &[KeyId::new(11), KeyId::new(12), KeyId::new(13)]);
        assert_eq!(w.name(), "X");
        assert_eq!(w.path(), "Obj.Pos.X");
    }

    #[test]
    fn replace_key_moves_slot_with_keyframe() {
        let mut w = wrapper();
        let moved = KeyId::new(11);
        assert_eq!(w.replace_key(moved, Keyframe::new(5.0, 0.0)), Some(2));
        assert_eq!(w.slots(), &[KeyId::new(12), KeyId::new(13), moved]);
        assert_eq!(w.keyframe(moved).unwrap().position, 5.0);
    }

    #[test]
    fn remove_and_reinsert_at_index() {
        let mut w = wrapper();
        let (index, key) = w.remove_key(KeyId::new(12)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(w.slots().len(), 2);
        assert_eq!(w.insert_key_at(index, KeyId::new(12), key), 1);
        assert_eq!(w.slots(), &[KeyId::new(11), KeyId::new(12), KeyId::new(13)]);
    }

    #[test]
    fn snapshot_restores_keys_and_slots() {
        let mut w = wrapper();
        let snap = w.snapshot();
        w.replace_key(KeyId::new(11), Keyframe::new(9.0, 9.0));
        w.remove_key(KeyId::new(13));
        assert!(w.restore(&snap));
        assert_eq!(w.snapshot(), snap);
    }

    #[test]
    fn restore_keeps_slots_on_signed_zero_tie() {
        let mut w = CurveWrapper::new(
            CurveId::new(1),
            "Tie",
            Curve::new(),
            CurveColor::WHITE,
            || KeyId::new(0),
        );
        w.insert_key(KeyId::new(1), Keyframe::new(0.0, 1.0));
        w.insert_key(KeyId::new(2), Keyframe::new(-0.0, 2.0));
        let snap = w.snapshot();

        w.insert_key(KeyId::new(3), Keyframe::new(5.0, 0.0));
        assert!(w.restore(&snap));
        assert_eq!(w.keyframe(KeyId::new(1)).unwrap().value, 1.0);
        assert_eq!(w.keyframe(KeyId::new(2)).unwrap().value, 2.0);
    }

    #[test]
    fn neighbors_follow_order() {
        let w = wrapper();
        assert_eq!(w.neighbors(KeyId::new(11)), (None, Some(KeyId::new(12))));
        assert_eq!(
            w.neighbors(KeyId::new(12)),
            (Some(KeyId::new(11)), Some(KeyId::new(13)))
        );
        assert_eq!(w.neighbors(KeyId::new(99)), (None, None));
    }
}
