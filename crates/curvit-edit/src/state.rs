#![forbid(unsafe_code)]

//! Editable state: curves, keys, and the selection.
//!
//! [`EditorState`] is the target every edit command runs against. Its
//! readers are public; its mutators are crate-internal and are reached
//! through commands (or the editor's non-undoable curve registration), so
//! every change to keys or selection is recorded in history.
//!
//! # Invariants
//!
//! 1. Every [`KeyWrapper`] in `keys` has exactly one slot in the curve it
//!    names, and every slot names a live [`KeyWrapper`].
//! 2. The selection only holds live key ids.
//! 3. Tangents are recomputed at most once per curve per call to
//!    [`EditorState::recompute_tangents`].

use std::collections::BTreeSet;

use curvit_core::{Continuity, Curve, Keyframe, TangentMode};

use crate::collection::{CollectionObserver, CurveWrapperCollection, KeyWrapperCollection};
use crate::id::{CurveId, IdAllocator, KeyId};
use crate::palette::CurveColor;
use crate::selection::SelectionSet;
use crate::undo::CommandError;
use crate::wrapper::{CurveSnapshot, CurveWrapper, KeyWrapper};

/// A key taken out of its curve, with everything needed to put it back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovedKey {
    /// Wrapper (id and tangent modes).
    pub wrapper: KeyWrapper,
    /// Keyframe index the key occupied.
    pub index: usize,
    /// Keyframe at removal time.
    pub keyframe: Keyframe,
}

/// Curves, keys, and selection.
#[derive(Debug)]
pub struct EditorState {
    curves: CurveWrapperCollection,
    keys: KeyWrapperCollection,
    selection: SelectionSet,
    curve_ids: IdAllocator,
    key_ids: IdAllocator,
    default_mode: TangentMode,
    recompute_passes: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(TangentMode::Smooth)
    }
}

impl EditorState {
    /// Create empty state. New keys get `default_mode` on both sides.
    #[must_use]
    pub fn new(default_mode: TangentMode) -> Self {
        Self {
            curves: CurveWrapperCollection::new(),
            keys: KeyWrapperCollection::new(),
            selection: SelectionSet::new(),
            curve_ids: IdAllocator::new(),
            key_ids: IdAllocator::new(),
            default_mode,
            recompute_passes: 0,
        }
    }

    // ========================================================================
    // Readers
    // ========================================================================

    /// All curves.
    #[must_use]
    pub fn curves(&self) -> &CurveWrapperCollection {
        &self.curves
    }

    /// All keys.
    #[must_use]
    pub fn keys(&self) -> &KeyWrapperCollection {
        &self.keys
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Curve with `id`.
    #[must_use]
    pub fn curve(&self, id: CurveId) -> Option<&CurveWrapper> {
        self.curves.get(id)
    }

    /// Key with `id`.
    #[must_use]
    pub fn key(&self, id: KeyId) -> Option<&KeyWrapper> {
        self.keys.get(id)
    }

    /// Current keyframe of `id`.
    #[must_use]
    pub fn keyframe(&self, id: KeyId) -> Option<Keyframe> {
        let key = self.keys.get(id)?;
        self.curves.get(key.curve())?.keyframe(id)
    }

    /// Mode given to newly added keys.
    #[must_use]
    pub fn default_tangent_mode(&self) -> TangentMode {
        self.default_mode
    }

    /// Number of per-curve tangent recompute passes run so far.
    #[must_use]
    pub fn recompute_passes(&self) -> u64 {
        self.recompute_passes
    }

    /// Curve holding `key`.
    pub fn owner_of(&self, key: KeyId) -> Result<CurveId, CommandError> {
        self.keys
            .get(key)
            .map(KeyWrapper::curve)
            .ok_or(CommandError::UnknownKey(key))
    }

    /// Distinct curves holding `keys`, in id order.
    pub fn owners_of(&self, keys: &[KeyId]) -> Result<BTreeSet<CurveId>, CommandError> {
        keys.iter().map(|&k| self.owner_of(k)).collect()
    }

    // ========================================================================
    // Curves
    // ========================================================================

    pub(crate) fn set_default_tangent_mode(&mut self, mode: TangentMode) {
        self.default_mode = mode;
    }

    pub(crate) fn curve_mut(&mut self, id: CurveId) -> Option<&mut CurveWrapper> {
        self.curves.get_mut(id)
    }

    pub(crate) fn subscribe_curves(&mut self, observer: Box<dyn CollectionObserver<CurveWrapper>>) {
        self.curves.subscribe(observer);
    }

    pub(crate) fn subscribe_keys(&mut self, observer: Box<dyn CollectionObserver<KeyWrapper>>) {
        self.keys.subscribe(observer);
    }

    /// Register `curve`, giving its existing keys `Custom` tangents so the
    /// stored values are kept.
    pub(crate) fn insert_curve(&mut self, path: &str, curve: Curve, color: CurveColor) -> CurveId {
        let id = CurveId::new(self.curve_ids.allocate());
        let key_ids = &mut self.key_ids;
        let wrapper = CurveWrapper::new(id, path, curve, color, || {
            KeyId::new(key_ids.allocate())
        });
        for &key in wrapper.slots() {
            // Fresh ids from the allocator cannot collide.
            let _ = self
                .keys
                .add(KeyWrapper::new(key, id, TangentMode::Custom));
        }
        // Fresh ids from the allocator cannot collide.
        let _ = self.curves.add(wrapper);
        id
    }

    /// Remove a curve and every key it holds.
    pub(crate) fn remove_curve(&mut self, id: CurveId) -> Option<CurveWrapper> {
        let wrapper = self.curves.remove(id)?;
        let removed = self.keys.remove_where(|k| k.curve() == id);
        for key in &removed {
            self.selection.remove(key.id());
        }
        tracing::debug!(curve = %id, keys = removed.len(), "curve removed");
        Some(wrapper)
    }

    // ========================================================================
    // Keys
    // ========================================================================

    /// Add a key with a fresh id.
    pub(crate) fn add_key(
        &mut self,
        curve: CurveId,
        keyframe: Keyframe,
        mode: TangentMode,
    ) -> Result<KeyId, CommandError> {
        if !self.curves.contains(curve) {
            return Err(CommandError::UnknownCurve(curve));
        }
        let id = KeyId::new(self.key_ids.allocate());
        self.add_key_with_id(id, curve, keyframe, mode)?;
        Ok(id)
    }

    /// Add a key reusing `id` (redo of an insertion).
    pub(crate) fn add_key_with_id(
        &mut self,
        id: KeyId,
        curve: CurveId,
        keyframe: Keyframe,
        mode: TangentMode,
    ) -> Result<(), CommandError> {
        let Some(wrapper) = self.curves.get_mut(curve) else {
            return Err(CommandError::UnknownCurve(curve));
        };
        self.keys.add(KeyWrapper::new(id, curve, mode))?;
        wrapper.insert_key(id, keyframe);
        self.key_ids.reserve(id.raw());
        Ok(())
    }

    /// Put a removed key back with its id, modes, index, and values.
    pub(crate) fn restore_key(&mut self, removed: &RemovedKey) -> Result<(), CommandError> {
        let curve = removed.wrapper.curve();
        let Some(wrapper) = self.curves.get_mut(curve) else {
            return Err(CommandError::UnknownCurve(curve));
        };
        self.keys.add(removed.wrapper)?;
        wrapper.insert_key_at(removed.index, removed.wrapper.id(), removed.keyframe);
        self.key_ids.reserve(removed.wrapper.id().raw());
        Ok(())
    }

    /// Remove a key from its curve, the key collection, and the selection.
    pub(crate) fn remove_key(&mut self, id: KeyId) -> Result<RemovedKey, CommandError> {
        let curve = self.owner_of(id)?;
        let wrapper = self
            .curves
            .get_mut(curve)
            .ok_or(CommandError::UnknownCurve(curve))?;
        let (index, keyframe) = wrapper.remove_key(id).ok_or(CommandError::UnknownKey(id))?;
        let key = self.keys.remove(id).ok_or(CommandError::UnknownKey(id))?;
        self.selection.remove(id);
        Ok(RemovedKey {
            wrapper: key,
            index,
            keyframe,
        })
    }

    /// Replace the keyframe of `id`, re-sorting its curve.
    pub(crate) fn replace_keyframe(
        &mut self,
        id: KeyId,
        keyframe: Keyframe,
    ) -> Result<(), CommandError> {
        let curve = self.owner_of(id)?;
        self.curves
            .get_mut(curve)
            .and_then(|w| w.replace_key(id, keyframe))
            .map(|_| ())
            .ok_or(CommandError::UnknownKey(id))
    }

    pub(crate) fn set_tangents(
        &mut self,
        id: KeyId,
        tangent_in: f32,
        tangent_out: f32,
    ) -> Result<(), CommandError> {
        let curve = self.owner_of(id)?;
        let ok = self
            .curves
            .get_mut(curve)
            .is_some_and(|w| w.set_tangents(id, tangent_in, tangent_out));
        ok.then_some(()).ok_or(CommandError::UnknownKey(id))
    }

    pub(crate) fn set_continuity(
        &mut self,
        id: KeyId,
        continuity: Continuity,
    ) -> Result<(), CommandError> {
        let curve = self.owner_of(id)?;
        let ok = self
            .curves
            .get_mut(curve)
            .is_some_and(|w| w.set_continuity(id, continuity));
        ok.then_some(()).ok_or(CommandError::UnknownKey(id))
    }

    pub(crate) fn set_modes(
        &mut self,
        id: KeyId,
        tangent_in: TangentMode,
        tangent_out: TangentMode,
    ) -> Result<(), CommandError> {
        let key = self.keys.get_mut(id).ok_or(CommandError::UnknownKey(id))?;
        key.set_modes(tangent_in, tangent_out);
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub(crate) fn set_selection(&mut self, ids: &[KeyId]) -> Result<(), CommandError> {
        if let Some(&missing) = ids.iter().find(|&&k| !self.keys.contains(k)) {
            return Err(CommandError::UnknownKey(missing));
        }
        self.selection.replace(ids.iter().copied());
        Ok(())
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ========================================================================
    // Tangents and snapshots
    // ========================================================================

    /// Recompute tangents once for each distinct curve in `curves`.
    ///
    /// Unknown curve ids are skipped.
    pub(crate) fn recompute_tangents(&mut self, curves: impl IntoIterator<Item = CurveId>) {
        let distinct: BTreeSet<CurveId> = curves.into_iter().collect();
        for id in distinct {
            let Some(wrapper) = self.curves.get_mut(id) else {
                continue;
            };
            let keys = &self.keys;
            wrapper.compute_tangents(|k| {
                keys.get(k)
                    .map_or((TangentMode::Custom, TangentMode::Custom), KeyWrapper::modes)
            });
            self.recompute_passes += 1;
            tracing::trace!(curve = %id, keys = wrapper.slots().len(), "tangents recomputed");
        }
    }

    pub(crate) fn snapshot_curve(&self, id: CurveId) -> Result<CurveSnapshot, CommandError> {
        self.curves
            .get(id)
            .map(CurveWrapper::snapshot)
            .ok_or(CommandError::UnknownCurve(id))
    }

    pub(crate) fn snapshot_curves(
        &self,
        ids: impl IntoIterator<Item = CurveId>,
    ) -> Result<Vec<CurveSnapshot>, CommandError> {
        ids.into_iter().map(|id| self.snapshot_curve(id)).collect()
    }

    /// Restore keyframes of a curve whose key set matches the snapshot.
    pub(crate) fn restore_curve(&mut self, snapshot: &CurveSnapshot) -> Result<(), CommandError> {
        let wrapper = self
            .curves
            .get_mut(snapshot.curve)
            .ok_or(CommandError::UnknownCurve(snapshot.curve))?;
        if wrapper.restore(snapshot) {
            Ok(())
        } else {
            Err(CommandError::InvalidState(format!(
                "snapshot of {} is out of order",
                snapshot.curve
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_curve() -> (EditorState, CurveId) {
        let mut state = EditorState::default();
        let curve = state.insert_curve("X", Curve::new(), CurveColor::WHITE);
        (state, curve)
    }

    #[test]
    fn add_key_links_wrapper_and_slot() {
        let (mut state, curve) = state_with_curve();
        let id = state
            .add_key(curve, Keyframe::new(1.0, 2.0), TangentMode::Smooth)
            .unwrap();
        assert_eq!(state.owner_of(id), Ok(curve));
        assert_eq!(state.keyframe(id).unwrap().value, 2.0);
        assert_eq!(state.curve(curve).unwrap().slots(), &[id]);
    }

    #[test]
    fn add_key_to_unknown_curve_fails() {
        let mut state = EditorState::default();
        let err = state
            .add_key(CurveId::new(9), Keyframe::new(0.0, 0.0), TangentMode::Flat)
            .unwrap_err();
        assert_eq!(err, CommandError::UnknownCurve(CurveId::new(9)));
    }

    #[test]
    fn add_key_with_existing_id_fails_without_side_effects() {
        let (mut state, curve) = state_with_curve();
        let id = state
            .add_key(curve, Keyframe::new(0.0, 0.0), TangentMode::Smooth)
            .unwrap();
        let err = state
            .add_key_with_id(id, curve, Keyframe::new(5.0, 5.0), TangentMode::Smooth)
            .unwrap_err();
        assert!(matches!(err, CommandError::DuplicateId(_)));
        assert_eq!(state.curve(curve).unwrap().curve().len(), 1);
    }

    #[test]
    fn remove_then_restore_round_trips() {
        let (mut state, curve) = state_with_curve();
        let a = state
            .add_key(curve, Keyframe::new(0.0, 0.0), TangentMode::Flat)
            .unwrap();
        let b = state
            .add_key(curve, Keyframe::new(1.0, 1.0), TangentMode::Linear)
            .unwrap();
        state.set_selection(&[b]).unwrap();
        let removed = state.remove_key(b).unwrap();
        assert!(state.selection().is_empty());
        assert!(state.key(b).is_none());
        state.restore_key(&removed).unwrap();
        assert_eq!(state.curve(curve).unwrap().slots(), &[a, b]);
        assert_eq!(state.key(b).unwrap().modes(), (TangentMode::Linear, TangentMode::Linear));
        // Restored ids are never re-issued.
        let c = state
            .add_key(curve, Keyframe::new(2.0, 0.0), TangentMode::Flat)
            .unwrap();
        assert!(c > b);
    }

    #[test]
    fn remove_curve_cascades_to_keys_and_selection() {
        let (mut state, curve) = state_with_curve();
        let other = state.insert_curve("Y", Curve::new(), CurveColor::WHITE);
        let a = state
            .add_key(curve, Keyframe::new(0.0, 0.0), TangentMode::Flat)
            .unwrap();
        let b = state
            .add_key(other, Keyframe::new(0.0, 0.0), TangentMode::Flat)
            .unwrap();
        state.set_selection(&[a, b]).unwrap();
        state.remove_curve(curve).unwrap();
        assert!(state.key(a).is_none());
        assert_eq!(state.selection().ids(), &[b]);
    }

    #[test]
    fn imported_keys_keep_their_tangents() {
        let mut state = EditorState::default();
        let curve = Curve::from_keys([
            Keyframe::new(0.0, 0.0).with_tangents(4.0, 4.0),
            Keyframe::new(1.0, 1.0).with_tangents(-2.0, -2.0),
        ]);
        let id = state.insert_curve("Imported", curve.clone(), CurveColor::WHITE);
        state.recompute_tangents([id]);
        assert_eq!(state.curve(id).unwrap().curve(), &curve);
        assert_eq!(state.keys().len(), 2);
    }

    #[test]
    fn recompute_runs_once_per_distinct_curve() {
        let (mut state, curve) = state_with_curve();
        state.recompute_tangents([curve, curve, curve, CurveId::new(77)]);
        assert_eq!(state.recompute_passes(), 1);
    }

    #[test]
    fn set_selection_rejects_unknown_ids() {
        let (mut state, _) = state_with_curve();
        assert_eq!(
            state.set_selection(&[KeyId::new(42)]),
            Err(CommandError::UnknownKey(KeyId::new(42)))
        );
    }
}
