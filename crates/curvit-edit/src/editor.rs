#![forbid(unsafe_code)]

//! The editor: state, history, curve tree, and palette in one place.
//!
//! [`CurveEditor`] is the entry point for an interaction layer. Edits go
//! through [`execute`](CurveEditor::execute) (or a drag gesture) and are
//! undoable. Curve registration and removal are not undoable; removing
//! curves clears the history, since recorded commands may name keys that
//! no longer exist.

use curvit_core::{Curve, CurveLoop, Point, Rect, TangentMode, ViewTransform};

use crate::collection::CollectionObserver;
use crate::commands::{ChangeTangentCommand, MoveKeysCommand, ScaleHandle, ScaleKeysCommand};
use crate::config::EditorConfig;
use crate::gesture::PendingGesture;
use crate::hit_test::{self, HitEntry};
use crate::id::{CurveId, KeyId};
use crate::palette::Palette;
use crate::state::EditorState;
use crate::tree::{AddCurveOutcome, CurveTree, TreeError, TreeNode};
use crate::undo::{CommandError, CommandResult, HistoryManager, UndoableCmd};
use crate::wrapper::{CurveWrapper, KeyWrapper, TangentSide};

/// Keyframe curve editor.
#[derive(Debug)]
pub struct CurveEditor {
    state: EditorState,
    history: HistoryManager<EditorState>,
    tree: CurveTree,
    palette: Palette,
    config: EditorConfig,
}

impl Default for CurveEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl CurveEditor {
    /// Create an empty editor.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: EditorState::new(config.default_tangent_mode),
            history: HistoryManager::new(config.history.clone()),
            tree: CurveTree::new(),
            palette: Palette::new(config.palette_seed),
            config,
        }
    }

    /// Curves, keys, and selection.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Undo history.
    #[must_use]
    pub fn history(&self) -> &HistoryManager<EditorState> {
        &self.history
    }

    /// Curve hierarchy.
    #[must_use]
    pub fn tree(&self) -> &CurveTree {
        &self.tree
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Tangent mode given to keys added from now on.
    pub fn set_default_tangent_mode(&mut self, mode: TangentMode) {
        self.config.default_tangent_mode = mode;
        self.state.set_default_tangent_mode(mode);
    }

    // ========================================================================
    // Curve registration (not undoable)
    // ========================================================================

    /// Register `curve` under a dotted `path`.
    ///
    /// If a curve already lives at `path` it is made visible and returned
    /// as [`AddCurveOutcome::Revealed`]; `curve` is dropped.
    pub fn add_curve(&mut self, path: &str, curve: Curve) -> Result<AddCurveOutcome, TreeError> {
        let state = &mut self.state;
        let outcome = self
            .tree
            .insert_leaf(path, &mut self.palette, |color| {
                state.insert_curve(path, curve, color)
            })
            .inspect_err(|err| tracing::warn!(path, error = %err, "cannot add curve"))?;
        match outcome {
            AddCurveOutcome::Added(id) => tracing::debug!(path, curve = %id, "curve added"),
            AddCurveOutcome::Revealed(id) => {
                if let Some(wrapper) = self.state.curve_mut(id) {
                    wrapper.visible = true;
                }
                tracing::debug!(path, curve = %id, "curve revealed");
            }
        }
        Ok(outcome)
    }

    /// Remove one curve and all of its keys.
    pub fn remove_curve(&mut self, id: CurveId) -> bool {
        let Some(path) = self.state.curve(id).map(|w| w.path().to_string()) else {
            return false;
        };
        if let Err(err) = self.tree.remove(&path) {
            tracing::warn!(path = %path, error = %err, "curve missing from tree");
        }
        self.drop_curves(&[id]);
        true
    }

    /// Remove the curve or group at `path`, with everything below it.
    ///
    /// A missing path is logged and ignored. Returns the removed curves.
    pub fn remove_curve_or_group(&mut self, path: &str) -> Vec<CurveId> {
        match self.tree.remove(path) {
            Ok(node) => {
                let ids = node.curves();
                self.drop_curves(&ids);
                ids
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "nothing to remove");
                Vec::new()
            }
        }
    }

    /// Node at `path`. A missing path is logged and yields `None`.
    #[must_use]
    pub fn get_child_node(&self, path: &str) -> Option<&TreeNode> {
        self.tree
            .get(path)
            .inspect_err(|err| tracing::warn!(path, error = %err, "no such curve node"))
            .ok()
    }

    /// Show or hide every curve at or below `path`.
    ///
    /// Returns how many curves were updated.
    pub fn set_visible(&mut self, path: &str, visible: bool) -> usize {
        let Some(ids) = self.get_child_node(path).map(TreeNode::curves) else {
            return 0;
        };
        let mut updated = 0;
        for id in ids {
            if let Some(wrapper) = self.state.curve_mut(id) {
                wrapper.visible = visible;
                updated += 1;
            }
        }
        updated
    }

    /// Set the loop behaviors of a curve.
    pub fn set_curve_loops(&mut self, id: CurveId, pre: CurveLoop, post: CurveLoop) -> bool {
        let Some(wrapper) = self.state.curve_mut(id) else {
            return false;
        };
        wrapper.set_loops(pre, post);
        true
    }

    /// Observe curves being added and removed.
    pub fn subscribe_curves(&mut self, observer: Box<dyn CollectionObserver<CurveWrapper>>) {
        self.state.subscribe_curves(observer);
    }

    /// Observe keys being added and removed, including by undo and redo.
    pub fn subscribe_keys(&mut self, observer: Box<dyn CollectionObserver<KeyWrapper>>) {
        self.state.subscribe_keys(observer);
    }

    fn drop_curves(&mut self, ids: &[CurveId]) {
        for &id in ids {
            self.state.remove_curve(id);
        }
        if !ids.is_empty() {
            self.history.clear();
            tracing::debug!(curves = ids.len(), "history cleared after curve removal");
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Execute and record a command.
    pub fn execute(&mut self, cmd: impl UndoableCmd<EditorState> + 'static) -> CommandResult {
        self.history.execute(Box::new(cmd), &mut self.state)
    }

    /// Record a command whose effect is already applied.
    pub fn add_command(&mut self, cmd: Box<dyn UndoableCmd<EditorState>>) {
        self.history.push(cmd);
    }

    /// Undo the last command. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Result<String, CommandError>> {
        self.history.undo(&mut self.state)
    }

    /// Redo the last undone command. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Result<String, CommandError>> {
        self.history.redo(&mut self.state)
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Start moving the selected keys.
    pub fn begin_move(&self) -> Result<PendingGesture, CommandError> {
        tracing::debug!(keys = self.state.selection().len(), "move gesture started");
        Ok(PendingGesture::Moving(MoveKeysCommand::new(
            &self.state,
            Point::ZERO,
        )?))
    }

    /// Start scaling the selected keys by dragging `handle` of `[min, max]`.
    pub fn begin_scale(
        &self,
        min: Point,
        max: Point,
        handle: ScaleHandle,
    ) -> Result<PendingGesture, CommandError> {
        tracing::debug!(?handle, "scale gesture started");
        Ok(PendingGesture::Scaling(ScaleKeysCommand::new(
            &self.state,
            min,
            max,
            handle,
        )?))
    }

    /// Start dragging one tangent handle.
    pub fn begin_tangent_drag(
        &self,
        key: KeyId,
        side: TangentSide,
    ) -> Result<PendingGesture, CommandError> {
        tracing::debug!(%key, ?side, "tangent gesture started");
        Ok(PendingGesture::ChangingTangent(ChangeTangentCommand::new(
            &self.state,
            key,
            side,
        )?))
    }

    /// Apply a new total offset to a move or scale gesture.
    pub fn update_gesture(&mut self, gesture: &mut PendingGesture, offset: Point) -> CommandResult {
        gesture.update_offset(&mut self.state, offset)
    }

    /// Apply a new tangent value to a tangent gesture.
    pub fn update_gesture_tangent(
        &mut self,
        gesture: &mut PendingGesture,
        value: f32,
    ) -> CommandResult {
        gesture.update_tangent(&mut self.state, value)
    }

    /// Record the gesture's command. Returns `false` if none was active.
    pub fn finish_gesture(&mut self, gesture: &mut PendingGesture) -> bool {
        match gesture.finish() {
            Some(cmd) => {
                self.add_command(cmd);
                true
            }
            None => false,
        }
    }

    /// Revert and drop the gesture.
    pub fn cancel_gesture(&mut self, gesture: &mut PendingGesture) -> CommandResult {
        gesture.cancel(&mut self.state)
    }

    // ========================================================================
    // Hit-testing
    // ========================================================================

    /// Keys and handles touched by `rect`, using the configured extents.
    #[must_use]
    pub fn keys_in_selection_box(
        &self,
        view: &ViewTransform,
        rect: &Rect,
        check_tangent_handles: bool,
    ) -> Vec<HitEntry> {
        hit_test::keys_in_selection_box(
            &self.state,
            view,
            rect,
            check_tangent_handles,
            &self.config.hit_test,
        )
    }

    /// Visible curve under `point`, using the configured tolerance.
    #[must_use]
    pub fn curve_at(&self, view: &ViewTransform, point: Point) -> Option<CurveId> {
        hit_test::curve_at(&self.state, view, point, &self.config.hit_test)
    }

    /// Display position of a tangent handle, using the configured length.
    #[must_use]
    pub fn tangent_handle_position(
        &self,
        view: &ViewTransform,
        key: KeyId,
        side: TangentSide,
    ) -> Option<Point> {
        hit_test::tangent_handle_position(&self.state, view, key, side, &self.config.hit_test)
    }
}
