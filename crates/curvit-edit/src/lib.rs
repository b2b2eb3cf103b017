#![forbid(unsafe_code)]

//! Editing engine for curvit curves.
//!
//! # Role in curvit
//! `curvit-edit` gives curves and keys stable ids, tracks the selection,
//! and applies every edit through undoable commands recorded in a bounded
//! history. It also owns the dotted-path curve hierarchy, color assignment,
//! and hit-testing against a [`ViewTransform`](curvit_core::ViewTransform).
//!
//! # Entry point
//! [`CurveEditor`] ties the pieces together:
//!
//! ```rust,ignore
//! let mut editor = CurveEditor::default();
//! let id = editor.add_curve("Player.Position.X", Curve::new())?.id();
//! editor.execute(AddKeyCommand::new(id, 0.0, 1.0))?;
//! editor.undo();
//! ```

pub mod collection;
pub mod commands;
pub mod config;
pub mod editor;
pub mod gesture;
pub mod id;
pub mod palette;
pub mod selection;
pub mod state;
pub mod tree;
pub mod undo;
pub mod wrapper;

pub use collection::{
    CollectionObserver, CurveWrapperCollection, DuplicateIdError, KeyWrapperCollection,
    WrapperCollection,
};
pub use commands::{
    AddKeyCommand, ChangeContinuityCommand, ChangeTangentCommand, ChangeTangentModeCommand,
    DeleteKeysCommand, ModeChange, MoveKeysCommand, ScaleHandle, ScaleKeysCommand,
    SelectKeysCommand,
};
pub use config::{ConfigError, EditorConfig};
pub use editor::CurveEditor;
pub use gesture::PendingGesture;
pub use hit_test::{HitEntry, HitTestConfig};
pub use id::{CurveId, IdAllocator, KeyId};
pub use palette::{CurveColor, Palette};
pub use selection::{SelectionMode, SelectionSet};
pub use state::{EditorState, RemovedKey};
pub use tree::{AddCurveOutcome, CurveTree, TreeError, TreeNode};
pub use undo::{
    CommandError, CommandMetadata, CommandResult, CommandSource, HistoryConfig, HistoryManager,
    UndoableCmd,
};
pub use wrapper::{CurveSnapshot, CurveWrapper, KeyWrapper, TangentSide, Wrapper};
