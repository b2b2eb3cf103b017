#![forbid(unsafe_code)]

//! Undo/redo command history.
//!
//! Commands implement [`UndoableCmd`] over the state they mutate and are
//! recorded by a [`HistoryManager`]. The manager owns two stacks:
//!
//! ```text
//! execute(cmd5)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3, cmd4, cmd5]    │
//! │ Redo Stack: []                                 │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3]                │
//! │ Redo Stack: [cmd4, cmd5]                       │
//! └───────────────────────────────────────────────┘
//!
//! execute(cmd6)  <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3, cmd6]          │
//! │ Redo Stack: []                                 │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Commands never hold references into the state. They store ids and
//! captured values and receive the target as `&mut T` on every call, so the
//! history can own them outright.
//!
//! # Memory Budget
//!
//! Every command reports its size via `size_bytes()`. The history evicts
//! the oldest commands when either the depth or the byte budget is
//! exceeded (defaults: 100 commands, 10 MB).

pub mod command;
pub mod history;

pub use command::{CommandError, CommandMetadata, CommandResult, CommandSource, UndoableCmd};
pub use history::{HistoryConfig, HistoryManager};
