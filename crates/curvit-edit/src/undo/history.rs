#![forbid(unsafe_code)]

//! History stack for undo/redo operations.
//!
//! # Invariants
//!
//! 1. `total_bytes` always equals sum of `size_bytes()` for all commands
//! 2. `undo_stack.len() <= config.max_depth` (after any operation)
//! 3. `total_bytes <= config.max_bytes` (after any operation, if enforced)
//! 4. Redo stack is cleared whenever a new command is recorded
//! 5. A command whose execute/undo/redo fails stays where it was
//!
//! Commands are stored in `VecDeque` for O(1) eviction from the front.

use std::collections::VecDeque;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::command::{CommandError, CommandResult, UndoableCmd};

/// Configuration for the history manager.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of commands to keep in undo history.
    pub max_depth: usize,
    /// Maximum total bytes for all commands (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_bytes: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl HistoryConfig {
    /// Create a new configuration with custom limits.
    #[must_use]
    pub fn new(max_depth: usize, max_bytes: usize) -> Self {
        Self {
            max_depth,
            max_bytes,
        }
    }

    /// Create unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_bytes: 0,
        }
    }
}

/// Manager for undo/redo history over a target state `T`.
pub struct HistoryManager<T> {
    /// Commands available for undo (newest at back).
    undo_stack: VecDeque<Box<dyn UndoableCmd<T>>>,
    /// Commands available for redo (newest at back).
    redo_stack: VecDeque<Box<dyn UndoableCmd<T>>>,
    config: HistoryConfig,
    /// Total bytes used by all commands.
    total_bytes: usize,
}

impl<T> fmt::Debug for HistoryManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("total_bytes", &self.total_bytes)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<T> HistoryManager<T> {
    /// Create a new history manager with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
            total_bytes: 0,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Execute `cmd` against `target` and record it.
    ///
    /// On failure nothing is recorded and the redo stack is kept. Commands
    /// reporting `can_undo() == false` run but are not recorded.
    pub fn execute(&mut self, mut cmd: Box<dyn UndoableCmd<T>>, target: &mut T) -> CommandResult {
        if let Err(err) = cmd.execute(target) {
            tracing::debug!(command = cmd.debug_name(), error = %err, "execute failed");
            return Err(err);
        }
        tracing::debug!(
            command = cmd.debug_name(),
            description = cmd.description(),
            "executed"
        );
        if cmd.can_undo() {
            self.push(cmd);
        }
        Ok(())
    }

    /// Push a command onto the undo stack.
    ///
    /// This clears the redo stack (new branch) and enforces limits.
    /// The command is NOT executed - it's assumed to have already been executed.
    pub fn push(&mut self, cmd: Box<dyn UndoableCmd<T>>) {
        self.clear_redo();
        self.total_bytes += cmd.size_bytes();
        self.undo_stack.push_back(cmd);
        self.enforce_limits();
    }

    /// Undo the last command.
    ///
    /// # Returns
    ///
    /// - `Ok(description)` if undo succeeded
    /// - `Err(error)` if undo failed (command remains on undo stack)
    /// - `None` if no commands to undo
    pub fn undo(&mut self, target: &mut T) -> Option<Result<String, CommandError>> {
        let mut cmd = self.undo_stack.pop_back()?;
        let description = cmd.description().to_string();

        match cmd.undo(target) {
            Ok(()) => {
                tracing::debug!(command = cmd.debug_name(), description = %description, "undone");
                self.redo_stack.push_back(cmd);
                Some(Ok(description))
            }
            Err(e) => {
                tracing::debug!(command = cmd.debug_name(), error = %e, "undo failed");
                self.undo_stack.push_back(cmd);
                Some(Err(e))
            }
        }
    }

    /// Redo the last undone command.
    ///
    /// # Returns
    ///
    /// - `Ok(description)` if redo succeeded
    /// - `Err(error)` if redo failed (command remains on redo stack)
    /// - `None` if no commands to redo
    pub fn redo(&mut self, target: &mut T) -> Option<Result<String, CommandError>> {
        let mut cmd = self.redo_stack.pop_back()?;
        let description = cmd.description().to_string();

        match cmd.redo(target) {
            Ok(()) => {
                tracing::debug!(command = cmd.debug_name(), description = %description, "redone");
                self.undo_stack.push_back(cmd);
                Some(Ok(description))
            }
            Err(e) => {
                tracing::debug!(command = cmd.debug_name(), error = %e, "redo failed");
                self.redo_stack.push_back(cmd);
                Some(Err(e))
            }
        }
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Get the undo stack depth.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the redo stack depth.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Get descriptions for undo commands (most recent first).
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    /// Get descriptions for redo commands (most recent first).
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    /// Get the description of the next undo command.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Get the description of the next redo command.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|c| c.description())
    }

    /// Get total memory usage in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Clear all history (both undo and redo).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_bytes = 0;
    }

    fn clear_redo(&mut self) {
        for cmd in self.redo_stack.drain(..) {
            self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
        }
    }

    /// Enforce depth and memory limits by evicting oldest commands.
    fn enforce_limits(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            if let Some(cmd) = self.undo_stack.pop_front() {
                self.evicted(cmd.as_ref());
            }
        }

        if self.config.max_bytes > 0 {
            while self.total_bytes > self.config.max_bytes {
                // Speculative history goes first.
                if let Some(cmd) = self.redo_stack.pop_front() {
                    self.evicted(cmd.as_ref());
                    continue;
                }
                if let Some(cmd) = self.undo_stack.pop_front() {
                    self.evicted(cmd.as_ref());
                } else {
                    break;
                }
            }
        }
    }

    fn evicted(&mut self, cmd: &dyn UndoableCmd<T>) {
        self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
        tracing::debug!(command = cmd.debug_name(), "evicted from history");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::command::CommandMetadata;

    /// Pushes `value` onto the target list.
    struct Append {
        value: i32,
        fail_execute: bool,
        fail_undo: bool,
        undoable: bool,
        metadata: CommandMetadata,
    }

    fn append(value: i32) -> Box<dyn UndoableCmd<Vec<i32>>> {
        Box::new(Append {
            value,
            fail_execute: false,
            fail_undo: false,
            undoable: true,
            metadata: CommandMetadata::new(format!("Append {value}")),
        })
    }

    impl UndoableCmd<Vec<i32>> for Append {
        fn execute(&mut self, target: &mut Vec<i32>) -> CommandResult {
            if self.fail_execute {
                return Err(CommandError::InvalidState("refused".into()));
            }
            target.push(self.value);
            Ok(())
        }

        fn undo(&mut self, target: &mut Vec<i32>) -> CommandResult {
            if self.fail_undo {
                return Err(CommandError::InvalidState("stuck".into()));
            }
            target.pop();
            Ok(())
        }

        fn can_undo(&self) -> bool {
            self.undoable
        }

        fn size_bytes(&self) -> usize {
            std::mem::size_of::<Self>() + self.metadata.size_bytes()
        }

        fn metadata(&self) -> &CommandMetadata {
            &self.metadata
        }
    }

    #[test]
    fn test_new_manager() {
        let mgr = HistoryManager::<Vec<i32>>::default();
        assert!(!mgr.can_undo());
        assert!(!mgr.can_redo());
        assert_eq!(mgr.undo_depth(), 0);
        assert_eq!(mgr.redo_depth(), 0);
    }

    #[test]
    fn test_execute_applies_and_records() {
        let mut state = Vec::new();
        let mut mgr = HistoryManager::default();
        mgr.execute(append(1), &mut state).unwrap();
        assert_eq!(state, vec![1]);
        assert_eq!(mgr.undo_depth(), 1);
        assert_eq!(mgr.next_undo_description(), Some("Append 1"));
    }

    #[test]
    fn test_failed_execute_is_not_recorded() {
        let mut state = Vec::new();
        let mut mgr = HistoryManager::default();
        mgr.execute(append(1), &mut state).unwrap();
        mgr.undo(&mut state);
        let failing = Box::new(Append {
            value: 2,
            fail_execute: true,
            fail_undo: false,
            undoable: true,
            metadata: CommandMetadata::new("Append 2"),
        });
        assert!(mgr.execute(failing, &mut state).is_err());
        assert_eq!(mgr.undo_depth(), 0);
        // Redo branch survives a failed execute.
        assert_eq!(mgr.redo_depth(), 1);
    }

    #[test]
    fn test_non_undoable_runs_but_is_not_recorded() {
        let mut state = Vec::new();
        let mut mgr = HistoryManager::default();
        let cmd = Box::new(Append {
            value: 5,
            fail_execute: false,
            fail_undo: false,
            undoable: false,
            metadata: CommandMetadata::new("Append 5"),
        });
        mgr.execute(cmd, &mut state).unwrap();
        assert_eq!(state, vec![5]);
        assert!(!mgr.can_undo());
    }

    #[test]
    fn test_push_does_not_execute() {
        let mut state = vec![7];
        let mut mgr = HistoryManager::default();
        mgr.push(append(7));
        assert_eq!(state, vec![7]);
        mgr.undo(&mut state).unwrap().unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_undo_redo_ordering() {
        let mut state = Vec::new();
        let mut mgr = HistoryManager::default();
        for v in [1, 2, 3] {
            mgr.execute(append(v), &mut state).unwrap();
        }
        assert_eq!(mgr.undo(&mut state).unwrap().unwrap(), "Append 3");
        assert_eq!(mgr.undo(&mut state).unwrap().unwrap(), "Append 2");
        assert_eq!(state, vec![1]);
        assert_eq!(mgr.redo(&mut state).unwrap().unwrap(), "Append 2");
        assert_eq!(state, vec![1, 2]);
        assert_eq!(mgr.redo_descriptions(5), vec!["Append 3"]);
    }

    #[test]
    fn test_execute_clears_redo() {
        let mut state = Vec::new();
        let mut mgr = HistoryManager::default();
        mgr.execute(append(1), &mut state).unwrap();
        mgr.undo(&mut state);
        assert!(mgr.can_redo());
        mgr.execute(append(2), &mut state).unwrap();
        assert!(!mgr.can_redo());
        assert_eq!(mgr.redo_depth(), 0);
    }

    #[test]
    fn test_failed_undo_stays_on_undo_stack() {
        let mut state = vec![1];
        let mut mgr = HistoryManager::default();
        mgr.push(Box::new(Append {
            value: 1,
            fail_execute: false,
            fail_undo: true,
            undoable: true,
            metadata: CommandMetadata::new("Stuck"),
        }));
        assert!(mgr.undo(&mut state).unwrap().is_err());
        assert_eq!(mgr.undo_depth(), 1);
        assert_eq!(mgr.redo_depth(), 0);
        assert_eq!(state, vec![1]);
    }

    #[test]
    fn test_undo_redo_without_commands() {
        let mut state = Vec::<i32>::new();
        let mut mgr = HistoryManager::default();
        assert!(mgr.undo(&mut state).is_none());
        assert!(mgr.redo(&mut state).is_none());
    }

    #[test]
    fn test_max_depth_enforced() {
        let mut state = Vec::new();
        let mut mgr = HistoryManager::new(HistoryConfig::new(3, 0));
        for i in 0..5 {
            mgr.execute(append(i), &mut state).unwrap();
        }
        assert_eq!(mgr.undo_depth(), 3);
        assert_eq!(mgr.undo_descriptions(1), vec!["Append 4"]);
    }

    #[test]
    fn test_memory_byte_limit_evicts_old_commands() {
        let mut state = Vec::new();
        let mut mgr = HistoryManager::new(HistoryConfig::new(100, 1));
        for i in 0..5 {
            mgr.execute(append(i), &mut state).unwrap();
        }
        assert!(
            mgr.undo_depth() < 5,
            "byte limit should evict old commands, depth={}",
            mgr.undo_depth()
        );
    }

    #[test]
    fn test_memory_tracking_after_undo_redo() {
        let mut state = Vec::new();
        let mut mgr = HistoryManager::new(HistoryConfig::unlimited());
        mgr.execute(append(1), &mut state).unwrap();
        let after_push = mgr.memory_usage();
        assert!(after_push > 0);

        mgr.undo(&mut state);
        assert_eq!(mgr.memory_usage(), after_push);
        mgr.redo(&mut state);
        assert_eq!(mgr.memory_usage(), after_push);

        mgr.clear();
        assert_eq!(mgr.memory_usage(), 0);
    }

    #[test]
    fn test_config_default() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_depth, 100);
        assert_eq!(config.max_bytes, 10 * 1024 * 1024);
        assert_eq!(HistoryConfig::unlimited().max_bytes, 0);
    }

    #[test]
    fn test_debug_impl() {
        let mgr = HistoryManager::<Vec<i32>>::default();
        let debug_str = format!("{:?}", mgr);
        assert!(debug_str.contains("HistoryManager"));
        assert!(debug_str.contains("undo_depth"));
    }
}
