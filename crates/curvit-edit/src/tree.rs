#![forbid(unsafe_code)]

//! Dotted-path hierarchy of curves.
//!
//! `"Player.Position.X"` names a leaf `X` inside group `Position` inside
//! group `Player`. Groups are created on demand; each new group draws a
//! color from the palette, and a leaf takes its parent group's color (or a
//! fresh one at top level).
//!
//! The tree only stores names, colors, and curve ids. The curves
//! themselves live in [`EditorState`](crate::state::EditorState).

use std::fmt;

use crate::id::CurveId;
use crate::palette::{CurveColor, Palette};

/// Path lookup or insertion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The path is empty or has an empty segment.
    EmptyPath(String),
    /// A segment of the path does not exist.
    MissingSegment { path: String, segment: String },
    /// The path uses a leaf as a group, or a group as a leaf.
    Conflict { path: String, segment: String },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath(path) => write!(f, "empty segment in curve path '{path}'"),
            Self::MissingSegment { path, segment } => {
                write!(f, "no node '{segment}' on curve path '{path}'")
            }
            Self::Conflict { path, segment } => {
                write!(f, "node '{segment}' on curve path '{path}' has the wrong kind")
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Result of registering a curve path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddCurveOutcome {
    /// A new leaf and curve were created.
    Added(CurveId),
    /// The leaf already existed; its curve was revealed.
    Revealed(CurveId),
}

impl AddCurveOutcome {
    /// The curve at the path.
    #[must_use]
    pub fn id(self) -> CurveId {
        match self {
            Self::Added(id) | Self::Revealed(id) => id,
        }
    }
}

/// A group or curve leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    label: String,
    color: CurveColor,
    curve: Option<CurveId>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn group(label: &str, color: CurveColor) -> Self {
        Self {
            label: label.to_string(),
            color,
            curve: None,
            children: Vec::new(),
        }
    }

    fn leaf(label: &str, color: CurveColor, curve: CurveId) -> Self {
        Self {
            label: label.to_string(),
            color,
            curve: Some(curve),
            children: Vec::new(),
        }
    }

    /// Segment name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Group or curve color.
    #[must_use]
    pub fn color(&self) -> CurveColor {
        self.color
    }

    /// Curve of a leaf, `None` for groups.
    #[must_use]
    pub fn curve(&self) -> Option<CurveId> {
        self.curve
    }

    /// Whether this node is a group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.curve.is_none()
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    fn child(&self, label: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.label == label)
    }

    fn child_mut(&mut self, label: &str) -> Option<&mut TreeNode> {
        self.children.iter_mut().find(|c| c.label == label)
    }

    /// Every curve in this subtree, depth first.
    #[must_use]
    pub fn curves(&self) -> Vec<CurveId> {
        let mut out = Vec::new();
        self.collect_curves(&mut out);
        out
    }

    fn collect_curves(&self, out: &mut Vec<CurveId>) {
        out.extend(self.curve);
        for child in &self.children {
            child.collect_curves(out);
        }
    }
}

/// Split a dotted path, rejecting empty segments.
pub fn split_path(path: &str) -> Result<Vec<&str>, TreeError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(TreeError::EmptyPath(path.to_string()));
    }
    Ok(segments)
}

/// The curve hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTree {
    root: TreeNode,
}

impl Default for CurveTree {
    fn default() -> Self {
        Self {
            root: TreeNode::group("", CurveColor::WHITE),
        }
    }
}

impl CurveTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level nodes.
    #[must_use]
    pub fn roots(&self) -> &[TreeNode] {
        self.root.children()
    }

    /// Node at `path`.
    pub fn get(&self, path: &str) -> Result<&TreeNode, TreeError> {
        let mut node = &self.root;
        for segment in split_path(path)? {
            node = node.child(segment).ok_or_else(|| TreeError::MissingSegment {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
        }
        Ok(node)
    }

    /// Insert a leaf at `path`, creating groups on the way.
    ///
    /// `make_curve` is called with the leaf color only when a new leaf is
    /// created. Nothing is modified when the path conflicts.
    pub(crate) fn insert_leaf(
        &mut self,
        path: &str,
        palette: &mut Palette,
        make_curve: impl FnOnce(CurveColor) -> CurveId,
    ) -> Result<AddCurveOutcome, TreeError> {
        let segments = split_path(path)?;
        let (leaf, groups) = segments
            .split_last()
            .ok_or_else(|| TreeError::EmptyPath(path.to_string()))?;

        // Check the whole path before creating anything.
        let mut node = Some(&self.root);
        for &segment in groups {
            node = node.and_then(|n| n.child(segment));
            if node.is_some_and(|n| !n.is_group()) {
                return Err(TreeError::Conflict {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
        }
        if let Some(existing) = node.and_then(|n| n.child(leaf)) {
            return match existing.curve {
                Some(id) => Ok(AddCurveOutcome::Revealed(id)),
                None => Err(TreeError::Conflict {
                    path: path.to_string(),
                    segment: (*leaf).to_string(),
                }),
            };
        }

        let mut parent = &mut self.root;
        let mut parent_color = None;
        for &segment in groups {
            if parent.child(segment).is_none() {
                let color = palette.next_color();
                tracing::debug!(group = segment, "curve group created");
                parent.children.push(TreeNode::group(segment, color));
            }
            let Some(next) = parent.child_mut(segment) else {
                return Err(TreeError::MissingSegment {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            };
            parent_color = Some(next.color);
            parent = next;
        }
        let color = parent_color.unwrap_or_else(|| palette.next_color());
        let id = make_curve(color);
        parent.children.push(TreeNode::leaf(leaf, color, id));
        Ok(AddCurveOutcome::Added(id))
    }

    /// Detach the node at `path` and return it.
    pub(crate) fn remove(&mut self, path: &str) -> Result<TreeNode, TreeError> {
        let segments = split_path(path)?;
        let (last, groups) = segments
            .split_last()
            .ok_or_else(|| TreeError::EmptyPath(path.to_string()))?;
        let missing = |segment: &str| TreeError::MissingSegment {
            path: path.to_string(),
            segment: segment.to_string(),
        };

        let mut parent = &mut self.root;
        for &segment in groups {
            parent = parent.child_mut(segment).ok_or_else(|| missing(segment))?;
        }
        let index = parent
            .children
            .iter()
            .position(|c| c.label == *last)
            .ok_or_else(|| missing(*last))?;
        Ok(parent.children.remove(index))
    }
}
