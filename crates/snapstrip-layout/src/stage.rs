use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::ViewNode;

/// Opaque handle to a mounted subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubtreeHandle(u64);

impl fmt::Display for SubtreeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subtree-{}", self.0)
    }
}

/// The set of view subtrees currently on screen.
///
/// Consumers outside the rendering layer only ever see a [`SubtreeHandle`]
/// and read the subtree through [`Stage::get`].
#[derive(Debug, Default)]
pub struct Stage {
    mounted: HashMap<SubtreeHandle, ViewNode>,
    next_id: u64,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, root: ViewNode) -> SubtreeHandle {
        self.next_id += 1;
        let handle = SubtreeHandle(self.next_id);
        tracing::debug!(%handle, root = %root.id, "mounted subtree");
        self.mounted.insert(handle, root);
        handle
    }

    pub fn get(&self, handle: SubtreeHandle) -> Option<&ViewNode> {
        self.mounted.get(&handle)
    }

    /// Mutable access for the UI layer (e.g. caption edits).
    pub fn get_mut(&mut self, handle: SubtreeHandle) -> Option<&mut ViewNode> {
        self.mounted.get_mut(&handle)
    }

    pub fn unmount(&mut self, handle: SubtreeHandle) -> Option<ViewNode> {
        let removed = self.mounted.remove(&handle);
        if removed.is_some() {
            tracing::debug!(%handle, "unmounted subtree");
        }
        removed
    }

    pub fn is_mounted(&self, handle: SubtreeHandle) -> bool {
        self.mounted.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapstrip_core::Rect;

    #[test]
    fn test_mount_and_unmount() {
        let mut stage = Stage::new();
        let a = stage.mount(ViewNode::container("a", Rect::sized(1.0, 1.0)));
        let b = stage.mount(ViewNode::container("b", Rect::sized(1.0, 1.0)));
        assert_ne!(a, b);
        assert_eq!(stage.get(b).unwrap().id.0, "b");

        assert!(stage.unmount(a).is_some());
        assert!(!stage.is_mounted(a));
        assert!(stage.get(a).is_none());
        assert!(stage.unmount(a).is_none());
        assert_eq!(stage.len(), 1);
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut stage = Stage::new();
        let a = stage.mount(ViewNode::container("a", Rect::sized(1.0, 1.0)));
        stage.unmount(a);
        let b = stage.mount(ViewNode::container("b", Rect::sized(1.0, 1.0)));
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "subtree-2");
    }
}
