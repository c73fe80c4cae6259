//! Bounded undo/redo over sphere-store checkpoints

use std::collections::VecDeque;

use crate::selection::Selection;
use crate::spheres::SphereStore;

/// Editable state captured before an edit
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub store: SphereStore,
    pub selection: Selection,
    /// Label of the edit that moved away from this state
    pub label: String,
}

/// Undo keeps at most `depth` checkpoints; the oldest is dropped first.
#[derive(Debug)]
pub struct EditHistory {
    past: VecDeque<Checkpoint>,
    future: Vec<Checkpoint>,
    depth: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(50)
    }
}

impl EditHistory {
    /// A depth of zero disables recording
    pub fn new(depth: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(depth.min(64)),
            future: Vec::new(),
            depth,
        }
    }

    /// Record the state an edit started from. Any redo branch is discarded.
    pub fn record(&mut self, store: &SphereStore, selection: Selection, label: &str) {
        if self.depth == 0 {
            return;
        }
        self.future.clear();
        if self.past.len() == self.depth {
            self.past.pop_front();
        }
        self.past.push_back(Checkpoint {
            store: store.clone(),
            selection,
            label: label.to_string(),
        });
    }

    /// Step back one edit; `store`/`selection` become the redo target
    pub fn undo(&mut self, store: &SphereStore, selection: Selection) -> Option<Checkpoint> {
        let target = self.past.pop_back()?;
        self.future.push(current(store, selection, &target.label));
        Some(target)
    }

    /// Re-apply the last undone edit
    pub fn redo(&mut self, store: &SphereStore, selection: Selection) -> Option<Checkpoint> {
        let target = self.future.pop()?;
        // Redo never grows the past beyond what undo took out of it
        self.past.push_back(current(store, selection, &target.label));
        Some(target)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Label of the edit `undo` would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.past.back().map(|c| c.label.as_str())
    }

    /// Label of the edit `redo` would re-apply
    pub fn redo_label(&self) -> Option<&str> {
        self.future.last().map(|c| c.label.as_str())
    }

    /// Number of edits that can be undone
    pub fn len(&self) -> usize {
        self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

fn current(store: &SphereStore, selection: Selection, label: &str) -> Checkpoint {
    Checkpoint {
        store: store.clone(),
        selection,
        label: label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KinematicModel;
    use crate::testing::TWO_LINK_URDF;
    use glam::Vec3;

    fn empty_store() -> SphereStore {
        SphereStore::for_model(&KinematicModel::from_urdf_str(TWO_LINK_URDF).unwrap())
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = EditHistory::default();
        let mut store = empty_store();
        let original = store.clone();

        history.record(&store, Selection::Idle, "Add Sphere");
        store.add("arm_link", Vec3::ZERO, 0.1).unwrap();
        let edited = store.clone();
        assert_eq!(history.undo_label(), Some("Add Sphere"));

        let checkpoint = history.undo(&store, Selection::Idle).unwrap();
        assert_eq!(checkpoint.store, original);
        assert_eq!(checkpoint.label, "Add Sphere");
        assert_eq!(history.redo_label(), Some("Add Sphere"));

        let checkpoint = history.redo(&checkpoint.store, Selection::Idle).unwrap();
        assert_eq!(checkpoint.store, edited);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = EditHistory::default();
        let store = empty_store();
        history.record(&store, Selection::Idle, "a");
        history.undo(&store, Selection::Idle);
        assert!(history.can_redo());

        history.record(&store, Selection::Idle, "b");
        assert!(!history.can_redo());
        assert_eq!(history.undo_label(), Some("b"));
    }

    #[test]
    fn test_oldest_checkpoint_dropped_at_depth() {
        let mut history = EditHistory::new(2);
        let mut store = empty_store();
        for label in ["a", "b", "c"] {
            history.record(&store, Selection::Idle, label);
            store.add("arm_link", Vec3::ZERO, 0.1).unwrap();
        }
        assert_eq!(history.len(), 2);

        // "a" started from the empty store and is gone
        let c = history.undo(&store, Selection::Idle).unwrap();
        assert_eq!((c.label.as_str(), c.store.len()), ("c", 2));
        let b = history.undo(&c.store, Selection::Idle).unwrap();
        assert_eq!((b.label.as_str(), b.store.len()), ("b", 1));
        assert!(history.undo(&b.store, Selection::Idle).is_none());

        // Redoing both leaves the past at its bound again
        history.redo(&b.store, Selection::Idle).unwrap();
        history.redo(&c.store, Selection::Idle).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_zero_depth_disables_history() {
        let mut history = EditHistory::new(0);
        history.record(&empty_store(), Selection::Idle, "a");
        assert!(!history.can_undo());
        assert!(history.is_empty());
    }
}
