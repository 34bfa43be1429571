//! Tracking which model parts the user has hidden

use meshview_core::{Model, NodeId};
use std::collections::BTreeSet;
use tracing::debug;

/// Result of [`VisibilitySet::toggle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The node was visible and is now hidden
    Hidden(NodeId),
    /// The node was hidden and is now visible again
    Shown(NodeId),
    NothingSelected,
    /// The id does not belong to the model; nothing changed
    UnknownNode(NodeId),
}

impl ToggleOutcome {
    /// True if the model was modified
    pub fn changed(&self) -> bool {
        matches!(self, Self::Hidden(_) | Self::Shown(_))
    }
}

/// Set of nodes hidden by the user
///
/// Membership and the node's `visible` flag are always changed together, so
/// a node is in the set exactly when its flag is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySet {
    hidden: BTreeSet<NodeId>,
}

impl VisibilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide `selection` if it is visible, show it if it is hidden
    pub fn toggle(&mut self, model: &mut Model, selection: Option<NodeId>) -> ToggleOutcome {
        let Some(id) = selection else {
            return ToggleOutcome::NothingSelected;
        };
        if !model.contains(id) {
            return ToggleOutcome::UnknownNode(id);
        }

        let outcome = if self.hidden.remove(&id) {
            model.set_visible(id, true);
            ToggleOutcome::Shown(id)
        } else {
            self.hidden.insert(id);
            model.set_visible(id, false);
            ToggleOutcome::Hidden(id)
        };
        debug!(node = %id, ?outcome, hidden = self.hidden.len(), "toggled visibility");
        outcome
    }

    /// Make every node of the model visible and forget all hidden nodes
    pub fn unhide_all(&mut self, model: &mut Model) {
        model.show_all();
        self.hidden.clear();
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.hidden.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }

    /// Hidden nodes in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.hidden.iter().copied()
    }

    /// Forget every hidden node without touching a model
    ///
    /// Used when the model the set referred to is replaced.
    pub fn clear(&mut self) {
        self.hidden.clear();
    }

    /// Check that membership matches the visibility flags of `model`
    pub fn is_consistent(&self, model: &Model) -> bool {
        self.hidden.iter().all(|id| model.contains(*id))
            && model
                .traverse()
                .all(|node| node.visible != self.hidden.contains(&node.id()))
    }
}
