//! Attachment tracking: volume id to compute node, at most one per volume.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{NodeRef, VolumeId};

/// Tracks which node each volume is attached to.
#[derive(Debug, Default)]
pub struct AttachmentTracker {
    attachments: HashMap<VolumeId, NodeRef>,
}

impl AttachmentTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attachment.
    ///
    /// Fails with the current holder when the volume is already attached;
    /// the existing attachment is left untouched.
    pub fn attach(&mut self, volume_id: VolumeId, node: NodeRef) -> Result<(), NodeRef> {
        match self.attachments.get(&volume_id) {
            Some(holder) => Err(holder.clone()),
            None => {
                debug!(volume_id = %volume_id, node = %node, "attached volume");
                self.attachments.insert(volume_id, node);
                Ok(())
            }
        }
    }

    /// Removes an attachment, returning the node it was attached to.
    pub fn detach(&mut self, volume_id: &VolumeId) -> Option<NodeRef> {
        let node = self.attachments.remove(volume_id);
        if let Some(node) = &node {
            debug!(volume_id = %volume_id, node = %node, "detached volume");
        }
        node
    }

    /// The node a volume is attached to, if any.
    pub fn node_for(&self, volume_id: &VolumeId) -> Option<&NodeRef> {
        self.attachments.get(volume_id)
    }

    /// Number of recorded attachments.
    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    /// True when nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}
