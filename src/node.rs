//! Diagram nodes: kinds, attachment points, and the node record itself.
//!
//! A node kind is a tagged variant carrying per-kind constants: its fixed
//! dimensions come from [`crate::config::NodeSizes`] and its attachment
//! layout from [`NodeKind::attachment_layout`]. There is no hierarchy;
//! everything dispatches on the enum.

use glam::DVec2;

use crate::types::{Rect, Side};

/// Opaque node identifier, allocated by the owning workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a flowchart step is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The distinguished entry step. Exactly one per workspace; immortal.
    Start,
    /// A terminal step.
    End,
    /// A plain statement step.
    Process,
    /// A branching step.
    Decision,
}

impl NodeKind {
    /// Attachment points this kind carries, in declaration order.
    ///
    /// The index into this slice is the attachment index used by
    /// [`AttachmentRef`].
    pub fn attachment_layout(self) -> &'static [(Side, Role)] {
        match self {
            NodeKind::Start => &[(Side::South, Role::Source)],
            NodeKind::End => &[(Side::North, Role::Sink)],
            NodeKind::Process => &[(Side::North, Role::Sink), (Side::South, Role::Source)],
            NodeKind::Decision => &[
                (Side::North, Role::Sink),
                (Side::East, Role::Source),
                (Side::South, Role::Source),
                (Side::West, Role::Source),
            ],
        }
    }
}

/// Whether an attachment point starts or terminates connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May start at most one connector.
    Source,
    /// May terminate at most one connector.
    Sink,
}

/// A connection anchor on one side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentPoint {
    pub side: Side,
    pub role: Role,
}

/// Non-owning reference to one attachment point of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentRef {
    pub node: NodeId,
    pub index: u8,
}

impl AttachmentRef {
    pub fn new(node: NodeId, index: u8) -> Self {
        AttachmentRef { node, index }
    }
}

impl std::fmt::Display for AttachmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:att#{}", self.node, self.index)
    }
}

/// A placed diagram box.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    /// Top-left corner in workspace coordinates.
    pub(crate) position: DVec2,
    /// Fixed size, resolved from the kind at creation time.
    pub(crate) size: DVec2,
    pub(crate) selected: bool,
    pub(crate) attachments: Vec<AttachmentPoint>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, position: DVec2, size: DVec2) -> Node {
        let attachments = kind
            .attachment_layout()
            .iter()
            .map(|&(side, role)| AttachmentPoint { side, role })
            .collect();
        Node {
            id,
            kind,
            position,
            size,
            selected: false,
            attachments,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Top-left corner.
    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn size(&self) -> DVec2 {
        self.size
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// The node's current rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn attachments(&self) -> &[AttachmentPoint] {
        &self.attachments
    }

    pub fn attachment(&self, index: u8) -> Option<&AttachmentPoint> {
        self.attachments.get(index as usize)
    }

    /// Workspace location of one attachment point: the midpoint of its side.
    pub fn attachment_location(&self, index: u8) -> Option<DVec2> {
        let point = self.attachment(index)?;
        Some(self.rect().side_midpoint(point.side))
    }
}
