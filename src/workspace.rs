//! The workspace registry: exclusive owner of one diagram's nodes and
//! connectors.
//!
//! All other engines go through this type: placement and movement ask it
//! whether a rectangle is free, routing asks it whether a point can be
//! extended to, selection enumerates and flags its members. Exactly one
//! node is the distinguished entry node; it is created with the workspace
//! and can never be destroyed.

use std::collections::HashMap;

use glam::DVec2;

use crate::config::WorkspaceConfig;
use crate::connector::{Connector, ConnectorId};
use crate::errors::{PlaceError, WorkspaceError};
use crate::node::{AttachmentRef, Node, NodeId, NodeKind, Role};
use crate::place;
use crate::types::Rect;

/// The bounded 2-D canvas holding one diagram's nodes and connectors.
pub struct Workspace {
    config: WorkspaceConfig,
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    connectors: HashMap<ConnectorId, Connector>,
    connector_order: Vec<ConnectorId>,
    entry: NodeId,
    next_node: u32,
    next_connector: u32,
}

impl Workspace {
    /// Create a workspace and place its entry node at the center.
    pub fn new(config: WorkspaceConfig) -> Result<Workspace, WorkspaceError> {
        config.validate()?;
        let mut ws = Workspace {
            config,
            nodes: HashMap::new(),
            node_order: Vec::new(),
            connectors: HashMap::new(),
            connector_order: Vec::new(),
            entry: NodeId(0),
            next_node: 0,
            next_connector: 0,
        };
        let entry = ws.place(NodeKind::Start, None)?;
        ws.entry = entry;
        Ok(ws)
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// The distinguished entry node. Never destroyed.
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    // ========================================================================
    // Membership
    // ========================================================================

    pub fn node(&self, id: NodeId) -> Result<&Node, WorkspaceError> {
        self.nodes
            .get(&id)
            .ok_or(WorkspaceError::UnknownNode { id })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, WorkspaceError> {
        self.nodes
            .get_mut(&id)
            .ok_or(WorkspaceError::UnknownNode { id })
    }

    pub fn connector(&self, id: ConnectorId) -> Result<&Connector, WorkspaceError> {
        self.connectors
            .get(&id)
            .ok_or(WorkspaceError::UnknownConnector { id })
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// All connectors in insertion order.
    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connector_order
            .iter()
            .filter_map(|id| self.connectors.get(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    /// The topmost (most recently placed) node whose rectangle contains
    /// `point`, borders included.
    pub fn node_at(&self, point: DVec2) -> Option<NodeId> {
        self.node_order
            .iter()
            .rev()
            .filter_map(|id| self.nodes.get(id))
            .find(|node| node.rect().contains_point(point))
            .map(|node| node.id)
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Place a new node of `kind` at the nearest free grid cell to
    /// `requested_origin` (workspace center when `None`).
    ///
    /// Deterministic: the same occupied set and origin always yield the
    /// same position. Fails with [`PlaceError::NoSpaceAvailable`] once the
    /// spiral search exhausts its ring cap.
    pub fn place(
        &mut self,
        kind: NodeKind,
        requested_origin: Option<DVec2>,
    ) -> Result<NodeId, PlaceError> {
        let size = self.config.node_sizes.of(kind);
        let origin = place::find_free_origin(self, kind, size, requested_origin)?;
        let id = NodeId(self.next_node);
        self.next_node += 1;
        crate::log::debug!(node = %id, ?kind, x = origin.x, y = origin.y, "placed node");
        self.nodes.insert(id, Node::new(id, kind, origin, size));
        self.node_order.push(id);
        Ok(id)
    }

    // ========================================================================
    // Destruction
    // ========================================================================

    /// Remove a node, cascading to every connector attached to it.
    ///
    /// The entry node is refused with [`WorkspaceError::EntryNodeImmortal`].
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), WorkspaceError> {
        if id == self.entry {
            return Err(WorkspaceError::EntryNodeImmortal { id });
        }
        if self.nodes.remove(&id).is_none() {
            return Err(WorkspaceError::UnknownNode { id });
        }
        self.node_order.retain(|&n| n != id);
        let attached: Vec<ConnectorId> = self
            .connectors
            .values()
            .filter(|c| c.source.node == id || c.sink.node == id)
            .map(|c| c.id)
            .collect();
        for cid in attached {
            self.connectors.remove(&cid);
            self.connector_order.retain(|&c| c != cid);
        }
        crate::log::debug!(node = %id, "removed node and attached connectors");
        Ok(())
    }

    /// Remove a connector explicitly.
    pub fn remove_connector(&mut self, id: ConnectorId) -> Result<(), WorkspaceError> {
        if self.connectors.remove(&id).is_none() {
            return Err(WorkspaceError::UnknownConnector { id });
        }
        self.connector_order.retain(|&c| c != id);
        Ok(())
    }

    /// Delete everything currently selected, in one batch.
    ///
    /// The entry node is excluded from the deletable set rather than
    /// erroring; connectors attached to deleted nodes cascade. Returns the
    /// number of nodes plus connectors removed.
    pub fn delete_selected(&mut self) -> usize {
        let entry = self.entry;
        let node_ids: Vec<NodeId> = self
            .nodes()
            .filter(|n| n.selected && n.id != entry)
            .map(|n| n.id)
            .collect();
        let connector_ids: Vec<ConnectorId> = self
            .connectors()
            .filter(|c| c.selected)
            .map(|c| c.id)
            .collect();
        let mut removed = 0;
        for id in node_ids {
            if self.remove_node(id).is_ok() {
                removed += 1;
            }
        }
        for id in connector_ids {
            // May already be gone via a cascading node removal.
            if self.remove_connector(id).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    // ========================================================================
    // Selection state
    // ========================================================================

    pub fn set_node_selected(&mut self, id: NodeId, selected: bool) -> Result<(), WorkspaceError> {
        self.node_mut(id)?.selected = selected;
        Ok(())
    }

    pub fn set_connector_selected(
        &mut self,
        id: ConnectorId,
        selected: bool,
    ) -> Result<(), WorkspaceError> {
        self.connectors
            .get_mut(&id)
            .ok_or(WorkspaceError::UnknownConnector { id })?
            .selected = selected;
        Ok(())
    }

    /// Unselect every node and connector.
    pub fn clear_selection(&mut self) {
        for node in self.nodes.values_mut() {
            node.selected = false;
        }
        for connector in self.connectors.values_mut() {
            connector.selected = false;
        }
    }

    /// Ephemeral view over the currently selected items.
    pub fn selection(&self) -> SelectionGroup<'_> {
        SelectionGroup { workspace: self }
    }

    // ========================================================================
    // Spatial queries
    // ========================================================================

    /// True if `rect` lies within bounds minus padding and intersects no
    /// node for which `ignore` returns false.
    pub fn rect_free(&self, rect: &Rect, ignore: impl Fn(&Node) -> bool) -> bool {
        if !self.config.interior().contains_rect(rect) {
            return false;
        }
        !self
            .nodes()
            .any(|node| !ignore(node) && node.rect().intersects(rect))
    }

    /// The routing predicate: a connector may extend to `point` iff the
    /// point lies strictly inside no node. Node borders are allowed so a
    /// line can leave its own attachment point.
    pub fn can_extend_to(&self, point: DVec2) -> bool {
        !self
            .nodes()
            .any(|node| node.rect().contains_point_strict(point))
    }

    // ========================================================================
    // Attachments
    // ========================================================================

    /// Workspace location of an attachment point.
    pub fn attachment_location(&self, at: AttachmentRef) -> Result<DVec2, WorkspaceError> {
        self.node(at.node)?
            .attachment_location(at.index)
            .ok_or(WorkspaceError::UnknownAttachment { at })
    }

    /// Role of an attachment point.
    pub fn attachment_role(&self, at: AttachmentRef) -> Result<Role, WorkspaceError> {
        self.node(at.node)?
            .attachment(at.index)
            .map(|point| point.role)
            .ok_or(WorkspaceError::UnknownAttachment { at })
    }

    /// True if some persisted connector already uses this attachment.
    pub fn attachment_occupied(&self, at: AttachmentRef) -> Result<bool, WorkspaceError> {
        // Validate the reference first so a dangling ref errors rather
        // than reading as "free".
        self.attachment_role(at)?;
        Ok(self
            .connectors
            .values()
            .any(|c| c.source == at || c.sink == at))
    }

    // ========================================================================
    // Mutation commands (engine internal)
    // ========================================================================

    pub(crate) fn set_node_position(&mut self, id: NodeId, position: DVec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
    }

    /// Persist a finished connector. Routing has already validated the
    /// endpoints and normalized the polyline.
    pub(crate) fn insert_connector(
        &mut self,
        source: AttachmentRef,
        sink: AttachmentRef,
        points: Vec<DVec2>,
    ) -> ConnectorId {
        let id = ConnectorId(self.next_connector);
        self.next_connector += 1;
        self.connectors.insert(
            id,
            Connector {
                id,
                source,
                sink,
                points,
                selected: false,
            },
        );
        self.connector_order.push(id);
        id
    }
}

/// Ephemeral view over the selected nodes and connectors, used to batch
/// movement and deletion. Borrowing keeps it trivially consistent: it can
/// never outlive a mutation of the workspace.
pub struct SelectionGroup<'a> {
    workspace: &'a Workspace,
}

impl<'a> SelectionGroup<'a> {
    pub fn nodes(&self) -> impl Iterator<Item = &'a Node> {
        self.workspace.nodes().filter(|n| n.selected)
    }

    pub fn connectors(&self) -> impl Iterator<Item = &'a Connector> {
        self.workspace.connectors().filter(|c| c.selected)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().map(|n| n.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().next().is_none() && self.connectors().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn small_ws() -> Workspace {
        let config = WorkspaceConfig {
            width: 1000.0,
            height: 600.0,
            padding: 50.0,
            move_grid: DVec2::splat(100.0),
            ..WorkspaceConfig::default()
        };
        Workspace::new(config).unwrap()
    }

    #[test]
    fn new_workspace_has_entry_node() {
        let ws = small_ws();
        assert_eq!(ws.node_count(), 1);
        let entry = ws.node(ws.entry()).unwrap();
        assert_eq!(entry.kind(), NodeKind::Start);
        // Entry is a placed node: free and inside bounds minus padding
        assert!(ws.config().interior().contains_rect(&entry.rect()));
    }

    #[test]
    fn entry_node_cannot_be_removed() {
        let mut ws = small_ws();
        let entry = ws.entry();
        assert!(matches!(
            ws.remove_node(entry),
            Err(WorkspaceError::EntryNodeImmortal { .. })
        ));
        assert_eq!(ws.node_count(), 1);
    }

    #[test]
    fn removing_node_cascades_to_connectors() {
        let mut ws = small_ws();
        let entry = ws.entry();
        let end = ws.place(NodeKind::End, Some(dvec2(100.0, 100.0))).unwrap();
        let source = AttachmentRef::new(entry, 0);
        let sink = AttachmentRef::new(end, 0);
        let a = ws.attachment_location(source).unwrap();
        let b = ws.attachment_location(sink).unwrap();
        let elbow = dvec2(a.x, b.y);
        ws.insert_connector(source, sink, vec![a, elbow, b]);
        assert_eq!(ws.connector_count(), 1);

        ws.remove_node(end).unwrap();
        assert_eq!(ws.connector_count(), 0);
    }

    #[test]
    fn delete_selected_spares_entry() {
        let mut ws = small_ws();
        let entry = ws.entry();
        let other = ws.place(NodeKind::Process, None).unwrap();
        ws.set_node_selected(entry, true).unwrap();
        ws.set_node_selected(other, true).unwrap();

        let removed = ws.delete_selected();
        assert_eq!(removed, 1);
        assert!(ws.node(entry).is_ok());
        assert!(ws.node(other).is_err());
    }

    #[test]
    fn selection_group_views_selected_items() {
        let mut ws = small_ws();
        let a = ws.place(NodeKind::Process, Some(dvec2(100.0, 100.0))).unwrap();
        ws.place(NodeKind::Process, Some(dvec2(600.0, 100.0))).unwrap();
        ws.set_node_selected(a, true).unwrap();

        let ids = ws.selection().node_ids();
        assert_eq!(ids, vec![a]);
        ws.clear_selection();
        assert!(ws.selection().is_empty());
    }

    #[test]
    fn attachment_occupancy_tracks_connectors() {
        let mut ws = small_ws();
        let entry = ws.entry();
        let end = ws.place(NodeKind::End, Some(dvec2(100.0, 100.0))).unwrap();
        let source = AttachmentRef::new(entry, 0);
        let sink = AttachmentRef::new(end, 0);
        assert!(!ws.attachment_occupied(source).unwrap());

        let a = ws.attachment_location(source).unwrap();
        let b = ws.attachment_location(sink).unwrap();
        ws.insert_connector(source, sink, vec![a, dvec2(a.x, b.y), b]);
        assert!(ws.attachment_occupied(source).unwrap());
        assert!(ws.attachment_occupied(sink).unwrap());

        // Dangling reference is an error, not "free"
        assert!(ws.attachment_occupied(AttachmentRef::new(entry, 9)).is_err());
    }

    #[test]
    fn can_extend_to_allows_borders_blocks_interiors() {
        let mut ws = small_ws();
        let id = ws.place(NodeKind::Process, Some(dvec2(300.0, 300.0))).unwrap();
        let rect = ws.node(id).unwrap().rect();
        assert!(!ws.can_extend_to(rect.center()));
        assert!(ws.can_extend_to(rect.side_midpoint(crate::types::Side::South)));
        assert!(ws.can_extend_to(dvec2(5.0, 5.0)));
    }

    #[test]
    fn node_at_finds_topmost_node() {
        let mut ws = small_ws();
        let id = ws.place(NodeKind::Process, Some(dvec2(300.0, 300.0))).unwrap();
        let center = ws.node(id).unwrap().rect().center();
        assert_eq!(ws.node_at(center), Some(id));
        assert_eq!(ws.node_at(dvec2(1.0, 1.0)), None);
    }
}
