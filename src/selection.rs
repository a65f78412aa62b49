//! Rectangle selection.
//!
//! A [`SelectSession`] stretches a rubber-band rectangle between its
//! anchor and the current pointer, both clamped to workspace bounds.
//! Selection is recomputed wholesale on every update: an item is selected
//! iff its bounding rectangle is strictly contained in the band, so items
//! merely touching the band edge stay out, and items the band no longer
//! covers drop back out of the selection.
//!
//! Ending a session that never moved, on a point over empty space, clears
//! the whole selection. That is how a plain background click deselects.

use glam::DVec2;

use crate::sink::RenderSink;
use crate::types::Rect;
use crate::workspace::Workspace;

/// An in-flight rubber-band selection.
pub struct SelectSession {
    begin_pointer: DVec2,
    anchor: DVec2,
    rect: Rect,
}

impl SelectSession {
    pub fn begin(workspace: &Workspace, pointer: DVec2) -> SelectSession {
        let anchor = workspace.config().bounds().clamp_point(pointer);
        SelectSession {
            begin_pointer: pointer,
            anchor,
            rect: Rect::from_corners(anchor, anchor),
        }
    }

    /// The current band rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Stretch the band to the pointer and recompute the selection.
    pub fn update(
        &mut self,
        workspace: &mut Workspace,
        sink: &mut impl RenderSink,
        pointer: DVec2,
    ) {
        let corner = workspace.config().bounds().clamp_point(pointer);
        self.rect = Rect::from_corners(self.anchor, corner);
        self.apply(workspace, sink);
    }

    /// Finish the session. A zero-movement end over empty space is a
    /// background click and clears the selection entirely.
    pub fn end(self, workspace: &mut Workspace, sink: &mut impl RenderSink, pointer: DVec2) {
        if pointer == self.begin_pointer && workspace.node_at(pointer).is_none() {
            crate::log::debug!("background click, clearing selection");
            let nodes: Vec<_> = workspace.selection().node_ids();
            let connectors: Vec<_> = workspace
                .selection()
                .connectors()
                .map(|c| c.id())
                .collect();
            workspace.clear_selection();
            for id in nodes {
                sink.set_node_selected(id, false);
            }
            for id in connectors {
                sink.set_connector_selected(id, false);
            }
        }
    }

    /// Wholesale recompute against the current band. Only emits sink
    /// commands for items whose selection actually changed.
    fn apply(&self, workspace: &mut Workspace, sink: &mut impl RenderSink) {
        let node_updates: Vec<_> = workspace
            .nodes()
            .filter_map(|node| {
                let want = self.rect.contains_rect_strict(&node.rect());
                (want != node.is_selected()).then_some((node.id(), want))
            })
            .collect();
        for (id, selected) in node_updates {
            let _ = workspace.set_node_selected(id, selected);
            sink.set_node_selected(id, selected);
        }

        let connector_updates: Vec<_> = workspace
            .connectors()
            .filter_map(|connector| {
                let want = self.rect.contains_rect_strict(&connector.bounding_rect());
                (want != connector.is_selected()).then_some((connector.id(), want))
            })
            .collect();
        for (id, selected) in connector_updates {
            let _ = workspace.set_connector_selected(id, selected);
            sink.set_connector_selected(id, selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    use crate::config::WorkspaceConfig;
    use crate::node::{AttachmentRef, NodeId, NodeKind};
    use crate::sink::{Command, NullSink, RecordingSink};

    /// Zero padding so nodes can sit at the workspace corner, and a move
    /// grid the test coordinates are multiples of.
    fn small_ws() -> Workspace {
        let mut config = WorkspaceConfig::try_new(1000.0, 600.0, 0.0).unwrap();
        config.move_grid = dvec2(50.0, 50.0);
        Workspace::new(config).unwrap()
    }

    /// Two 100x50 nodes: `a` at (50,50), `b` at the corner (0,0).
    fn ws_with_two_nodes() -> (Workspace, NodeId, NodeId) {
        let mut ws = small_ws();
        let a = ws.place(NodeKind::End, Some(dvec2(50.0, 50.0))).unwrap();
        let b = ws.place(NodeKind::End, Some(dvec2(0.0, 0.0))).unwrap();
        (ws, a, b)
    }

    // ==================== containment tests ====================

    #[test]
    fn band_selects_strictly_contained_nodes_only() {
        let (mut ws, a, b) = ws_with_two_nodes();

        let mut sink = NullSink;
        let mut session = SelectSession::begin(&ws, dvec2(10.0, 10.0));
        session.update(&mut ws, &mut sink, dvec2(400.0, 200.0));

        // `a` (50,50)-(150,100) is strictly inside; `b` (0,0)-(100,50)
        // pokes out past the band's min corner.
        assert!(ws.node(a).unwrap().is_selected());
        assert!(!ws.node(b).unwrap().is_selected());
    }

    #[test]
    fn band_matching_a_node_exactly_does_not_select_it() {
        let (mut ws, a, _) = ws_with_two_nodes();

        let mut sink = NullSink;
        let mut session = SelectSession::begin(&ws, dvec2(50.0, 50.0));
        session.update(&mut ws, &mut sink, dvec2(150.0, 100.0));
        assert!(!ws.node(a).unwrap().is_selected());
    }

    #[test]
    fn shrinking_the_band_deselects_uncovered_nodes() {
        let (mut ws, a, _) = ws_with_two_nodes();

        let mut sink = NullSink;
        let mut session = SelectSession::begin(&ws, dvec2(10.0, 10.0));
        session.update(&mut ws, &mut sink, dvec2(400.0, 200.0));
        assert!(ws.node(a).unwrap().is_selected());

        session.update(&mut ws, &mut sink, dvec2(40.0, 40.0));
        assert!(!ws.node(a).unwrap().is_selected());
    }

    #[test]
    fn band_selects_connectors_by_bounding_rect() {
        let (mut ws, a, b) = ws_with_two_nodes();
        let c = ws.insert_connector(
            AttachmentRef::new(a, 0),
            AttachmentRef::new(b, 0),
            vec![dvec2(100.0, 60.0), dvec2(300.0, 60.0)],
        );

        let mut sink = NullSink;
        let mut session = SelectSession::begin(&ws, dvec2(60.0, 10.0));
        session.update(&mut ws, &mut sink, dvec2(400.0, 200.0));
        assert!(ws.connector(c).unwrap().is_selected());

        // Band edge on the polyline's min corner: not strict containment.
        session.update(&mut ws, &mut sink, dvec2(100.0, 200.0));
        assert!(!ws.connector(c).unwrap().is_selected());
    }

    #[test]
    fn band_corners_clamp_to_workspace_bounds() {
        let (mut ws, _, b) = ws_with_two_nodes();

        let mut sink = NullSink;
        // Anchor far outside the workspace clamps to the (0,0) corner, so
        // `b` at the corner is still only touched, never contained.
        let mut session = SelectSession::begin(&ws, dvec2(-500.0, -500.0));
        session.update(&mut ws, &mut sink, dvec2(400.0, 200.0));
        assert_eq!(session.rect().min, dvec2(0.0, 0.0));
        assert!(!ws.node(b).unwrap().is_selected());
    }

    // ==================== background click tests ====================

    #[test]
    fn background_click_clears_the_selection() {
        let (mut ws, a, _) = ws_with_two_nodes();
        ws.set_node_selected(a, true).unwrap();

        let mut sink = RecordingSink::default();
        let point = dvec2(300.0, 500.0);
        let session = SelectSession::begin(&ws, point);
        session.end(&mut ws, &mut sink, point);

        assert!(ws.selection().is_empty());
        assert!(sink.commands.iter().any(|c| matches!(
            c,
            Command::NodeSelected { id, selected: false } if *id == a
        )));
    }

    #[test]
    fn click_on_a_node_keeps_the_selection() {
        let (mut ws, a, b) = ws_with_two_nodes();
        ws.set_node_selected(a, true).unwrap();

        let mut sink = NullSink;
        let point = ws.node(b).unwrap().rect().center();
        let session = SelectSession::begin(&ws, point);
        session.end(&mut ws, &mut sink, point);
        assert!(ws.node(a).unwrap().is_selected());
    }

    #[test]
    fn drag_end_keeps_the_band_selection() {
        let (mut ws, a, _) = ws_with_two_nodes();

        let mut sink = NullSink;
        let mut session = SelectSession::begin(&ws, dvec2(10.0, 10.0));
        session.update(&mut ws, &mut sink, dvec2(400.0, 200.0));
        session.end(&mut ws, &mut sink, dvec2(400.0, 200.0));
        assert!(ws.node(a).unwrap().is_selected());
    }
}
