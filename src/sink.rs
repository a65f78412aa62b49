//! The outbound command boundary to the rendering collaborator.
//!
//! The engine never touches pixels; it issues these commands and lets the
//! embedding editor's paint layer carry them out. Every method has a no-op
//! default body so embedders implement only what they draw.

use glam::DVec2;

use crate::connector::ConnectorId;
use crate::node::NodeId;

/// How a position change should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Jump straight to the position (drag previews).
    Immediate,
    /// Animate toward the position (drop commits).
    Animate,
}

/// Commands the engine issues to its rendering collaborator.
pub trait RenderSink {
    /// Move a node's visual to `position`.
    fn set_node_position(&mut self, id: NodeId, position: DVec2, motion: Motion) {
        let _ = (id, position, motion);
    }

    /// Replace a persisted connector's polyline.
    fn set_connector_points(&mut self, id: ConnectorId, points: &[DVec2]) {
        let _ = (id, points);
    }

    /// Toggle a node's selection visual.
    fn set_node_selected(&mut self, id: NodeId, selected: bool) {
        let _ = (id, selected);
    }

    /// Toggle a connector's selection visual.
    fn set_connector_selected(&mut self, id: ConnectorId, selected: bool) {
        let _ = (id, selected);
    }

    /// Show (or update) the in-progress connector preview.
    fn show_route_preview(&mut self, points: &[DVec2]) {
        let _ = points;
    }

    /// Hide the in-progress connector preview.
    fn hide_route_preview(&mut self) {}
}

/// A sink that draws nothing. Useful for headless embedding and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {}

/// A sink that records every command it receives, for assertions in tests
/// and for embedders that batch paint work.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub commands: Vec<Command>,
}

/// One recorded [`RenderSink`] command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    NodePosition {
        id: NodeId,
        position: DVec2,
        motion: Motion,
    },
    ConnectorPoints {
        id: ConnectorId,
        points: Vec<DVec2>,
    },
    NodeSelected {
        id: NodeId,
        selected: bool,
    },
    ConnectorSelected {
        id: ConnectorId,
        selected: bool,
    },
    RoutePreview {
        points: Vec<DVec2>,
    },
    HideRoutePreview,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// The most recent preview polyline, if a preview is still showing.
    pub fn last_preview(&self) -> Option<&[DVec2]> {
        for cmd in self.commands.iter().rev() {
            match cmd {
                Command::RoutePreview { points } => return Some(points.as_slice()),
                Command::HideRoutePreview => return None,
                _ => {}
            }
        }
        None
    }
}

impl RenderSink for RecordingSink {
    fn set_node_position(&mut self, id: NodeId, position: DVec2, motion: Motion) {
        self.commands.push(Command::NodePosition {
            id,
            position,
            motion,
        });
    }

    fn set_connector_points(&mut self, id: ConnectorId, points: &[DVec2]) {
        self.commands.push(Command::ConnectorPoints {
            id,
            points: points.to_vec(),
        });
    }

    fn set_node_selected(&mut self, id: NodeId, selected: bool) {
        self.commands.push(Command::NodeSelected { id, selected });
    }

    fn set_connector_selected(&mut self, id: ConnectorId, selected: bool) {
        self.commands.push(Command::ConnectorSelected { id, selected });
    }

    fn show_route_preview(&mut self, points: &[DVec2]) {
        self.commands.push(Command::RoutePreview {
            points: points.to_vec(),
        });
    }

    fn hide_route_preview(&mut self) {
        self.commands.push(Command::HideRoutePreview);
    }
}
