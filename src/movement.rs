//! Movement engine: grid-snapped, collision-validated node drags.
//!
//! A [`MoveSession`] converts a pointer drag into candidate positions, one
//! grid cell at a time. Two positions are tracked per affected node:
//!
//! - `committed_position`: the last grid-valid position, advanced only
//!   when validation passes (per axis, atomically for the whole group);
//! - the shadow preview, `start_position + live_offset`, which follows
//!   the pointer smoothly and is forwarded to the render sink so the drag
//!   never looks stuck.
//!
//! The workspace itself is only mutated by [`MoveSession::end`]; canceling
//! a drag therefore cannot leave a partially-applied group move.

use glam::{DVec2, IVec2};

use crate::errors::MoveError;
use crate::node::NodeId;
use crate::sink::{Motion, RenderSink};
use crate::types::{Axis, Rect, cell_of};
use crate::workspace::Workspace;

/// What a move session drags: one node, or the whole selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Node(NodeId),
    Selection,
}

/// Per-node drag state.
#[derive(Debug, Clone)]
struct Member {
    id: NodeId,
    size: DVec2,
    start_position: DVec2,
    committed_position: DVec2,
    /// Pointer cell at drag start.
    start_cell: IVec2,
    /// Last pointer cell processed for this node, per axis. Stays behind
    /// the pointer on a blocked axis so the axis is re-tried.
    last_cell: IVec2,
}

/// An in-flight node drag.
#[derive(Debug)]
pub struct MoveSession {
    members: Vec<Member>,
    pointer_start: DVec2,
    live_offset: DVec2,
}

impl MoveSession {
    /// Record start positions and the pointer's start cell.
    pub fn begin(
        workspace: &Workspace,
        target: MoveTarget,
        pointer: DVec2,
    ) -> Result<MoveSession, MoveError> {
        let ids = match target {
            MoveTarget::Node(id) => {
                workspace
                    .node(id)
                    .map_err(|_| MoveError::UnknownNode { id })?;
                vec![id]
            }
            MoveTarget::Selection => {
                let ids = workspace.selection().node_ids();
                if ids.is_empty() {
                    return Err(MoveError::EmptySelection);
                }
                ids
            }
        };

        let start_cell = Self::pointer_cell(workspace, pointer);
        let members = ids
            .into_iter()
            .filter_map(|id| workspace.node(id).ok())
            .map(|node| Member {
                id: node.id(),
                size: node.size(),
                start_position: node.position(),
                committed_position: node.position(),
                start_cell,
                last_cell: start_cell,
            })
            .collect();

        Ok(MoveSession {
            members,
            pointer_start: pointer,
            live_offset: DVec2::ZERO,
        })
    }

    /// Nodes affected by this drag.
    pub fn member_ids(&self) -> Vec<NodeId> {
        self.members.iter().map(|m| m.id).collect()
    }

    /// The last grid-valid position of one member.
    pub fn committed_position(&self, id: NodeId) -> Option<DVec2> {
        self.members
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.committed_position)
    }

    /// Process a pointer update.
    ///
    /// Each axis is validated and committed independently: an invalid X
    /// candidate for any member blocks X for the whole group this update,
    /// while a valid Y still commits, and vice versa. Re-running with an
    /// unchanged pointer cell changes nothing.
    pub fn update(&mut self, workspace: &Workspace, sink: &mut impl RenderSink, pointer: DVec2) {
        self.live_offset = pointer - self.pointer_start;
        let cell = Self::pointer_cell(workspace, pointer);

        self.advance_axis(workspace, Axis::Horizontal, cell.x);
        self.advance_axis(workspace, Axis::Vertical, cell.y);

        // Shadow preview follows the raw pointer regardless of grid
        // validity.
        for member in &self.members {
            sink.set_node_position(
                member.id,
                member.start_position + self.live_offset,
                Motion::Immediate,
            );
        }
    }

    /// Commit the drag: every member's position becomes its last valid
    /// committed position, animated on the render side.
    pub fn end(self, workspace: &mut Workspace, sink: &mut impl RenderSink) {
        for member in &self.members {
            workspace.set_node_position(member.id, member.committed_position);
            sink.set_node_position(member.id, member.committed_position, Motion::Animate);
        }
    }

    /// Abort the drag. The workspace was never touched; only the previews
    /// need to snap back.
    pub fn cancel(self, sink: &mut impl RenderSink) {
        for member in &self.members {
            sink.set_node_position(member.id, member.start_position, Motion::Immediate);
        }
    }

    fn pointer_cell(workspace: &Workspace, pointer: DVec2) -> IVec2 {
        let config = workspace.config();
        cell_of(
            pointer,
            DVec2::splat(config.padding),
            config.move_grid,
        )
    }

    /// Validate and commit one axis for the whole group.
    fn advance_axis(&mut self, workspace: &Workspace, axis: Axis, cell: i32) {
        let stale = self
            .members
            .iter()
            .any(|m| axis_cell(m.last_cell, axis) != cell);
        if !stale {
            return;
        }

        let grid = axis.of(workspace.config().move_grid);
        let moving: Vec<NodeId> = self.members.iter().map(|m| m.id).collect();

        // Candidate per member: start + cell delta, on this axis only.
        let candidates: Vec<DVec2> = self
            .members
            .iter()
            .map(|m| {
                let delta = (cell - axis_cell(m.start_cell, axis)) as f64 * grid;
                axis.with(
                    m.committed_position,
                    axis.of(m.start_position) + delta,
                )
            })
            .collect();

        let all_valid = self.members.iter().zip(&candidates).all(|(m, &candidate)| {
            let rect = Rect::from_origin_size(candidate, m.size);
            workspace.rect_free(&rect, |node| {
                moving.contains(&node.id()) || node.is_selected()
            })
        });

        if !all_valid {
            crate::log::trace!(?axis, cell, "group move blocked on axis");
            return;
        }

        for (member, candidate) in self.members.iter_mut().zip(candidates) {
            member.committed_position = candidate;
            member.last_cell = set_axis_cell(member.last_cell, axis, cell);
        }
    }
}

fn axis_cell(cell: IVec2, axis: Axis) -> i32 {
    match axis {
        Axis::Horizontal => cell.x,
        Axis::Vertical => cell.y,
    }
}

fn set_axis_cell(mut cell: IVec2, axis: Axis, value: i32) -> IVec2 {
    match axis {
        Axis::Horizontal => cell.x = value,
        Axis::Vertical => cell.y = value,
    }
    cell
}
