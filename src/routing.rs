//! Interactive orthogonal connector routing.
//!
//! A [`RouteSession`] is the DRAWING half of a two-state machine (IDLE is
//! simply "no session"). It starts at an unoccupied source attachment and
//! grows a polyline one axis-locked segment at a time:
//!
//! - every pointer update recomputes the dominant axis relative to the
//!   last committed corner (vertical only when |dy| strictly exceeds
//!   |dx|) and snaps the pointer to the routing grid on that axis;
//! - the engine then walks grid-unit steps from the last corner toward
//!   the snapped target, stopping at the first point strictly inside any
//!   node, so the line visibly truncates at an obstacle;
//! - a click while the tip is valid commits it as a permanent corner and
//!   starts a fresh axis lock; a click while truncated destroys the
//!   in-progress route;
//! - releasing on a compatible, unoccupied sink attachment closes the
//!   polyline (inserting an elbow if the last corner is not axis-aligned
//!   with the sink) and persists it into the workspace.
//!
//! Whether the axis lock is recomputed on every update or held until the
//! next corner commits is controlled by
//! [`WorkspaceConfig::relock_each_update`](crate::config::WorkspaceConfig).

use glam::{DVec2, dvec2};

use crate::connector::{self, ConnectorId};
use crate::errors::RouteError;
use crate::node::{AttachmentRef, Role};
use crate::sink::RenderSink;
use crate::types::{Axis, snap_nearest};
use crate::workspace::Workspace;

/// What a click did to an in-progress route.
#[must_use]
pub enum ClickOutcome {
    /// The route continues; the tip may have become a permanent corner.
    Drawing(RouteSession),
    /// The click landed while the tip was truncated at an obstacle; the
    /// in-progress connector is gone.
    Destroyed,
}

/// An in-progress connector, from its source attachment to a free tip.
#[derive(Debug)]
pub struct RouteSession {
    source: AttachmentRef,
    /// Committed corners. The first is the source attachment location.
    points: Vec<DVec2>,
    /// Rubber end of the current segment; not yet a corner.
    tip: DVec2,
    /// Axis lock for the current segment. `None` until the first update
    /// after a corner commit.
    lock: Option<Axis>,
    /// True when the last update could not reach its snapped target.
    blocked: bool,
}

impl RouteSession {
    /// Start routing from a source attachment. The attachment must have
    /// the source role and must not already start a connector.
    pub fn begin(
        workspace: &Workspace,
        source: AttachmentRef,
        sink: &mut impl RenderSink,
    ) -> Result<RouteSession, RouteError> {
        let role = workspace
            .attachment_role(source)
            .map_err(|_| RouteError::UnknownAttachment { at: source })?;
        if role != Role::Source {
            return Err(RouteError::NotASource { at: source });
        }
        if workspace
            .attachment_occupied(source)
            .map_err(|_| RouteError::UnknownAttachment { at: source })?
        {
            return Err(RouteError::SourceOccupied { at: source });
        }
        let start = workspace
            .attachment_location(source)
            .map_err(|_| RouteError::UnknownAttachment { at: source })?;

        crate::log::debug!(source = %source, x = start.x, y = start.y, "routing started");
        sink.show_route_preview(&[start]);
        Ok(RouteSession {
            source,
            points: vec![start],
            tip: start,
            lock: None,
            blocked: false,
        })
    }

    pub fn source(&self) -> AttachmentRef {
        self.source
    }

    /// Committed corners so far.
    pub fn corners(&self) -> &[DVec2] {
        &self.points
    }

    pub fn tip(&self) -> DVec2 {
        self.tip
    }

    pub fn lock(&self) -> Option<Axis> {
        self.lock
    }

    /// True when the current segment is truncated at an obstacle.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    fn last_corner(&self) -> DVec2 {
        self.points.last().copied().unwrap_or(self.tip)
    }

    /// Recompute the tip for the current pointer position.
    ///
    /// The walk restarts from the last corner every time, so a segment
    /// that was truncated can grow again once the pointer retreats.
    pub fn update(&mut self, workspace: &Workspace, sink: &mut impl RenderSink, pointer: DVec2) {
        let last = self.last_corner();
        let lock = match self.lock {
            Some(axis) if !workspace.config().relock_each_update => axis,
            _ => Axis::dominant(pointer - last),
        };
        self.lock = Some(lock);

        let unit = lock.of(workspace.config().route_grid);
        let target_coord = snap_nearest(lock.of(pointer), unit);
        let target = lock.with(last, target_coord);

        let start_coord = lock.of(last);
        let span = target_coord - start_coord;
        let sign = span.signum();
        let full_steps = (span.abs() / unit).floor() as u64;

        let mut reached = last;
        let mut truncated = false;
        for step in 1..=full_steps {
            let p = lock.with(last, start_coord + sign * unit * step as f64);
            if !workspace.can_extend_to(p) {
                truncated = true;
                break;
            }
            reached = p;
        }
        // Final partial step when the target is not a whole number of
        // grid units away from the corner.
        if !truncated && reached != target {
            if workspace.can_extend_to(target) {
                reached = target;
            } else {
                truncated = true;
            }
        }

        self.tip = reached;
        self.blocked = truncated;

        let mut preview = self.points.clone();
        preview.push(self.tip);
        sink.show_route_preview(&preview);
    }

    /// A click in open space: commit the tip as a corner, or destroy the
    /// route if the tip is truncated at an obstacle.
    pub fn click(mut self, sink: &mut impl RenderSink) -> ClickOutcome {
        if self.blocked {
            crate::log::debug!(source = %self.source, "blocked click, route destroyed");
            sink.hide_route_preview();
            return ClickOutcome::Destroyed;
        }
        if self.tip != self.last_corner() {
            self.points.push(self.tip);
            self.lock = None;
        }
        ClickOutcome::Drawing(self)
    }

    /// Check whether the route could finish at `at` without consuming the
    /// session.
    pub fn can_finish(&self, workspace: &Workspace, at: AttachmentRef) -> Result<(), RouteError> {
        let role = workspace
            .attachment_role(at)
            .map_err(|_| RouteError::UnknownAttachment { at })?;
        if role != Role::Sink {
            return Err(RouteError::NotASink { at });
        }
        if workspace
            .attachment_occupied(at)
            .map_err(|_| RouteError::UnknownAttachment { at })?
        {
            return Err(RouteError::SinkOccupied { at });
        }
        if at.node == self.source.node {
            return Err(RouteError::SameNode { at });
        }
        let end = workspace
            .attachment_location(at)
            .map_err(|_| RouteError::UnknownAttachment { at })?;
        // Touching nodes can put a source and a sink midpoint on the same
        // spot; with no committed corner there is no polyline to persist.
        if self.points.len() == 1 && self.last_corner() == end {
            return Err(RouteError::DegenerateRoute { at });
        }
        Ok(())
    }

    /// Release on a sink attachment: close the polyline and persist it.
    ///
    /// The uncommitted rubber segment is discarded; the final run goes
    /// from the last committed corner to the sink, with one elbow when
    /// the two are not axis-aligned. Releasing while the tip is truncated
    /// destroys the route, and the closing run is walked with the same
    /// obstacle test as `update`, so a finish can never smuggle a segment
    /// through a node's interior.
    pub fn finish(
        self,
        workspace: &mut Workspace,
        sink: &mut impl RenderSink,
        at: AttachmentRef,
    ) -> Result<ConnectorId, RouteError> {
        self.can_finish(workspace, at)?;
        if self.blocked {
            crate::log::debug!(source = %self.source, "blocked finish, route destroyed");
            sink.hide_route_preview();
            return Err(RouteError::PathObstructed { at });
        }
        let end = workspace
            .attachment_location(at)
            .map_err(|_| RouteError::UnknownAttachment { at })?;

        let last = self.last_corner();
        let mut points = self.points;
        if last != end {
            let mut run = vec![last];
            let elbow = match self.lock {
                Some(Axis::Vertical) => dvec2(last.x, end.y),
                _ => dvec2(end.x, last.y),
            };
            if elbow != last && elbow != end {
                run.push(elbow);
            }
            run.push(end);
            for pair in run.windows(2) {
                if !run_clear(workspace, pair[0], pair[1]) {
                    sink.hide_route_preview();
                    return Err(RouteError::PathObstructed { at });
                }
            }
            points.extend(run.into_iter().skip(1));
        }
        let points = connector::normalize(&points);

        sink.hide_route_preview();
        let id = workspace.insert_connector(self.source, at, points.clone());
        crate::log::debug!(connector = %id, corners = points.len(), "connector persisted");
        sink.set_connector_points(id, &points);
        Ok(id)
    }

    /// Abandon the route. Nothing was persisted.
    pub fn cancel(self, sink: &mut impl RenderSink) {
        sink.hide_route_preview();
    }
}

/// Walk an orthogonal run in routing-grid steps, testing every point with
/// the same predicate `update` uses. Degenerate runs are trivially clear.
fn run_clear(workspace: &Workspace, from: DVec2, to: DVec2) -> bool {
    let Some(axis) = connector::segment_axis(from, to) else {
        return true;
    };
    let unit = axis.of(workspace.config().route_grid);
    let start = axis.of(from);
    let span = axis.of(to) - start;
    let sign = span.signum();
    let full_steps = (span.abs() / unit).floor() as u64;
    for step in 1..=full_steps {
        let p = axis.with(from, start + sign * unit * step as f64);
        if !workspace.can_extend_to(p) {
            return false;
        }
    }
    workspace.can_extend_to(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    use crate::config::WorkspaceConfig;
    use crate::connector::is_valid_polyline;
    use crate::node::{NodeId, NodeKind};
    use crate::sink::{NullSink, RecordingSink};

    /// 1000x600, padding 50, default grids (move 20, route 10).
    ///
    /// `a` is a process node at (100,100): north sink `a:0` at (160,100),
    /// south source `a:1` at (160,160). `b` is a process node at
    /// (500,400): north sink `b:0` at (560,400).
    fn routing_ws() -> (Workspace, NodeId, NodeId) {
        let config = WorkspaceConfig::try_new(1000.0, 600.0, 50.0).unwrap();
        let mut ws = Workspace::new(config).unwrap();
        let a = ws.place(NodeKind::Process, Some(dvec2(100.0, 100.0))).unwrap();
        let b = ws.place(NodeKind::Process, Some(dvec2(500.0, 400.0))).unwrap();
        (ws, a, b)
    }

    fn source_of(a: NodeId) -> AttachmentRef {
        AttachmentRef::new(a, 1)
    }

    fn sink_of(b: NodeId) -> AttachmentRef {
        AttachmentRef::new(b, 0)
    }

    // ==================== axis lock tests ====================

    #[test]
    fn equal_deltas_lock_horizontal() {
        let (ws, a, _) = routing_ws();
        let mut sink = NullSink;
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        // |dy| == |dx| == 60: not strictly greater, so horizontal wins.
        route.update(&ws, &mut sink, dvec2(220.0, 220.0));
        assert_eq!(route.lock(), Some(Axis::Horizontal));
        assert_eq!(route.tip(), dvec2(220.0, 160.0));
    }

    #[test]
    fn dominant_vertical_delta_locks_vertical() {
        let (ws, a, _) = routing_ws();
        let mut sink = NullSink;
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(165.0, 260.0));
        assert_eq!(route.lock(), Some(Axis::Vertical));
        assert_eq!(route.tip(), dvec2(160.0, 260.0));
    }

    #[test]
    fn lock_is_recomputed_each_update_by_default() {
        let (ws, a, _) = routing_ws();
        let mut sink = NullSink;
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(400.0, 170.0));
        assert_eq!(route.lock(), Some(Axis::Horizontal));
        // The next update is vertical-dominant relative to the corner, so
        // the lock flips without a corner commit.
        route.update(&ws, &mut sink, dvec2(180.0, 400.0));
        assert_eq!(route.lock(), Some(Axis::Vertical));
        assert_eq!(route.tip(), dvec2(160.0, 400.0));
    }

    #[test]
    fn lock_can_be_held_until_the_next_corner() {
        let mut config = WorkspaceConfig::try_new(1000.0, 600.0, 50.0).unwrap();
        config.relock_each_update = false;
        let mut ws = Workspace::new(config).unwrap();
        let a = ws.place(NodeKind::Process, Some(dvec2(100.0, 100.0))).unwrap();

        let mut sink = NullSink;
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(400.0, 170.0));
        assert_eq!(route.lock(), Some(Axis::Horizontal));
        // Vertical-dominant pointer, but the lock holds on this segment.
        route.update(&ws, &mut sink, dvec2(180.0, 400.0));
        assert_eq!(route.lock(), Some(Axis::Horizontal));
        assert_eq!(route.tip(), dvec2(180.0, 160.0));
    }

    // ==================== obstacle tests ====================

    #[test]
    fn tip_truncates_at_the_first_blocked_step() {
        let (mut ws, a, _) = routing_ws();
        // Obstacle straddling the horizontal path from `a`'s source.
        ws.place(NodeKind::Process, Some(dvec2(400.0, 140.0))).unwrap();

        let mut sink = NullSink;
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(600.0, 165.0));
        // The obstacle's border at x=400 is reachable; its interior not.
        assert_eq!(route.tip(), dvec2(400.0, 160.0));
        assert!(route.is_blocked());

        // Retreating past the obstacle clears the truncation.
        route.update(&ws, &mut sink, dvec2(300.0, 165.0));
        assert_eq!(route.tip(), dvec2(300.0, 160.0));
        assert!(!route.is_blocked());
    }

    #[test]
    fn click_while_blocked_destroys_the_route() {
        let (mut ws, a, _) = routing_ws();
        ws.place(NodeKind::Process, Some(dvec2(400.0, 140.0))).unwrap();

        let mut sink = RecordingSink::default();
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(600.0, 165.0));
        assert!(route.is_blocked());
        assert!(matches!(route.click(&mut sink), ClickOutcome::Destroyed));
        assert_eq!(sink.last_preview(), None);
        assert_eq!(ws.connector_count(), 0);
    }

    // ==================== corner and finish tests ====================

    #[test]
    fn click_commits_the_tip_as_a_corner() {
        let (ws, a, _) = routing_ws();
        let mut sink = NullSink;
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(165.0, 400.0));

        let ClickOutcome::Drawing(route) = route.click(&mut sink) else {
            panic!("valid click must keep drawing");
        };
        assert_eq!(route.corners(), &[dvec2(160.0, 160.0), dvec2(160.0, 400.0)]);
        // A fresh lock starts on the next segment.
        assert_eq!(route.lock(), None);
    }

    #[test]
    fn click_without_movement_adds_no_corner() {
        let (ws, a, _) = routing_ws();
        let mut sink = NullSink;
        let route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        let ClickOutcome::Drawing(route) = route.click(&mut sink) else {
            panic!("valid click must keep drawing");
        };
        assert_eq!(route.corners().len(), 1);
    }

    #[test]
    fn finish_persists_a_normalized_polyline() {
        let (mut ws, a, b) = routing_ws();
        let mut sink = RecordingSink::default();
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();

        route.update(&ws, &mut sink, dvec2(165.0, 400.0));
        let ClickOutcome::Drawing(mut route) = route.click(&mut sink) else {
            panic!("valid click must keep drawing");
        };
        route.update(&ws, &mut sink, dvec2(400.0, 405.0));
        let ClickOutcome::Drawing(route) = route.click(&mut sink) else {
            panic!("valid click must keep drawing");
        };

        let id = route.finish(&mut ws, &mut sink, sink_of(b)).unwrap();
        let connector = ws.connector(id).unwrap();
        // The (400,400) corner is collinear with the final run into the
        // sink and gets merged away.
        assert_eq!(
            connector.points(),
            &[dvec2(160.0, 160.0), dvec2(160.0, 400.0), dvec2(560.0, 400.0)]
        );
        assert!(is_valid_polyline(connector.points()));
        assert!(ws.attachment_occupied(source_of(a)).unwrap());
        assert!(ws.attachment_occupied(sink_of(b)).unwrap());
        assert_eq!(sink.last_preview(), None);
    }

    #[test]
    fn finish_inserts_an_elbow_when_corner_and_sink_are_not_aligned() {
        let (mut ws, a, b) = routing_ws();
        let mut sink = NullSink;
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(165.0, 380.0));
        let ClickOutcome::Drawing(route) = route.click(&mut sink) else {
            panic!("valid click must keep drawing");
        };

        let id = route.finish(&mut ws, &mut sink, sink_of(b)).unwrap();
        assert_eq!(
            ws.connector(id).unwrap().points(),
            &[
                dvec2(160.0, 160.0),
                dvec2(160.0, 380.0),
                dvec2(560.0, 380.0),
                dvec2(560.0, 400.0),
            ]
        );
    }

    #[test]
    fn finish_while_blocked_destroys_the_route() {
        let (mut ws, a, b) = routing_ws();
        ws.place(NodeKind::Process, Some(dvec2(400.0, 140.0))).unwrap();

        let mut sink = RecordingSink::default();
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(600.0, 165.0));
        assert!(route.is_blocked());

        // Releasing on a perfectly valid sink while truncated still
        // destroys the route; nothing may pass through the obstacle.
        let err = route.finish(&mut ws, &mut sink, sink_of(b)).unwrap_err();
        assert!(matches!(err, RouteError::PathObstructed { .. }));
        assert_eq!(ws.connector_count(), 0);
        assert_eq!(sink.last_preview(), None);
    }

    #[test]
    fn finish_rejects_an_obstructed_closing_run() {
        let (mut ws, a, b) = routing_ws();
        // Clear of the drawn segment, but astride the closing run at y=380.
        ws.place(NodeKind::Process, Some(dvec2(300.0, 360.0))).unwrap();

        let mut sink = NullSink;
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(165.0, 380.0));
        assert!(!route.is_blocked());
        let ClickOutcome::Drawing(route) = route.click(&mut sink) else {
            panic!("valid click must keep drawing");
        };

        let err = route.finish(&mut ws, &mut sink, sink_of(b)).unwrap_err();
        assert!(matches!(err, RouteError::PathObstructed { .. }));
        assert_eq!(ws.connector_count(), 0);
    }

    #[test]
    fn coincident_attachments_cannot_finish() {
        // Rects may share edges, so a start's south source and an end's
        // north sink can sit on the same point.
        let mut config = WorkspaceConfig::try_new(1000.0, 600.0, 50.0).unwrap();
        config.move_grid = dvec2(50.0, 50.0);
        let mut ws = Workspace::new(config).unwrap();
        let start = ws.place(NodeKind::Start, Some(dvec2(100.0, 100.0))).unwrap();
        let end = ws.place(NodeKind::End, Some(dvec2(100.0, 150.0))).unwrap();
        assert_eq!(
            ws.attachment_location(AttachmentRef::new(start, 0)).unwrap(),
            ws.attachment_location(AttachmentRef::new(end, 0)).unwrap()
        );

        let mut sink = NullSink;
        let route = RouteSession::begin(&ws, AttachmentRef::new(start, 0), &mut sink).unwrap();
        let err = route.finish(&mut ws, &mut sink, AttachmentRef::new(end, 0)).unwrap_err();
        assert!(matches!(err, RouteError::DegenerateRoute { .. }));
        assert_eq!(ws.connector_count(), 0);
    }

    // ==================== endpoint validation tests ====================

    #[test]
    fn begin_rejects_bad_sources() {
        let (mut ws, a, b) = routing_ws();
        let mut sink = NullSink;

        let err = RouteSession::begin(&ws, AttachmentRef::new(a, 0), &mut sink).unwrap_err();
        assert!(matches!(err, RouteError::NotASource { .. }));

        let err = RouteSession::begin(&ws, AttachmentRef::new(NodeId(99), 0), &mut sink).unwrap_err();
        assert!(matches!(err, RouteError::UnknownAttachment { .. }));

        ws.insert_connector(
            source_of(a),
            sink_of(b),
            vec![dvec2(160.0, 160.0), dvec2(160.0, 400.0), dvec2(560.0, 400.0)],
        );
        let err = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap_err();
        assert!(matches!(err, RouteError::SourceOccupied { .. }));
    }

    #[test]
    fn finish_rejects_bad_sinks() {
        let (mut ws, a, b) = routing_ws();
        let c = ws.place(NodeKind::Process, Some(dvec2(700.0, 100.0))).unwrap();
        // Occupy `b`'s sink with an unrelated connector.
        ws.insert_connector(
            source_of(c),
            sink_of(b),
            vec![dvec2(760.0, 160.0), dvec2(760.0, 400.0), dvec2(560.0, 400.0)],
        );

        let mut sink = NullSink;
        let route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();

        // Source-role attachment as a destination.
        let err = route.can_finish(&ws, AttachmentRef::new(b, 1)).unwrap_err();
        assert!(matches!(err, RouteError::NotASink { .. }));
        // Back onto the starting node.
        let err = route.can_finish(&ws, AttachmentRef::new(a, 0)).unwrap_err();
        assert!(matches!(err, RouteError::SameNode { .. }));
        // Already-terminated sink.
        let err = route.can_finish(&ws, sink_of(b)).unwrap_err();
        assert!(matches!(err, RouteError::SinkOccupied { .. }));

        assert_eq!(ws.connector_count(), 1);
    }

    // ==================== preview tests ====================

    #[test]
    fn updates_publish_the_preview_polyline() {
        let (ws, a, _) = routing_ws();
        let mut sink = RecordingSink::default();
        let mut route = RouteSession::begin(&ws, source_of(a), &mut sink).unwrap();
        route.update(&ws, &mut sink, dvec2(165.0, 300.0));
        assert_eq!(
            sink.last_preview(),
            Some(&[dvec2(160.0, 160.0), dvec2(160.0, 300.0)][..])
        );

        route.cancel(&mut sink);
        assert_eq!(sink.last_preview(), None);
    }
}
