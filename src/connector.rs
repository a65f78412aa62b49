//! Connectors: orthogonal polylines linking a source attachment to a sink.
//!
//! Polyline invariants, enforced by [`normalize`] before a connector is
//! persisted:
//! - consecutive points differ on exactly one axis (pure horizontal or
//!   vertical segments)
//! - no two consecutive segments share an axis (no redundant collinear
//!   points)

use glam::DVec2;

use crate::node::AttachmentRef;
use crate::types::{Axis, Rect};

/// Opaque connector identifier, allocated by the owning workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorId(pub(crate) u32);

impl std::fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "connector#{}", self.0)
    }
}

/// A persisted orthogonal polyline from a source attachment to a sink.
#[derive(Debug, Clone)]
pub struct Connector {
    pub(crate) id: ConnectorId,
    pub(crate) source: AttachmentRef,
    pub(crate) sink: AttachmentRef,
    /// Corner points, source first, sink last.
    pub(crate) points: Vec<DVec2>,
    pub(crate) selected: bool,
}

impl Connector {
    pub fn id(&self) -> ConnectorId {
        self.id
    }

    pub fn source(&self) -> AttachmentRef {
        self.source
    }

    pub fn sink(&self) -> AttachmentRef {
        self.sink
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Bounding rectangle of the polyline. A connector always has at least
    /// two points, so this never fails for a persisted connector.
    pub fn bounding_rect(&self) -> Rect {
        Rect::bounding(&self.points).unwrap_or(Rect {
            min: DVec2::ZERO,
            max: DVec2::ZERO,
        })
    }
}

/// Axis of the segment between two points, if the segment is orthogonal
/// and non-degenerate.
pub(crate) fn segment_axis(a: DVec2, b: DVec2) -> Option<Axis> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx != 0.0 && dy == 0.0 {
        Some(Axis::Horizontal)
    } else if dx == 0.0 && dy != 0.0 {
        Some(Axis::Vertical)
    } else {
        None
    }
}

/// Normalize a corner sequence: drop repeated points and merge runs of
/// collinear segments so that consecutive segments always alternate axes.
///
/// The input must already be orthogonal (every consecutive pair differs on
/// at most one axis); normalization never moves a point, it only removes
/// redundant ones.
pub(crate) fn normalize(points: &[DVec2]) -> Vec<DVec2> {
    let mut out: Vec<DVec2> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last() == Some(&p) {
            continue;
        }
        // Merge collinear runs: if the last two retained points and `p`
        // continue along the same axis, replace the middle corner.
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            if let (Some(ab), Some(bp)) = (segment_axis(a, b), segment_axis(b, p)) {
                if ab == bp {
                    *out.last_mut().expect("length checked above") = p;
                    continue;
                }
            }
        }
        out.push(p);
    }
    out
}

/// Check the connector polyline invariant: every consecutive pair differs
/// on exactly one axis, and consecutive segments alternate axes.
pub(crate) fn is_valid_polyline(points: &[DVec2]) -> bool {
    if points.len() < 2 {
        return false;
    }
    let mut prev_axis: Option<Axis> = None;
    for pair in points.windows(2) {
        let Some(axis) = segment_axis(pair[0], pair[1]) else {
            return false;
        };
        if prev_axis == Some(axis) {
            return false;
        }
        prev_axis = Some(axis);
    }
    true
}
