//! Placement engine: find a free grid-aligned slot near a requested origin.
//!
//! The requested origin (workspace center by default) is snapped down to
//! the movement grid. If the node's rectangle at that cell is free it is
//! used as-is; otherwise an outward square spiral scans neighboring cells
//! until a free, in-bounds cell turns up. The scan is deterministic and
//! capped: once it has covered every cell within the configured ring
//! radius it gives up with [`PlaceError::NoSpaceAvailable`].

use glam::{DVec2, IVec2, dvec2};

use crate::errors::PlaceError;
use crate::node::NodeKind;
use crate::types::{Rect, snap_down};
use crate::workspace::Workspace;

/// Direction cycle of the spiral: up, right, down, left (Y-down coords).
const SPIRAL_DIRS: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
];

/// Cell offsets of an unbounded square spiral around the origin cell.
///
/// Yields `(0, 0)` first, then walks legs of growing length: one cell up,
/// one right, two down, two left, three up, and so on: the leg length
/// grows by one every two direction changes.
pub(crate) struct SpiralCells {
    current: IVec2,
    dir: usize,
    leg_len: u32,
    leg_step: u32,
    legs_done: u32,
    started: bool,
}

impl SpiralCells {
    pub(crate) fn new() -> SpiralCells {
        SpiralCells {
            current: IVec2::ZERO,
            dir: 0,
            leg_len: 1,
            leg_step: 0,
            legs_done: 0,
            started: false,
        }
    }
}

impl Iterator for SpiralCells {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        if !self.started {
            self.started = true;
            return Some(IVec2::ZERO);
        }
        self.current += SPIRAL_DIRS[self.dir];
        let out = self.current;
        self.leg_step += 1;
        if self.leg_step == self.leg_len {
            self.leg_step = 0;
            self.dir = (self.dir + 1) % 4;
            self.legs_done += 1;
            if self.legs_done % 2 == 0 {
                self.leg_len += 1;
            }
        }
        Some(out)
    }
}

/// All spiral cells within Chebyshev distance `max_radius`, in spiral
/// order. Exactly `(2r + 1)^2` cells; the search is always finite.
pub(crate) fn spiral_cells(max_radius: u32) -> impl Iterator<Item = IVec2> {
    let r = max_radius as i32;
    let total = ((2 * r + 1) * (2 * r + 1)) as usize;
    SpiralCells::new()
        .filter(move |cell| cell.x.abs() <= r && cell.y.abs() <= r)
        .take(total)
}

/// Find the top-left origin for a new node of the given size.
///
/// Used by [`Workspace::place`]; the workspace is only read here, the
/// caller commits the returned position.
pub(crate) fn find_free_origin(
    workspace: &Workspace,
    kind: NodeKind,
    size: DVec2,
    requested_origin: Option<DVec2>,
) -> Result<DVec2, PlaceError> {
    let config = workspace.config();
    let grid = config.move_grid;
    let origin = requested_origin.unwrap_or_else(|| config.center());
    let snapped = dvec2(snap_down(origin.x, grid.x), snap_down(origin.y, grid.y));

    for offset in spiral_cells(config.max_spiral_radius) {
        let candidate = snapped + dvec2(offset.x as f64 * grid.x, offset.y as f64 * grid.y);
        let rect = Rect::from_origin_size(candidate, size);
        if workspace.rect_free(&rect, |_| false) {
            crate::log::trace!(
                x = candidate.x,
                y = candidate.y,
                cell_dx = offset.x,
                cell_dy = offset.y,
                "placement slot found"
            );
            return Ok(candidate);
        }
    }

    crate::log::warn!(?kind, "placement search exhausted");
    Err(PlaceError::NoSpaceAvailable {
        kind,
        searched_rings: config.max_spiral_radius,
    })
}
