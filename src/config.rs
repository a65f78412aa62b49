//! Workspace configuration.
//!
//! All knobs the embedding editor supplies: workspace bounds, padding
//! inset, the node-movement grid, the routing grid, per-kind node sizes,
//! the spiral search cap and the routing axis re-lock policy.

use glam::{DVec2, dvec2};

use crate::errors::ConfigError;
use crate::node::NodeKind;
use crate::types::Rect;

/// Default sizes and settings (workspace pixels)
pub mod defaults {
    pub const WORKSPACE_WIDTH: f64 = 1600.0;
    pub const WORKSPACE_HEIGHT: f64 = 1200.0;
    pub const PADDING: f64 = 40.0;
    pub const MOVE_GRID: f64 = 20.0;
    pub const ROUTE_GRID: f64 = 10.0;
    /// Spiral placement gives up after this many rings around the origin cell.
    pub const MAX_SPIRAL_RADIUS: u32 = 64;

    pub const START_WIDTH: f64 = 100.0;
    pub const START_HEIGHT: f64 = 50.0;
    pub const END_WIDTH: f64 = 100.0;
    pub const END_HEIGHT: f64 = 50.0;
    pub const PROCESS_WIDTH: f64 = 120.0;
    pub const PROCESS_HEIGHT: f64 = 60.0;
    pub const DECISION_WIDTH: f64 = 120.0;
    pub const DECISION_HEIGHT: f64 = 80.0;
}

/// Fixed width/height per node kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSizes {
    pub start: DVec2,
    pub end: DVec2,
    pub process: DVec2,
    pub decision: DVec2,
}

impl NodeSizes {
    pub fn of(&self, kind: NodeKind) -> DVec2 {
        match kind {
            NodeKind::Start => self.start,
            NodeKind::End => self.end,
            NodeKind::Process => self.process,
            NodeKind::Decision => self.decision,
        }
    }
}

impl Default for NodeSizes {
    fn default() -> Self {
        NodeSizes {
            start: dvec2(defaults::START_WIDTH, defaults::START_HEIGHT),
            end: dvec2(defaults::END_WIDTH, defaults::END_HEIGHT),
            process: dvec2(defaults::PROCESS_WIDTH, defaults::PROCESS_HEIGHT),
            decision: dvec2(defaults::DECISION_WIDTH, defaults::DECISION_HEIGHT),
        }
    }
}

/// Configuration for one workspace instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    /// Workspace width in pixels.
    pub width: f64,
    /// Workspace height in pixels.
    pub height: f64,
    /// Interior inset; nodes must stay within bounds minus padding.
    pub padding: f64,
    /// Node-movement grid cell size (width, height).
    pub move_grid: DVec2,
    /// Routing grid unit per axis, distinct from the movement grid.
    pub route_grid: DVec2,
    /// Ring cap for the spiral placement search.
    pub max_spiral_radius: u32,
    /// Recompute the routing axis lock on every pointer update (observed
    /// editor behavior) instead of only at corner commits.
    pub relock_each_update: bool,
    /// Fixed node dimensions per kind.
    pub node_sizes: NodeSizes,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            width: defaults::WORKSPACE_WIDTH,
            height: defaults::WORKSPACE_HEIGHT,
            padding: defaults::PADDING,
            move_grid: DVec2::splat(defaults::MOVE_GRID),
            route_grid: DVec2::splat(defaults::ROUTE_GRID),
            max_spiral_radius: defaults::MAX_SPIRAL_RADIUS,
            relock_each_update: true,
            node_sizes: NodeSizes::default(),
        }
    }
}

impl WorkspaceConfig {
    /// Create a validated configuration.
    ///
    /// Rejects non-finite or non-positive dimensions and grids, and a
    /// padding that leaves no interior.
    pub fn try_new(width: f64, height: f64, padding: f64) -> Result<Self, ConfigError> {
        let config = WorkspaceConfig {
            width,
            height,
            padding,
            ..WorkspaceConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate every field. Called by [`crate::Workspace::new`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("move grid width", self.move_grid.x),
            ("move grid height", self.move_grid.y),
            ("route grid x unit", self.route_grid.x),
            ("route grid y unit", self.route_grid.y),
        ];
        for (what, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive {
                    what,
                    value,
                });
            }
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(ConfigError::NegativePadding {
                value: self.padding,
            });
        }
        if self.padding * 2.0 >= self.width || self.padding * 2.0 >= self.height {
            return Err(ConfigError::PaddingConsumesWorkspace {
                padding: self.padding,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Full workspace rectangle, origin at (0, 0).
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(DVec2::ZERO, dvec2(self.width, self.height))
    }

    /// Workspace rectangle shrunk by the padding inset. Nodes live here.
    pub fn interior(&self) -> Rect {
        self.bounds().inset(self.padding)
    }

    /// Workspace center, the default placement origin.
    pub fn center(&self) -> DVec2 {
        dvec2(self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(WorkspaceConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_nonpositive_dimensions() {
        assert!(WorkspaceConfig::try_new(0.0, 300.0, 10.0).is_err());
        assert!(WorkspaceConfig::try_new(500.0, -1.0, 10.0).is_err());
        assert!(WorkspaceConfig::try_new(f64::NAN, 300.0, 10.0).is_err());
    }

    #[test]
    fn rejects_padding_that_consumes_workspace() {
        assert!(WorkspaceConfig::try_new(500.0, 300.0, 150.0).is_err());
        assert!(WorkspaceConfig::try_new(500.0, 300.0, 149.0).is_ok());
    }

    #[test]
    fn rejects_nonpositive_grid() {
        let mut config = WorkspaceConfig::default();
        config.move_grid = dvec2(0.0, 20.0);
        assert!(config.validate().is_err());
        config.move_grid = dvec2(20.0, 20.0);
        config.route_grid = dvec2(10.0, f64::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn interior_is_bounds_minus_padding() {
        let config = WorkspaceConfig::try_new(500.0, 300.0, 50.0).unwrap();
        let interior = config.interior();
        assert_eq!(interior.min, dvec2(50.0, 50.0));
        assert_eq!(interior.max, dvec2(450.0, 250.0));
        assert_eq!(config.center(), dvec2(250.0, 150.0));
    }
}
