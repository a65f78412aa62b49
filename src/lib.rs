//! Diagram-layout and connector-routing engine for a block-based
//! flowchart editor.
//!
//! The crate is an in-process library: it owns the diagram state (a
//! [`Workspace`] of nodes and connectors) and turns discrete pointer
//! events into validated mutations of that state. It never touches
//! pixels or input devices; rendering is an external collaborator that
//! receives mutation commands through the [`RenderSink`] trait.
//!
//! Four engines share the workspace:
//!
//! - placement ([`Workspace::place`]): finds a free, grid-aligned spot
//!   for a new node by spiraling outward from the requested origin;
//! - movement ([`MoveSession`]): grid-snapped drags of one node or the
//!   whole selection, validated per axis so a blocked X never freezes a
//!   valid Y;
//! - selection ([`SelectSession`]): a rubber-band rectangle selecting
//!   items by strict containment;
//! - routing ([`RouteSession`]): interactive axis-locked orthogonal
//!   polylines between node attachment points.
//!
//! Everything runs synchronously on the caller's thread; a session in
//! progress holds no locks and spawns nothing.
//!
//! ```
//! use flowgrid::{MoveSession, MoveTarget, NodeKind, NullSink, Workspace, WorkspaceConfig};
//! use glam::dvec2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ws = Workspace::new(WorkspaceConfig::default())?;
//! let node = ws.place(NodeKind::Process, Some(dvec2(120.0, 80.0)))?;
//!
//! let mut sink = NullSink;
//! let mut drag = MoveSession::begin(&ws, MoveTarget::Node(node), dvec2(150.0, 110.0))?;
//! drag.update(&ws, &mut sink, dvec2(350.0, 110.0));
//! drag.end(&mut ws, &mut sink);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod errors;
pub mod log;
pub mod movement;
pub mod node;
mod place;
pub mod routing;
pub mod selection;
pub mod sink;
pub mod types;
pub mod workspace;

pub use config::{NodeSizes, WorkspaceConfig, defaults};
pub use connector::{Connector, ConnectorId};
pub use errors::{ConfigError, MoveError, PlaceError, RouteError, WorkspaceError};
pub use movement::{MoveSession, MoveTarget};
pub use node::{AttachmentPoint, AttachmentRef, Node, NodeId, NodeKind, Role};
pub use routing::{ClickOutcome, RouteSession};
pub use selection::SelectSession;
pub use sink::{Motion, NullSink, RecordingSink, RenderSink};
pub use types::{Axis, Rect, Side};
pub use workspace::{SelectionGroup, Workspace};
