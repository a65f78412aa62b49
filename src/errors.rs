//! Error types with diagnostic codes using miette.
//!
//! Every failure in this crate is a refused transition: the workspace is
//! left exactly as it was and the caller receives one of these errors (or,
//! for movement candidates and blocked routing steps, simply no state
//! advance at all).

use miette::Diagnostic;
use thiserror::Error;

use crate::connector::ConnectorId;
use crate::node::{AttachmentRef, NodeId, NodeKind};

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors from validating a [`crate::WorkspaceConfig`].
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{what} must be positive and finite, got {value}")]
    #[diagnostic(code(flowgrid::config::not_positive))]
    NotPositive { what: &'static str, value: f64 },

    #[error("padding must be non-negative and finite, got {value}")]
    #[diagnostic(code(flowgrid::config::negative_padding))]
    NegativePadding { value: f64 },

    #[error("padding {padding} leaves no interior in a {width}x{height} workspace")]
    #[diagnostic(
        code(flowgrid::config::padding_consumes_workspace),
        help("padding is applied on every side; it must be less than half of each dimension")
    )]
    PaddingConsumesWorkspace {
        padding: f64,
        width: f64,
        height: f64,
    },
}

// ============================================================================
// Placement Errors
// ============================================================================

/// Errors from the placement engine.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PlaceError {
    #[error("no free cell for a {kind:?} node within {searched_rings} spiral rings")]
    #[diagnostic(
        code(flowgrid::place::no_space_available),
        help("the workspace is saturated near the requested origin; remove nodes or enlarge the workspace")
    )]
    NoSpaceAvailable {
        kind: NodeKind,
        searched_rings: u32,
    },
}

// ============================================================================
// Workspace Errors
// ============================================================================

/// Errors from workspace registry operations.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum WorkspaceError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Place(#[from] PlaceError),

    #[error("unknown node {id}")]
    #[diagnostic(code(flowgrid::workspace::unknown_node))]
    UnknownNode { id: NodeId },

    #[error("unknown connector {id}")]
    #[diagnostic(code(flowgrid::workspace::unknown_connector))]
    UnknownConnector { id: ConnectorId },

    #[error("no such attachment point {at}")]
    #[diagnostic(code(flowgrid::workspace::unknown_attachment))]
    UnknownAttachment { at: AttachmentRef },

    #[error("the entry node {id} cannot be destroyed")]
    #[diagnostic(
        code(flowgrid::workspace::entry_node_immortal),
        help("every diagram keeps exactly one entry node; delete other nodes instead")
    )]
    EntryNodeImmortal { id: NodeId },
}

// ============================================================================
// Movement Errors
// ============================================================================

/// Errors from starting a move session.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum MoveError {
    #[error("unknown node {id}")]
    #[diagnostic(code(flowgrid::movement::unknown_node))]
    UnknownNode { id: NodeId },

    #[error("nothing is selected")]
    #[diagnostic(
        code(flowgrid::movement::empty_selection),
        help("a group move needs at least one selected node")
    )]
    EmptySelection,
}

// ============================================================================
// Routing Errors
// ============================================================================

/// Errors from starting or finishing a routing session.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("no such attachment point {at}")]
    #[diagnostic(code(flowgrid::routing::unknown_attachment))]
    UnknownAttachment { at: AttachmentRef },

    #[error("attachment {at} is not a source")]
    #[diagnostic(code(flowgrid::routing::not_a_source))]
    NotASource { at: AttachmentRef },

    #[error("source attachment {at} already starts a connector")]
    #[diagnostic(code(flowgrid::routing::source_occupied))]
    SourceOccupied { at: AttachmentRef },

    #[error("attachment {at} is not a sink")]
    #[diagnostic(code(flowgrid::routing::not_a_sink))]
    NotASink { at: AttachmentRef },

    #[error("sink attachment {at} already terminates a connector")]
    #[diagnostic(code(flowgrid::routing::sink_occupied))]
    SinkOccupied { at: AttachmentRef },

    #[error("a connector cannot link {at} back to its own node")]
    #[diagnostic(code(flowgrid::routing::same_node))]
    SameNode { at: AttachmentRef },

    #[error("sink attachment {at} coincides with the route's start, nothing to connect")]
    #[diagnostic(code(flowgrid::routing::degenerate_route))]
    DegenerateRoute { at: AttachmentRef },

    #[error("cannot finish at {at}: the closing run is obstructed")]
    #[diagnostic(code(flowgrid::routing::path_obstructed))]
    PathObstructed { at: AttachmentRef },
}
