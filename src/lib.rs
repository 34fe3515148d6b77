//! marketmap - Force-directed market map layout with an interactive view transform.
//!
//! This crate positions the companies, investors and categories of a market
//! graph with a deterministic force simulation, and maps the resulting layout
//! to screen space through a pan/zoom transform.

pub mod camera;
pub mod config;
pub mod graph;
pub mod io;
pub mod layout;
pub mod scene;
pub mod session;
pub mod simulation;

pub use camera::{DragState, ViewTransform};
pub use config::{LayoutConfig, MarketMapConfig, ViewConfig};
pub use graph::{GraphLink, GraphNode, LinkKind, MarketGraphData, NodeKind};
pub use layout::{LayoutSnapshot, PositionedNode, ResolvedLink};
pub use session::MarketMap;
pub use simulation::{ForceSimulation, LayoutStats, compute_layout};
