//! Interactive market map session
//!
//! Ties the current graph, its layout snapshot and the view transform
//! together. Layout is recomputed whenever the graph or the viewport changes;
//! the view transform is reset at the same time and otherwise only changes
//! through gestures.

use tracing::debug;

use crate::camera::ViewTransform;
use crate::config::{LayoutConfig, MarketMapConfig};
use crate::graph::MarketGraphData;
use crate::layout::{LayoutSnapshot, PositionedNode};
use crate::simulation::compute_layout;

/// Identifies one layout request; only the newest may be committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LayoutTicket(u64);

/// Everything a request needs to compute its layout off the event loop
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub ticket: LayoutTicket,
    pub graph: MarketGraphData,
    pub width: f64,
    pub height: f64,
    pub config: LayoutConfig,
}

impl LayoutRequest {
    /// Run the simulation for this request
    pub fn compute(&self) -> LayoutSnapshot {
        compute_layout(&self.graph, self.width, self.height, &self.config)
    }
}

/// Market map state owned by the interaction layer
pub struct MarketMap {
    config: MarketMapConfig,
    graph: MarketGraphData,
    snapshot: LayoutSnapshot,
    view: ViewTransform,
    generation: u64,
}

impl MarketMap {
    /// Create an empty map for a viewport
    pub fn new(config: MarketMapConfig, width: f64, height: f64) -> Self {
        let view = ViewTransform::new(width, height, config.view);
        Self {
            config,
            graph: MarketGraphData::default(),
            snapshot: LayoutSnapshot::empty(),
            view,
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> &LayoutSnapshot {
        &self.snapshot
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Mutable view for gesture handlers
    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    pub fn graph(&self) -> &MarketGraphData {
        &self.graph
    }

    /// Replace the graph and recompute synchronously
    pub fn set_graph(&mut self, graph: MarketGraphData) {
        self.graph = graph;
        let request = self.begin_layout();
        let snapshot = request.compute();
        self.commit(request.ticket, snapshot);
    }

    /// Change the viewport and recompute synchronously
    pub fn resize(&mut self, width: f64, height: f64) {
        self.view.resize(width, height);
        let request = self.begin_layout();
        let snapshot = request.compute();
        self.commit(request.ticket, snapshot);
    }

    /// Issue a new layout request for the current graph and viewport
    ///
    /// Any request issued earlier becomes stale.
    pub fn begin_layout(&mut self) -> LayoutRequest {
        self.generation += 1;
        LayoutRequest {
            ticket: LayoutTicket(self.generation),
            graph: self.graph.clone(),
            width: self.view.width,
            height: self.view.height,
            config: self.config.layout.clone(),
        }
    }

    /// Install a computed snapshot if its ticket is still the newest
    ///
    /// Stale results are discarded whole. Returns whether the snapshot was
    /// installed.
    pub fn commit(&mut self, ticket: LayoutTicket, snapshot: LayoutSnapshot) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                latest = self.generation,
                "discarding stale layout"
            );
            return false;
        }
        self.snapshot = snapshot;
        self.view.reset();
        true
    }

    /// Node under a screen-space point
    pub fn node_at_screen(&self, sx: f64, sy: f64) -> Option<&PositionedNode> {
        self.view.node_at(&self.snapshot, sx, sy)
    }
}
