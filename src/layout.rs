//! Layout snapshot: the simulation's immutable output
//!
//! Consumed repeatedly by the drawing layer at different zoom levels without
//! re-deriving anything.

use serde::{Deserialize, Serialize};

use crate::graph::{LinkKind, NodeKind};

/// A node at its final simulated position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
}

impl PositionedNode {
    /// Whether a world-space point lies inside this node's circle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.distance_sq(x, y) <= self.radius * self.radius
    }

    fn distance_sq(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

/// A link with its endpoints replaced by their final coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLink {
    pub source: String,
    pub target: String,
    pub source_x: f64,
    pub source_y: f64,
    pub target_x: f64,
    pub target_y: f64,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub weight: f64,
}

impl ResolvedLink {
    /// Euclidean length of the drawn segment
    pub fn length(&self) -> f64 {
        (self.target_x - self.source_x).hypot(self.target_y - self.source_y)
    }
}

/// Positioned nodes and resolved links from one simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<ResolvedLink>,
}

impl LayoutSnapshot {
    /// The empty snapshot
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the snapshot has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Mean node position, `None` when empty
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.nodes.is_empty() {
            return None;
        }
        let n = self.nodes.len() as f64;
        let (sx, sy) = self
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        Some((sx / n, sy / n))
    }

    /// Bounding box of all node circles
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for node in &self.nodes {
            bounds.include_circle(node.x, node.y, node.radius);
        }
        bounds
    }

    /// Node whose circle contains the world-space point
    ///
    /// When circles overlap at the point, the node with the nearest center wins.
    pub fn node_at(&self, x: f64, y: f64) -> Option<&PositionedNode> {
        self.nodes
            .iter()
            .filter(|n| n.contains(x, y))
            .min_by(|a, b| a.distance_sq(x, y).total_cmp(&b.distance_sq(x, y)))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Check if the bounding box is empty
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Expand the bounding box to include a circle
    pub fn include_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.min_x = self.min_x.min(x - radius);
        self.max_x = self.max_x.max(x + radius);
        self.min_y = self.min_y.min(y - radius);
        self.max_y = self.max_y.max(y + radius);
    }

    /// Width, at least 1.0
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(1.0)
    }

    /// Height, at least 1.0
    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(1.0)
    }

    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.min_y + self.max_y) / 2.0
    }
}
