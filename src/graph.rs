//! Market graph data types
//!
//! The payload handed over by the data-fetching side: companies, investors and
//! categories connected by typed, weighted links. Positions are not part of the
//! payload; they are computed by the force simulation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Largest radius a node may take, whatever its payload size
pub const MAX_NODE_RADIUS: f64 = 1e6;

/// CSS colors for node and link kinds
pub mod colors {
    /// Company nodes: Blue (#3b82f6)
    pub const COMPANY: &str = "#3b82f6";

    /// Investor nodes: Green (#22c55e)
    pub const INVESTOR: &str = "#22c55e";

    /// Category nodes: Purple (#a855f7)
    pub const CATEGORY: &str = "#a855f7";

    /// All links: Slate (#94a3b8)
    pub const LINK: &str = "#94a3b8";

    /// Link stroke opacity
    pub const LINK_OPACITY: f64 = 0.3;
}

/// Node kind enumeration for semantic categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Company,
    Investor,
    Category,
}

impl NodeKind {
    /// All node kinds, in legend order
    pub const ALL: [NodeKind; 3] = [NodeKind::Company, NodeKind::Investor, NodeKind::Category];

    /// Fill color for this node kind
    pub fn color(&self) -> &'static str {
        match self {
            NodeKind::Company => colors::COMPANY,
            NodeKind::Investor => colors::INVESTOR,
            NodeKind::Category => colors::CATEGORY,
        }
    }

    /// Radius used when the payload carries no usable size
    pub fn default_size(&self) -> f64 {
        match self {
            NodeKind::Company => 20.0,
            NodeKind::Investor => 14.0,
            NodeKind::Category => 10.0,
        }
    }

    /// Human-readable legend label
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Company => "Company",
            NodeKind::Investor => "Investor",
            NodeKind::Category => "Category",
        }
    }
}

/// Link kind enumeration for semantic categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Investor -> company
    InvestedIn,
    /// Company -> category it belongs to
    SameCategory,
    /// Company <-> company
    Competitor,
}

impl LinkKind {
    /// All link kinds
    pub const ALL: [LinkKind; 3] = [
        LinkKind::InvestedIn,
        LinkKind::SameCategory,
        LinkKind::Competitor,
    ];

    /// Stroke color for this link kind
    pub fn color(&self) -> &'static str {
        match self {
            LinkKind::InvestedIn | LinkKind::SameCategory | LinkKind::Competitor => colors::LINK,
        }
    }

    /// SVG dash pattern, if the kind is drawn dashed
    pub fn dash_array(&self) -> Option<&'static str> {
        match self {
            LinkKind::Competitor => Some("4 3"),
            LinkKind::InvestedIn | LinkKind::SameCategory => None,
        }
    }

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::InvestedIn => "invested_in",
            LinkKind::SameCategory => "same_category",
            LinkKind::Competitor => "competitor",
        }
    }
}

/// A node in the market graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier, stable across recomputation
    pub id: String,

    /// Display text
    pub label: String,

    /// Node kind determines color and default size
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Visual radius, also used as the collision radius
    #[serde(default)]
    pub size: Option<f64>,
}

impl GraphNode {
    /// Create a node with an explicit size
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind, size: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            size: Some(size),
        }
    }

    /// Radius used for drawing and collision avoidance
    pub fn radius(&self) -> f64 {
        match self.size {
            Some(size) if size.is_finite() && size > 0.0 => size.min(MAX_NODE_RADIUS),
            _ => self.kind.default_size(),
        }
    }
}

/// A typed, weighted link between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    /// Source node ID
    pub source: String,

    /// Target node ID
    pub target: String,

    /// Relationship kind; drawn differently, same physics
    #[serde(rename = "type")]
    pub kind: LinkKind,

    /// Scales attraction strength and stroke width
    #[serde(default)]
    pub weight: Option<f64>,
}

impl GraphLink {
    /// Create a link with an explicit weight
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: LinkKind,
        weight: f64,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            weight: Some(weight),
        }
    }

    /// Weight with invalid values replaced by 1.0
    pub fn effective_weight(&self) -> f64 {
        match self.weight {
            Some(weight) if weight.is_finite() && weight > 0.0 => weight,
            _ => 1.0,
        }
    }
}

/// Complete market graph payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketGraphData {
    /// All nodes in the graph
    #[serde(default)]
    pub nodes: Vec<GraphNode>,

    /// All links in the graph
    #[serde(default)]
    pub links: Vec<GraphLink>,
}

impl MarketGraphData {
    /// Create a graph from nodes and links
    pub fn new(nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Self {
        Self { nodes, links }
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A link whose endpoints were resolved to node indices
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedLink {
    pub source: usize,
    pub target: usize,
    pub kind: LinkKind,
    pub weight: f64,
}

/// What validation removed from the payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Links referencing an unknown node id
    pub dropped_links: usize,
    /// Nodes whose id was already taken by an earlier node
    pub duplicate_nodes: usize,
}

impl ValidationReport {
    /// Whether anything was dropped
    pub fn is_clean(&self) -> bool {
        self.dropped_links == 0 && self.duplicate_nodes == 0
    }
}

/// Graph ready for simulation: unique nodes and index-resolved links
#[derive(Debug, Clone, Default)]
pub struct ValidatedGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<IndexedLink>,
    pub report: ValidationReport,
}

/// Drop duplicate nodes and dangling links
///
/// Never fails: a partial graph is a normal occurrence, so dropped items are
/// counted in the report and logged instead.
pub fn validate(data: &MarketGraphData) -> ValidatedGraph {
    let mut report = ValidationReport::default();
    let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(data.nodes.len());
    let mut nodes = Vec::with_capacity(data.nodes.len());

    for node in &data.nodes {
        if index_of.contains_key(node.id.as_str()) {
            report.duplicate_nodes += 1;
            continue;
        }
        index_of.insert(node.id.as_str(), nodes.len());
        nodes.push(node.clone());
    }

    let links: Vec<IndexedLink> = data
        .links
        .iter()
        .filter_map(|link| {
            let resolved = index_of
                .get(link.source.as_str())
                .zip(index_of.get(link.target.as_str()));
            if resolved.is_none() {
                report.dropped_links += 1;
            }
            let (&source, &target) = resolved?;
            Some(IndexedLink {
                source,
                target,
                kind: link.kind,
                weight: link.effective_weight(),
            })
        })
        .collect();

    if report.duplicate_nodes > 0 {
        warn!(
            count = report.duplicate_nodes,
            "dropped nodes with duplicate ids"
        );
    }
    if report.dropped_links > 0 {
        warn!(
            count = report.dropped_links,
            "dropped links referencing unknown nodes"
        );
    }

    ValidatedGraph {
        nodes,
        links,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MarketGraphData {
        MarketGraphData::new(
            vec![
                GraphNode::new("acme", "Acme", NodeKind::Company, 30.0),
                GraphNode::new("vc", "Big VC", NodeKind::Investor, 20.0),
                GraphNode::new("ai", "AI", NodeKind::Category, 15.0),
            ],
            vec![
                GraphLink::new("vc", "acme", LinkKind::InvestedIn, 1.0),
                GraphLink::new("acme", "ai", LinkKind::SameCategory, 1.0),
            ],
        )
    }

    #[test]
    fn deserializes_payload() {
        let json = r#"{
            "nodes": [
                {"id": "a", "label": "A", "type": "company", "size": 30},
                {"id": "b", "label": "B", "type": "investor", "size": 20}
            ],
            "links": [
                {"source": "b", "target": "a", "type": "invested_in", "weight": 2.5}
            ]
        }"#;
        let data: MarketGraphData = serde_json::from_str(json).unwrap();

        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.nodes[1].kind, NodeKind::Investor);
        assert_eq!(data.nodes[0].radius(), 30.0);
        assert_eq!(data.links[0].kind, LinkKind::InvestedIn);
        assert_eq!(data.links[0].effective_weight(), 2.5);
    }

    #[test]
    fn rejects_unknown_kind() {
        let json = r#"{"nodes": [{"id": "a", "label": "A", "type": "fund"}], "links": []}"#;
        assert!(serde_json::from_str::<MarketGraphData>(json).is_err());
    }

    #[test]
    fn missing_size_falls_back_to_kind_default() {
        let json = r#"{"nodes": [{"id": "a", "label": "A", "type": "category"}]}"#;
        let data: MarketGraphData = serde_json::from_str(json).unwrap();
        assert_eq!(data.nodes[0].radius(), 10.0);

        let bad = GraphNode::new("x", "X", NodeKind::Company, f64::NAN);
        assert_eq!(bad.radius(), 20.0);
        let negative = GraphNode::new("y", "Y", NodeKind::Investor, -3.0);
        assert_eq!(negative.radius(), 14.0);
    }

    #[test]
    fn huge_size_is_capped() {
        let node = GraphNode::new("big", "Big", NodeKind::Company, 1e308);
        assert_eq!(node.radius(), MAX_NODE_RADIUS);
    }

    #[test]
    fn invalid_weight_is_one() {
        let zero = GraphLink::new("a", "b", LinkKind::Competitor, 0.0);
        assert_eq!(zero.effective_weight(), 1.0);
        let inf = GraphLink::new("a", "b", LinkKind::Competitor, f64::INFINITY);
        assert_eq!(inf.effective_weight(), 1.0);
    }

    #[test]
    fn validate_keeps_clean_graph() {
        let validated = validate(&sample());

        assert_eq!(validated.nodes.len(), 3);
        assert_eq!(validated.links.len(), 2);
        assert!(validated.report.is_clean());
        assert_eq!(validated.links[0].source, 1);
        assert_eq!(validated.links[0].target, 0);
    }

    #[test]
    fn validate_drops_dangling_links() {
        let mut data = sample();
        data.links
            .push(GraphLink::new("acme", "ghost", LinkKind::Competitor, 1.0));
        data.links
            .push(GraphLink::new("nobody", "acme", LinkKind::InvestedIn, 1.0));

        let validated = validate(&data);

        assert_eq!(validated.links.len(), 2);
        assert_eq!(validated.report.dropped_links, 2);
    }

    #[test]
    fn validate_keeps_first_duplicate() {
        let mut data = sample();
        data.nodes
            .push(GraphNode::new("acme", "Acme again", NodeKind::Company, 5.0));

        let validated = validate(&data);

        assert_eq!(validated.nodes.len(), 3);
        assert_eq!(validated.nodes[0].label, "Acme");
        assert_eq!(validated.report.duplicate_nodes, 1);
    }

    #[test]
    fn every_kind_has_a_color() {
        for kind in NodeKind::ALL {
            assert!(kind.color().starts_with('#'));
        }
        for kind in LinkKind::ALL {
            assert_eq!(kind.color(), colors::LINK);
        }
        assert_eq!(LinkKind::Competitor.dash_array(), Some("4 3"));
    }
}
