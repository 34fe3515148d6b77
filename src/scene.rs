//! Screen-space drawing primitives
//!
//! Composes a layout snapshot with the current view transform into circles,
//! lines and labels in pixel coordinates. A renderer only has to draw them;
//! `Scene::to_svg` is the built-in renderer.

use askama::Template;

use crate::camera::ViewTransform;
use crate::graph::{NodeKind, colors};
use crate::layout::LayoutSnapshot;

/// Node fill opacity
const NODE_FILL_OPACITY: f64 = 0.85;
/// Node outline opacity
const NODE_STROKE_OPACITY: f64 = 0.3;
/// Node outline width in world units
const NODE_STROKE_WIDTH: f64 = 2.0;
/// Gap between a node circle and its label baseline, in world units
const LABEL_OFFSET: f64 = 14.0;
/// Label font size in world units
const LABEL_FONT_SIZE: f64 = 11.0;

/// A link segment
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub opacity: f64,
    pub dash: Option<&'static str>,
}

/// A node glyph
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub id: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: &'static str,
    pub fill_opacity: f64,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
}

/// A node label, anchored at its horizontal center
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_size: f64,
    pub font_weight: u16,
}

/// One legend entry
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub label: &'static str,
    pub color: &'static str,
}

/// Everything needed to draw one frame, in screen coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub lines: Vec<Line>,
    pub circles: Vec<Circle>,
    pub labels: Vec<Label>,
    pub legend: Vec<LegendItem>,
}

#[derive(Template)]
#[template(path = "market_map.svg", escape = "html")]
struct MarketMapSvg<'a> {
    scene: &'a Scene,
}

impl Scene {
    /// Compose a snapshot with a view transform
    pub fn build(snapshot: &LayoutSnapshot, view: &ViewTransform) -> Self {
        let scale = view.scale;

        let lines = snapshot
            .links
            .iter()
            .map(|link| {
                let (x1, y1) = view.to_screen(link.source_x, link.source_y);
                let (x2, y2) = view.to_screen(link.target_x, link.target_y);
                Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke: link.kind.color(),
                    stroke_width: link.weight.max(1.0) * scale,
                    opacity: colors::LINK_OPACITY,
                    dash: link.kind.dash_array(),
                }
            })
            .collect();

        let circles = snapshot
            .nodes
            .iter()
            .map(|node| {
                let (cx, cy) = view.to_screen(node.x, node.y);
                Circle {
                    id: node.id.clone(),
                    cx,
                    cy,
                    r: node.radius * scale,
                    fill: node.kind.color(),
                    fill_opacity: NODE_FILL_OPACITY,
                    stroke_width: NODE_STROKE_WIDTH * scale,
                    stroke_opacity: NODE_STROKE_OPACITY,
                }
            })
            .collect();

        let labels = snapshot
            .nodes
            .iter()
            .map(|node| {
                let (x, y) = view.to_screen(node.x, node.y + node.radius + LABEL_OFFSET);
                Label {
                    x,
                    y,
                    text: node.label.clone(),
                    font_size: LABEL_FONT_SIZE * scale,
                    font_weight: match node.kind {
                        NodeKind::Company => 600,
                        NodeKind::Investor | NodeKind::Category => 400,
                    },
                }
            })
            .collect();

        let legend = NodeKind::ALL
            .iter()
            .map(|kind| LegendItem {
                label: kind.label(),
                color: kind.color(),
            })
            .collect();

        Self {
            width: view.width,
            height: view.height,
            lines,
            circles,
            labels,
            legend,
        }
    }

    /// Render as a standalone SVG document
    pub fn to_svg(&self) -> askama::Result<String> {
        MarketMapSvg { scene: self }.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::graph::LinkKind;
    use crate::layout::{PositionedNode, ResolvedLink};

    fn snapshot() -> LayoutSnapshot {
        LayoutSnapshot {
            nodes: vec![
                PositionedNode {
                    id: "acme".to_string(),
                    label: "Acme & Sons".to_string(),
                    kind: NodeKind::Company,
                    radius: 20.0,
                    x: 100.0,
                    y: 100.0,
                },
                PositionedNode {
                    id: "vc".to_string(),
                    label: "<VC>".to_string(),
                    kind: NodeKind::Investor,
                    radius: 14.0,
                    x: 200.0,
                    y: 100.0,
                },
            ],
            links: vec![ResolvedLink {
                source: "vc".to_string(),
                target: "acme".to_string(),
                source_x: 200.0,
                source_y: 100.0,
                target_x: 100.0,
                target_y: 100.0,
                kind: LinkKind::Competitor,
                weight: 0.5,
            }],
        }
    }

    fn view() -> ViewTransform {
        ViewTransform::new(800.0, 600.0, ViewConfig::default())
    }

    #[test]
    fn identity_view_keeps_world_coordinates() {
        let scene = Scene::build(&snapshot(), &view());

        assert_eq!(scene.circles[0].cx, 100.0);
        assert_eq!(scene.circles[0].r, 20.0);
        assert_eq!(scene.lines[0].x1, 200.0);
        assert_eq!(scene.lines[0].stroke_width, 1.0);
        assert_eq!(scene.lines[0].dash, Some("4 3"));
        assert_eq!(scene.labels[0].y, 134.0);
        assert_eq!(scene.labels[0].font_weight, 600);
        assert_eq!(scene.labels[1].font_weight, 400);
    }

    #[test]
    fn zoom_scales_primitives() {
        let mut view = view();
        view.on_zoom(2.0, (0.0, 0.0));
        let scene = Scene::build(&snapshot(), &view);

        assert_eq!(scene.circles[1].cx, 400.0);
        assert_eq!(scene.circles[1].r, 28.0);
        assert_eq!(scene.circles[1].stroke_width, 4.0);
        assert_eq!(scene.labels[0].font_size, 22.0);
        assert_eq!(scene.lines[0].stroke_width, 2.0);
    }

    #[test]
    fn legend_lists_every_kind() {
        let scene = Scene::build(&LayoutSnapshot::empty(), &view());
        let labels: Vec<_> = scene.legend.iter().map(|item| item.label).collect();
        assert_eq!(labels, ["Company", "Investor", "Category"]);
        assert!(scene.circles.is_empty());
    }

    #[test]
    fn svg_contains_primitives() {
        let svg = Scene::build(&snapshot(), &view()).to_svg().unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="800""#));
        assert!(svg.contains(r##"fill="#3b82f6""##));
        assert!(svg.contains(r#"stroke-dasharray="4 3""#));
        assert_eq!(svg.matches("<circle").count(), 2 + 3);
        assert_eq!(svg.matches("<line").count(), 1);
    }

    #[test]
    fn svg_escapes_labels() {
        let svg = Scene::build(&snapshot(), &view()).to_svg().unwrap();

        assert!(svg.contains("Acme &amp; Sons"));
        assert!(svg.contains("&lt;VC&gt;"));
        assert!(!svg.contains("<VC>"));
    }
}
