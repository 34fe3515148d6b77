//! CPU force simulation for market map layout
//!
//! Positions every node by iterating four forces over a fixed number of ticks:
//! link springs, inverse-square many-body repulsion, a centering pull on the
//! node centroid, and a positional collision correction. The working node
//! buffer is owned by one `ForceSimulation` value for the duration of a run;
//! the result is handed off as an immutable `LayoutSnapshot`.

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::graph::{self, GraphNode, LinkKind, MarketGraphData, ValidationReport};
use crate::layout::{LayoutSnapshot, PositionedNode, ResolvedLink};

/// Below this length two points are treated as coincident
const COINCIDENT_EPSILON: f64 = 1e-9;

/// Length of the deterministic offset used to separate coincident nodes
const JITTER_LENGTH: f64 = 1e-3;

/// Overlap smaller than this is not corrected again
const COLLISION_TOLERANCE: f64 = 1e-6;

/// Cap on relaxation passes when enforcing the final no-overlap guarantee
const MAX_RESOLVE_PASSES: usize = 2_000;

/// A node with position and velocity for simulation
#[derive(Debug, Clone)]
pub struct SimNode {
    pub id: String,
    pub label: String,
    pub kind: graph::NodeKind,
    /// Collision radius
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl SimNode {
    fn from_graph_node(node: &GraphNode, x: f64, y: f64) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            kind: node.kind,
            radius: node.radius(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

/// A link for simulation (indices into node array)
#[derive(Debug, Clone)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    pub kind: LinkKind,
    pub weight: f64,
    /// Spring strength after weight and degree scaling
    strength: f64,
}

/// Counters describing one completed run
#[derive(Debug, Clone, Default)]
pub struct LayoutStats {
    pub ticks_run: usize,
    pub dropped_links: usize,
    pub duplicate_nodes: usize,
    /// Times a non-finite position or velocity was reset
    pub nan_resets: usize,
    pub elapsed: Duration,
}

/// CPU force simulation
pub struct ForceSimulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    config: LayoutConfig,
    width: f64,
    height: f64,
    report: ValidationReport,
    /// Positions at the start of the current tick, the fallback for blow-ups
    previous: Vec<(f64, f64)>,
    nan_resets: usize,
    ticks_run: usize,
}

impl ForceSimulation {
    /// Create a simulation from graph data
    ///
    /// Dangling links and duplicate nodes are dropped here. Nodes are placed
    /// pseudo-randomly inside `[0, width] x [0, height]` from `config.seed`.
    pub fn new(data: &MarketGraphData, width: f64, height: f64, mut config: LayoutConfig) -> Self {
        let validated = graph::validate(data);
        let padding = config.collision_padding;
        let padding_ok = padding.is_finite() && padding >= 0.0;
        if !padding_ok {
            warn!(padding, "invalid collision padding, using 0");
            config.collision_padding = 0.0;
        }
        let width = sanitize_extent(width);
        let height = sanitize_extent(height);

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let nodes: Vec<SimNode> = validated
            .nodes
            .iter()
            .map(|node| {
                let x = rng.r#gen::<f64>() * width;
                let y = rng.r#gen::<f64>() * height;
                SimNode::from_graph_node(node, x, y)
            })
            .collect();

        let mut degree = vec![0usize; nodes.len()];
        for link in &validated.links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }

        let links = validated
            .links
            .iter()
            .map(|link| {
                let shared = degree[link.source].min(degree[link.target]).max(1) as f64;
                SimLink {
                    source: link.source,
                    target: link.target,
                    kind: link.kind,
                    weight: link.weight,
                    strength: (config.link_stiffness * link.weight / shared).min(1.0),
                }
            })
            .collect();

        Self {
            previous: Vec::with_capacity(nodes.len()),
            nodes,
            links,
            config,
            width,
            height,
            report: validated.report,
            nan_resets: 0,
            ticks_run: 0,
        }
    }

    /// Nodes in their current state
    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    /// Links that survived validation
    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    /// Sum of squared node speeds
    pub fn kinetic_energy(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.vx * n.vx + n.vy * n.vy)
            .sum()
    }

    /// Run one simulation tick
    pub fn tick(&mut self) {
        if self.nodes.is_empty() {
            return;
        }

        self.previous.clear();
        self.previous
            .extend(self.nodes.iter().map(|node| (node.x, node.y)));

        self.apply_link_force();
        self.apply_many_body_force();
        self.apply_center_force();
        self.integrate();

        for _ in 0..self.config.collision_iterations {
            if !self.relax_collisions() {
                break;
            }
        }

        self.restore_non_finite();
        self.ticks_run += 1;
    }

    /// Spring force between linked nodes, split evenly between the endpoints
    fn apply_link_force(&mut self) {
        let rest = self.config.link_rest_length;

        for link in &self.links {
            let (s, t) = (link.source, link.target);
            if s == t {
                continue;
            }

            let mut dx = self.nodes[t].x - self.nodes[s].x;
            let mut dy = self.nodes[t].y - self.nodes[s].y;
            let mut dist = dx.hypot(dy);
            if dist < COINCIDENT_EPSILON {
                let (jx, jy) = jitter(s, t);
                dx = jx * JITTER_LENGTH;
                dy = jy * JITTER_LENGTH;
                dist = JITTER_LENGTH;
            }

            // Hooke's law, positive when stretched
            let shift = (dist - rest) / dist * link.strength * 0.5;
            let fx = dx * shift;
            let fy = dy * shift;

            self.nodes[s].vx += fx;
            self.nodes[s].vy += fy;
            self.nodes[t].vx -= fx;
            self.nodes[t].vy -= fy;
        }
    }

    /// Repulsion between all node pairs
    fn apply_many_body_force(&mut self) {
        let charge = self.config.charge_strength;
        let min_dist_sq = self.config.distance_min * self.config.distance_min;
        let n = self.nodes.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let mut dx = self.nodes[j].x - self.nodes[i].x;
                let mut dy = self.nodes[j].y - self.nodes[i].y;
                let mut dist_sq = dx * dx + dy * dy;
                if dist_sq < COINCIDENT_EPSILON * COINCIDENT_EPSILON {
                    let (jx, jy) = jitter(i, j);
                    dx = jx * JITTER_LENGTH;
                    dy = jy * JITTER_LENGTH;
                    dist_sq = JITTER_LENGTH * JITTER_LENGTH;
                }
                let dist = dist_sq.sqrt();

                // Coulomb's law: F = k / r^2, with r floored
                let force = charge / dist_sq.max(min_dist_sq);
                let fx = force * dx / dist;
                let fy = force * dy / dist;

                self.nodes[i].vx += fx;
                self.nodes[i].vy += fy;
                self.nodes[j].vx -= fx;
                self.nodes[j].vy -= fy;
            }
        }
    }

    /// Pull the node centroid toward the canvas center
    fn apply_center_force(&mut self) {
        let n = self.nodes.len() as f64;
        let (sx, sy) = self
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));

        let ox = (self.width / 2.0 - sx / n) * self.config.center_strength;
        let oy = (self.height / 2.0 - sy / n) * self.config.center_strength;

        for node in &mut self.nodes {
            node.vx += ox;
            node.vy += oy;
        }
    }

    /// Apply velocity decay and the speed cap, then move
    fn integrate(&mut self) {
        let decay = self.config.velocity_decay;
        let max_speed = self.config.max_velocity;

        for node in &mut self.nodes {
            node.vx *= decay;
            node.vy *= decay;

            let speed = node.vx.hypot(node.vy);
            if !speed.is_finite() {
                node.vx = 0.0;
                node.vy = 0.0;
                self.nan_resets += 1;
            } else if speed > max_speed {
                node.vx *= max_speed / speed;
                node.vy *= max_speed / speed;
            }

            node.x += node.vx;
            node.y += node.vy;
        }
    }

    /// One pass of pairwise overlap correction
    ///
    /// Returns true if any pair overlapped.
    fn relax_collisions(&mut self) -> bool {
        let padding = self.config.collision_padding;
        let n = self.nodes.len();
        let mut any_overlap = false;

        for i in 0..n {
            for j in (i + 1)..n {
                let min_dist = self.nodes[i].radius + self.nodes[j].radius + padding;
                if !min_dist.is_finite() {
                    continue;
                }
                let dx = self.nodes[j].x - self.nodes[i].x;
                let dy = self.nodes[j].y - self.nodes[i].y;
                let dist = dx.hypot(dy);
                let overlapping = dist < min_dist - COLLISION_TOLERANCE;
                if !overlapping {
                    continue;
                }
                any_overlap = true;

                let (ux, uy) = if dist > COINCIDENT_EPSILON {
                    (dx / dist, dy / dist)
                } else {
                    jitter(i, j)
                };
                let push = (min_dist - dist) / 2.0;

                self.nodes[i].x -= ux * push;
                self.nodes[i].y -= uy * push;
                self.nodes[j].x += ux * push;
                self.nodes[j].y += uy * push;
            }
        }

        any_overlap
    }

    /// Relax until no pair overlaps
    ///
    /// Returns false if the pass cap was hit first.
    pub fn resolve_collisions(&mut self) -> bool {
        for _ in 0..MAX_RESOLVE_PASSES {
            if !self.relax_collisions() {
                return true;
            }
        }
        warn!(
            passes = MAX_RESOLVE_PASSES,
            "collision resolution did not settle"
        );
        false
    }

    /// Put any node with a non-finite coordinate back where the tick started
    fn restore_non_finite(&mut self) {
        for (node, &(px, py)) in self.nodes.iter_mut().zip(&self.previous) {
            if node.x.is_finite() && node.y.is_finite() {
                continue;
            }
            node.x = px;
            node.y = py;
            node.vx = 0.0;
            node.vy = 0.0;
            self.nan_resets += 1;
        }
    }

    /// Run every tick, enforce the no-overlap guarantee and hand off the result
    pub fn run(mut self) -> (LayoutSnapshot, LayoutStats) {
        let started = Instant::now();
        let budget = self.config.time_budget_ms.map(Duration::from_millis);

        if !self.nodes.is_empty() {
            for _ in 0..self.config.tick_count {
                self.tick();
                if budget.is_some_and(|budget| started.elapsed() >= budget) {
                    warn!(
                        ticks = self.ticks_run,
                        "layout time budget exceeded, using last completed tick"
                    );
                    break;
                }
            }
            self.previous.clear();
            self.previous
                .extend(self.nodes.iter().map(|node| (node.x, node.y)));
            self.resolve_collisions();
            self.restore_non_finite();
        }

        if self.nan_resets > 0 {
            warn!(
                resets = self.nan_resets,
                "non-finite positions were reset; check chargeStrength and linkStiffness"
            );
        }

        let stats = LayoutStats {
            ticks_run: self.ticks_run,
            dropped_links: self.report.dropped_links,
            duplicate_nodes: self.report.duplicate_nodes,
            nan_resets: self.nan_resets,
            elapsed: started.elapsed(),
        };
        debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            ticks = stats.ticks_run,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "layout complete"
        );

        (self.snapshot(), stats)
    }

    /// Current positions as a snapshot
    pub fn snapshot(&self) -> LayoutSnapshot {
        let nodes = self
            .nodes
            .iter()
            .map(|node| PositionedNode {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind,
                radius: node.radius,
                x: node.x,
                y: node.y,
            })
            .collect();

        let links = self
            .links
            .iter()
            .map(|link| {
                let source = &self.nodes[link.source];
                let target = &self.nodes[link.target];
                ResolvedLink {
                    source: source.id.clone(),
                    target: target.id.clone(),
                    source_x: source.x,
                    source_y: source.y,
                    target_x: target.x,
                    target_y: target.y,
                    kind: link.kind,
                    weight: link.weight,
                }
            })
            .collect();

        LayoutSnapshot { nodes, links }
    }
}

/// Lay out a market graph inside a `width` x `height` viewport
///
/// Never fails: an empty graph yields an empty snapshot without running any
/// ticks, and degenerate input degrades to a usable layout.
pub fn compute_layout(
    data: &MarketGraphData,
    width: f64,
    height: f64,
    config: &LayoutConfig,
) -> LayoutSnapshot {
    ForceSimulation::new(data, width, height, config.clone())
        .run()
        .0
}

/// Deterministic unit direction for separating a coincident pair
fn jitter(a: usize, b: usize) -> (f64, f64) {
    let angle = ((a as f64) * 0.618_034 + (b as f64) * 0.414_214 + 0.37) * TAU;
    (angle.cos(), angle.sin())
}

/// Viewport extent, clamped to at least one unit
pub(crate) fn sanitize_extent(extent: f64) -> f64 {
    if extent.is_finite() && extent >= 1.0 {
        extent
    } else {
        1.0
    }
}
