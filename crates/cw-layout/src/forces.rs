//! The pure force pass.

use serde::{Deserialize, Serialize};

use cw_core::CastId;

/// Tuning constants and canvas geometry for the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Canvas width.
    pub width: f32,
    /// Canvas height.
    pub height: f32,
    /// Node radius; positions are clamped this far inside the canvas.
    pub node_radius: f32,
    /// Spring stiffness for alliance edges.
    pub spring_stiffness: f32,
    /// Separation an alliance spring relaxes toward.
    pub target_separation: f32,
    /// Pairwise repulsion constant.
    pub repulsion: f32,
    /// Rivalry pairs repel this many times harder.
    pub rivalry_multiplier: f32,
    /// Pull toward canvas center.
    pub centering: f32,
    /// Velocity retained per tick.
    pub damping: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            node_radius: 24.0,
            spring_stiffness: 0.02,
            target_separation: 120.0,
            repulsion: 3000.0,
            rivalry_multiplier: 3.0,
            centering: 0.0005,
            damping: 0.9,
        }
    }
}

impl LayoutConfig {
    /// Set the canvas dimensions.
    pub fn with_canvas(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the node radius.
    pub fn with_node_radius(mut self, radius: f32) -> Self {
        self.node_radius = radius;
        self
    }
}

/// One cast member's point mass in the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Which cast member this node renders.
    pub id: CastId,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// X velocity.
    pub vx: f32,
    /// Y velocity.
    pub vy: f32,
    /// Whether the member has been voted out (rendering hint only).
    pub eliminated: bool,
    /// Whether the user is dragging this node; the simulation leaves a
    /// dragged node exactly where the pointer put it.
    pub dragged: bool,
}

impl LayoutNode {
    /// Create a node at a position, at rest.
    pub fn new(id: CastId, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            eliminated: false,
            dragged: false,
        }
    }
}

/// What an edge between two nodes means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Members of the same alliance; a spring pulls them together.
    Alliance {
        /// The alliance's strength, scaling the spring.
        strength: f32,
    },
    /// Declared rivals; they repel harder than strangers.
    Rivalry,
}

/// An edge between two nodes, by index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    /// Index of one endpoint.
    pub a: usize,
    /// Index of the other endpoint.
    pub b: usize,
    /// What the edge means.
    pub kind: EdgeKind,
}

/// Advance the simulation by one tick.
///
/// Applies alliance springs, pairwise inverse-square repulsion (scaled up
/// for rivalry pairs), gentle centering, damping, then integrates and
/// clamps positions to the canvas minus the node radius. Dragged nodes
/// keep zero velocity and their pointer-set position.
pub fn step(nodes: &mut [LayoutNode], edges: &[LayoutEdge], config: &LayoutConfig) {
    if nodes.is_empty() {
        return;
    }

    // Alliance springs toward the target separation.
    for edge in edges {
        let EdgeKind::Alliance { strength } = edge.kind else {
            continue;
        };
        if edge.a >= nodes.len() || edge.b >= nodes.len() || edge.a == edge.b {
            continue;
        }
        let dx = nodes[edge.b].x - nodes[edge.a].x;
        let dy = nodes[edge.b].y - nodes[edge.a].y;
        let dist = (dx * dx + dy * dy).sqrt().max(1.0);
        let stretch = dist - config.target_separation;
        let scale = config.spring_stiffness * (0.5 + 0.5 * strength);
        let fx = dx / dist * stretch * scale;
        let fy = dy / dist * stretch * scale;
        nodes[edge.a].vx += fx;
        nodes[edge.a].vy += fy;
        nodes[edge.b].vx -= fx;
        nodes[edge.b].vy -= fy;
    }

    // Rivalry pairs repel harder; collect them for the pass below.
    let rival_pairs: Vec<(usize, usize)> = edges
        .iter()
        .filter(|e| matches!(e.kind, EdgeKind::Rivalry))
        .map(|e| if e.a < e.b { (e.a, e.b) } else { (e.b, e.a) })
        .collect();

    // Pairwise repulsion.
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let dx = nodes[i].x - nodes[j].x;
            let dy = nodes[i].y - nodes[j].y;
            let dist_sq = dx * dx + dy * dy + 1.0;
            let mut force = config.repulsion / dist_sq;
            if rival_pairs.contains(&(i, j)) {
                force *= config.rivalry_multiplier;
            }
            let dist = dist_sq.sqrt();
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            nodes[i].vx += fx;
            nodes[i].vy += fy;
            nodes[j].vx -= fx;
            nodes[j].vy -= fy;
        }
    }

    // Centering, damping, integration, clamping.
    let cx = config.width / 2.0;
    let cy = config.height / 2.0;
    let min_x = config.node_radius;
    let max_x = (config.width - config.node_radius).max(min_x);
    let min_y = config.node_radius;
    let max_y = (config.height - config.node_radius).max(min_y);
    for node in nodes.iter_mut() {
        if node.dragged {
            node.vx = 0.0;
            node.vy = 0.0;
            continue;
        }
        node.vx += (cx - node.x) * config.centering;
        node.vy += (cy - node.y) * config.centering;
        node.vx *= config.damping;
        node.vy *= config.damping;
        node.x = (node.x + node.vx).clamp(min_x, max_x);
        node.y = (node.y + node.vy).clamp(min_y, max_y);
    }
}
