//! The stateful graph wrapper: sync, drag, hit-testing.

use std::collections::BTreeSet;

use rand::Rng;
use rand::rngs::StdRng;

use cw_core::{Alliance, CastId};

use crate::forces::{EdgeKind, LayoutConfig, LayoutEdge, LayoutNode, step};

/// A live layout of the season's social graph.
///
/// Owns the node cache and edge list. `sync` rebuilds both from season
/// data while preserving position and velocity for ids that persist, so
/// an update never makes the picture jump; new nodes appear near canvas
/// center with a little seeded jitter.
#[derive(Debug, Clone)]
pub struct AllianceGraph {
    config: LayoutConfig,
    nodes: Vec<LayoutNode>,
    edges: Vec<LayoutEdge>,
}

impl AllianceGraph {
    /// Create an empty graph.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// The layout configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Current nodes.
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    /// Current edges.
    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    /// Look up a node by cast member.
    pub fn node(&self, id: &CastId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    /// Rebuild nodes and edges from season data.
    ///
    /// Positions and velocities carry over for surviving ids; `rng` only
    /// places newcomers.
    pub fn sync(
        &mut self,
        cast_ids: &[CastId],
        alliances: &[Alliance],
        rivalries: &[(CastId, CastId)],
        eliminated: &BTreeSet<CastId>,
        rng: &mut StdRng,
    ) {
        let cx = self.config.width / 2.0;
        let cy = self.config.height / 2.0;

        let old = std::mem::take(&mut self.nodes);
        for id in cast_ids {
            let mut node = match old.iter().find(|n| n.id == *id) {
                Some(existing) => existing.clone(),
                None => {
                    let jx = rng.random::<f32>() * 40.0 - 20.0;
                    let jy = rng.random::<f32>() * 40.0 - 20.0;
                    LayoutNode::new(id.clone(), cx + jx, cy + jy)
                }
            };
            node.eliminated = eliminated.contains(id);
            self.nodes.push(node);
        }

        self.edges.clear();
        let index_of =
            |id: &CastId| -> Option<usize> { self.nodes.iter().position(|n| n.id == *id) };

        // One alliance edge per member pair, deduplicated across alliances.
        let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();
        for alliance in alliances {
            for (a, b) in alliance.member_pairs() {
                let (Some(ia), Some(ib)) = (index_of(&a), index_of(&b)) else {
                    continue;
                };
                let key = if ia < ib { (ia, ib) } else { (ib, ia) };
                if seen.insert(key) {
                    self.edges.push(LayoutEdge {
                        a: key.0,
                        b: key.1,
                        kind: EdgeKind::Alliance {
                            strength: alliance.strength,
                        },
                    });
                }
            }
        }

        // Rivalry edges, likewise deduplicated.
        let mut rival_seen: BTreeSet<(usize, usize)> = BTreeSet::new();
        for (a, b) in rivalries {
            let (Some(ia), Some(ib)) = (index_of(a), index_of(b)) else {
                continue;
            };
            if ia == ib {
                continue;
            }
            let key = if ia < ib { (ia, ib) } else { (ib, ia) };
            if rival_seen.insert(key) && !seen.contains(&key) {
                self.edges.push(LayoutEdge {
                    a: key.0,
                    b: key.1,
                    kind: EdgeKind::Rivalry,
                });
            }
        }
    }

    /// Advance the physics by one tick.
    pub fn step(&mut self) {
        step(&mut self.nodes, &self.edges, &self.config);
    }

    /// Begin dragging a node. Returns whether the id was found.
    pub fn begin_drag(&mut self, id: &CastId) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == *id) {
            Some(node) => {
                node.dragged = true;
                node.vx = 0.0;
                node.vy = 0.0;
                true
            }
            None => false,
        }
    }

    /// Move a dragged node to pointer coordinates (clamped to canvas).
    pub fn drag_to(&mut self, id: &CastId, x: f32, y: f32) {
        let min = self.config.node_radius;
        let max_x = (self.config.width - min).max(min);
        let max_y = (self.config.height - min).max(min);
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == *id && n.dragged) {
            node.x = x.clamp(min, max_x);
            node.y = y.clamp(min, max_y);
        }
    }

    /// Release a dragged node back to the simulation.
    pub fn end_drag(&mut self, id: &CastId) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == *id) {
            node.dragged = false;
        }
    }

    /// The topmost node under a point, for click selection.
    pub fn node_at(&self, x: f32, y: f32) -> Option<&CastId> {
        let r_sq = self.config.node_radius * self.config.node_radius;
        self.nodes
            .iter()
            .rev()
            .find(|n| {
                let dx = n.x - x;
                let dy = n.y - y;
                dx * dx + dy * dy <= r_sq
            })
            .map(|n| &n.id)
    }
}
