//! Force-directed alliance graph layout.
//!
//! Lays out one node per cast member (active or eliminated) and one edge
//! per alliance pair or rivalry pair. The physics is a pure
//! [`forces::step`] function a host calls once per animation frame — the
//! simulation math carries no scheduling, so it is unit-testable without a
//! display, and stopping the host loop stops everything. [`AllianceGraph`]
//! wraps it with data-preserving re-sync and drag override.
//!
//! This is a live, interactive layout, not a one-shot solver: the host
//! keeps stepping it every frame regardless of convergence. Drag
//! overrides live only in the graph's own node cache and are never
//! written back into season state.

/// The pure force pass.
pub mod forces;
/// The stateful graph wrapper: sync, drag, hit-testing.
pub mod graph;

/// Re-export the force pass and its types.
pub use forces::{EdgeKind, LayoutConfig, LayoutEdge, LayoutNode, step};
/// Re-export the graph wrapper.
pub use graph::AllianceGraph;
