//! Morphing: structural transformations from one selection to another.
//!
//! A morph walks the graph around the source selection: adjacency steps
//! (incident edges of selected vertices, endpoints of selected edges),
//! projections onto one object kind, and `wholeTrack`, which discovers the
//! complete undirected connected components touched by the selection.
//!
//! When several operations are supplied, each one is applied independently
//! to the *same* source selection and the results are unioned. Requesting
//! both `sourceVertex` and `targetVertex` on an edge selection therefore
//! yields both endpoints; the operations are never chained sequentially.

use roaring::RoaringBitmap;
use tracing::debug;

use crate::graph::{Id, LineageGraph};
use crate::selection::Selection;

/// The available morphing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    /// Keep the vertices of the source selection, drop its edges.
    ToVertex,
    /// Keep the edges of the source selection, drop its vertices.
    ToEdge,
    /// The incoming edges of the selected vertices.
    IncomingEdges,
    /// The outgoing edges of the selected vertices.
    OutgoingEdges,
    /// The source vertices of the selected edges.
    SourceVertex,
    /// The target vertices of the selected edges.
    TargetVertex,
    /// Every vertex and edge connected, ignoring direction, to the
    /// selection.
    WholeTrack,
}

impl MorphOp {
    pub const ALL: [MorphOp; 7] = [
        MorphOp::ToVertex,
        MorphOp::ToEdge,
        MorphOp::IncomingEdges,
        MorphOp::OutgoingEdges,
        MorphOp::SourceVertex,
        MorphOp::TargetVertex,
        MorphOp::WholeTrack,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MorphOp::ToVertex => "toVertex",
            MorphOp::ToEdge => "toEdge",
            MorphOp::IncomingEdges => "incomingEdges",
            MorphOp::OutgoingEdges => "outgoingEdges",
            MorphOp::SourceVertex => "sourceVertex",
            MorphOp::TargetVertex => "targetVertex",
            MorphOp::WholeTrack => "wholeTrack",
        }
    }

    /// Looks a switch up by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<MorphOp> {
        MorphOp::ALL
            .into_iter()
            .find(|op| op.label().eq_ignore_ascii_case(name))
    }
}

/// Applies morphing operations against one graph snapshot.
pub struct Morpher<'a> {
    graph: &'a LineageGraph,
}

impl<'a> Morpher<'a> {
    pub fn new(graph: &'a LineageGraph) -> Self {
        Self { graph }
    }

    /// The union of every operation applied independently to `selection`.
    /// An empty operation list is the identity.
    pub fn morph(&self, selection: &Selection, ops: &[MorphOp]) -> Selection {
        if ops.is_empty() {
            return selection.clone();
        }
        let mut result = Selection::new();
        for op in ops {
            let piece = self.apply(*op, selection);
            debug!(op = op.label(), %piece, "morph step");
            result.union_with(&piece);
        }
        result
    }

    fn apply(&self, op: MorphOp, selection: &Selection) -> Selection {
        match op {
            MorphOp::ToVertex => self.to_vertex(selection),
            MorphOp::ToEdge => self.to_edge(selection),
            MorphOp::IncomingEdges => self.incoming_edges(selection),
            MorphOp::OutgoingEdges => self.outgoing_edges(selection),
            MorphOp::SourceVertex => self.source_vertex(selection),
            MorphOp::TargetVertex => self.target_vertex(selection),
            MorphOp::WholeTrack => self.whole_track(selection),
        }
    }

    /// The vertices of the source selection, and no edges.
    pub fn to_vertex(&self, selection: &Selection) -> Selection {
        let mut copy = selection.clone();
        copy.clear_edges();
        copy
    }

    /// The edges of the source selection, and no vertices.
    pub fn to_edge(&self, selection: &Selection) -> Selection {
        let mut copy = selection.clone();
        copy.clear_vertices();
        copy
    }

    /// The incoming edges of the selected vertices, and no vertices.
    pub fn incoming_edges(&self, selection: &Selection) -> Selection {
        let mut edges = RoaringBitmap::new();
        for v in selection.vertex_ids() {
            for e in self.graph.incoming_edges(v) {
                edges.insert(*e);
            }
        }
        Selection::from_bits(RoaringBitmap::new(), edges)
    }

    /// The outgoing edges of the selected vertices, and no vertices.
    pub fn outgoing_edges(&self, selection: &Selection) -> Selection {
        let mut edges = RoaringBitmap::new();
        for v in selection.vertex_ids() {
            for e in self.graph.outgoing_edges(v) {
                edges.insert(*e);
            }
        }
        Selection::from_bits(RoaringBitmap::new(), edges)
    }

    /// The source vertices of the selected edges, and no edges.
    pub fn source_vertex(&self, selection: &Selection) -> Selection {
        let mut vertices = RoaringBitmap::new();
        for e in selection.edge_ids() {
            if let Some(v) = self.graph.source(e) {
                vertices.insert(v);
            }
        }
        Selection::from_bits(vertices, RoaringBitmap::new())
    }

    /// The target vertices of the selected edges, and no edges.
    pub fn target_vertex(&self, selection: &Selection) -> Selection {
        let mut vertices = RoaringBitmap::new();
        for e in selection.edge_ids() {
            if let Some(v) = self.graph.target(e) {
                vertices.insert(v);
            }
        }
        Selection::from_bits(vertices, RoaringBitmap::new())
    }

    /// Every vertex and edge reachable, ignoring edge direction, from any
    /// vertex that is selected or is an endpoint of a selected edge.
    ///
    /// One traversal only covers one connected component, so the work-sets
    /// are re-seeded until every component touched by the source selection
    /// has been walked.
    pub fn whole_track(&self, selection: &Selection) -> Selection {
        let mut todo_vertices = selection.vertex_bits().clone();
        let mut todo_edges = selection.edge_bits().clone();
        let mut vertices = RoaringBitmap::new();
        let mut edges = RoaringBitmap::new();

        loop {
            let seed = if let Some(v) = todo_vertices.min() {
                todo_vertices.remove(v);
                v
            } else if let Some(e) = todo_edges.min() {
                todo_edges.remove(e);
                match self.graph.source(e) {
                    Some(v) => v,
                    // Stale edge id, nothing to walk from.
                    None => continue,
                }
            } else {
                break;
            };
            if vertices.contains(seed) || !self.graph.contains_vertex(seed) {
                continue;
            }
            self.undirected_dfs(seed, &mut vertices, &mut edges, &mut todo_vertices, &mut todo_edges);
        }

        Selection::from_bits(vertices, edges)
    }

    /// One undirected depth-first traversal, recording everything visited
    /// and pruning the work-sets.
    fn undirected_dfs(
        &self,
        seed: Id,
        vertices: &mut RoaringBitmap,
        edges: &mut RoaringBitmap,
        todo_vertices: &mut RoaringBitmap,
        todo_edges: &mut RoaringBitmap,
    ) {
        let mut stack = vec![seed];
        while let Some(v) = stack.pop() {
            if !vertices.insert(v) {
                continue;
            }
            todo_vertices.remove(v);
            for e in self.graph.incoming_edges(v) {
                edges.insert(*e);
                todo_edges.remove(*e);
                if let Some(source) = self.graph.source(*e) {
                    if !vertices.contains(source) {
                        stack.push(source);
                    }
                }
            }
            for e in self.graph.outgoing_edges(v) {
                edges.insert(*e);
                todo_edges.remove(*e);
                if let Some(target) = self.graph.target(*e) {
                    if !vertices.contains(target) {
                        stack.push(target);
                    }
                }
            }
        }
    }
}
