//! Selections: a pair of bitsets over the vertex and edge id spaces.
//!
//! A [`Selection`] is the primary value type of the evaluator. Bit positions
//! are vertex and edge ids of one graph snapshot; the two dimensions are
//! fully independent. Combinators mutate the left operand in place, since an
//! evaluated subexpression's value is consumed at most once by its parent —
//! ownership moves into the result instead of cloning.

use std::fmt;

use roaring::RoaringBitmap;

use crate::graph::Id;
use crate::model::SelectionStore;

// ------------- IndexIter -------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookahead {
    /// The next position is computed and has not been handed out yet.
    Ready(Id),
    /// The next position has not been computed, or was already handed out.
    NotReady,
    /// The underlying set is exhausted.
    Done,
}

/// Lazy forward iterator over the set positions of a bitset.
///
/// Keeps a one-element lookahead so [`IndexIter::peek`] can test for a next
/// position without consuming it.
pub struct IndexIter<I> {
    inner: I,
    state: Lookahead,
}

impl<I: Iterator<Item = Id>> IndexIter<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            state: Lookahead::NotReady,
        }
    }

    /// The next set position, without advancing.
    pub fn peek(&mut self) -> Option<Id> {
        match self.state {
            Lookahead::Ready(id) => Some(id),
            Lookahead::Done => None,
            Lookahead::NotReady => {
                self.state = match self.inner.next() {
                    Some(id) => Lookahead::Ready(id),
                    None => Lookahead::Done,
                };
                self.peek()
            }
        }
    }
}

impl<I: Iterator<Item = Id>> Iterator for IndexIter<I> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        let next = self.peek();
        if next.is_some() {
            self.state = Lookahead::NotReady;
        }
        next
    }
}

// ------------- Selection -------------

/// A pair of bit-indexed sets identifying chosen vertices and chosen edges
/// of one graph snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    vertices: RoaringBitmap,
    edges: RoaringBitmap,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bits(vertices: RoaringBitmap, edges: RoaringBitmap) -> Self {
        Self { vertices, edges }
    }

    /// A selection of only vertices.
    pub fn of_vertices(ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            vertices: ids.into_iter().collect(),
            edges: RoaringBitmap::new(),
        }
    }

    /// A selection of only edges.
    pub fn of_edges(ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            vertices: RoaringBitmap::new(),
            edges: ids.into_iter().collect(),
        }
    }

    /// Snapshot of the live selection store.
    pub fn from_store(store: &SelectionStore) -> Self {
        Self {
            vertices: store.selected_vertices().collect(),
            edges: store.selected_edges().collect(),
        }
    }

    /// Selects every vertex and edge of the graph.
    pub fn from_graph(graph: &crate::graph::LineageGraph) -> Self {
        Self {
            vertices: graph.vertices().collect(),
            edges: graph.edges().collect(),
        }
    }

    /// Replaces the content of the store by this selection, as one atomic
    /// transition: notifications are suspended, the store cleared, the new
    /// vertex and edge sets applied in bulk, and notifications resumed, so
    /// observers see exactly one selection-changed event.
    pub fn write_to_store(&self, store: &mut SelectionStore) {
        let mut batch = store.begin_batch();
        batch.clear();
        batch.select_vertices(self.vertex_ids());
        batch.select_edges(self.edge_ids());
    }

    /// Bitwise OR of both dimensions, mutating self.
    pub fn union_with(&mut self, other: &Selection) {
        self.vertices |= &other.vertices;
        self.edges |= &other.edges;
    }

    /// Bitwise AND-NOT of both dimensions, mutating self.
    pub fn subtract(&mut self, other: &Selection) {
        self.vertices -= &other.vertices;
        self.edges -= &other.edges;
    }

    /// Bitwise AND of both dimensions, mutating self.
    pub fn intersect_with(&mut self, other: &Selection) {
        self.vertices &= &other.vertices;
        self.edges &= &other.edges;
    }

    /// Projects the selection onto edges only.
    pub fn clear_vertices(&mut self) {
        self.vertices.clear();
    }

    /// Projects the selection onto vertices only.
    pub fn clear_edges(&mut self) {
        self.edges.clear();
    }

    pub fn contains_vertex(&self, vertex: Id) -> bool {
        self.vertices.contains(vertex)
    }

    pub fn contains_edge(&self, edge: Id) -> bool {
        self.edges.contains(edge)
    }

    pub fn insert_vertex(&mut self, vertex: Id) {
        self.vertices.insert(vertex);
    }

    pub fn insert_edge(&mut self, edge: Id) {
        self.edges.insert(edge);
    }

    pub fn vertex_count(&self) -> u64 {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> u64 {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Iterates over the selected vertex ids in ascending order.
    pub fn vertex_ids(&self) -> IndexIter<roaring::bitmap::Iter<'_>> {
        IndexIter::new(self.vertices.iter())
    }

    /// Iterates over the selected edge ids in ascending order.
    pub fn edge_ids(&self) -> IndexIter<roaring::bitmap::Iter<'_>> {
        IndexIter::new(self.edges.iter())
    }

    pub fn vertex_bits(&self) -> &RoaringBitmap {
        &self.vertices
    }

    pub fn edge_bits(&self) -> &RoaringBitmap {
        &self.edges
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Selection( {}, {} )",
            self.vertices.len(),
            self.edges.len()
        )
    }
}
