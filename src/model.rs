//! Collaborator stores the evaluator reads: features, tag-sets and the live
//! selection.
//!
//! Features are named scalar projections over spots or links, computed
//! elsewhere ahead of evaluation and possibly only partially defined. A
//! tag-set is a named collection of mutually exclusive tags; each graph
//! object carries at most one tag per tag-set. The selection store holds the
//! current selection of the live graph and is the only mutable collaborator:
//! the evaluator snapshots it to resolve the ambient `selection` variables
//! and, on success, replaces its contents in one batch.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::graph::{Id, IdHasher};

// ------------- Features -------------

/// The object kind a feature or predicate is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Vertices,
    Edges,
}

impl Target {
    /// How the object kind is called in user-facing messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Target::Vertices => "vertices",
            Target::Edges => "edges",
        }
    }
}

/// One scalar projection of a feature. Objects without an entry are
/// undefined for the projection, which is not the same as holding `NaN`.
#[derive(Debug, Default)]
pub struct Projection {
    values: HashMap<Id, f64, IdHasher>,
}

impl Projection {
    pub fn set(&mut self, id: Id, value: f64) {
        self.values.insert(id, value);
    }
    pub fn is_defined(&self, id: Id) -> bool {
        self.values.contains_key(&id)
    }
    pub fn value(&self, id: Id) -> Option<f64> {
        self.values.get(&id).copied()
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named feature over one object kind, holding one or more projections.
/// Scalar features have a single projection whose key equals the feature key.
#[derive(Debug)]
pub struct Feature {
    key: String,
    target: Target,
    projections: HashMap<String, Projection>,
}

impl Feature {
    pub fn new(key: &str, target: Target) -> Self {
        Self {
            key: key.to_owned(),
            target,
            projections: HashMap::new(),
        }
    }
    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn target(&self) -> Target {
        self.target
    }
    /// The projection under `key`, created empty when absent.
    pub fn projection_mut(&mut self, key: &str) -> &mut Projection {
        self.projections.entry(key.to_owned()).or_default()
    }
    pub fn projection(&self, key: &str) -> Option<&Projection> {
        self.projections.get(key)
    }
    /// Writes a value into the scalar projection (the one named after the
    /// feature itself).
    pub fn set_scalar(&mut self, id: Id, value: f64) {
        let key = self.key.clone();
        self.projection_mut(&key).set(id, value);
    }
}

/// Lookup of features by key.
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: HashMap<String, Feature>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }
    /// Declares a feature, returning the existing one when the key is
    /// already taken.
    pub fn declare(&mut self, key: &str, target: Target) -> &mut Feature {
        match self.features.entry(key.to_owned()) {
            Entry::Vacant(e) => e.insert(Feature::new(key, target)),
            Entry::Occupied(e) => e.into_mut(),
        }
    }
    pub fn feature(&self, key: &str) -> Option<&Feature> {
        self.features.get(key)
    }
    pub fn len(&self) -> usize {
        self.features.len()
    }
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

// ------------- Tag-sets -------------

/// Index of a tag within its tag-set.
pub type TagIndex = usize;

/// A named set of mutually exclusive tags with per-object assignments.
///
/// The reverse index (tag to tagged objects) is an optional capability:
/// it only exists after [`TagSet::build_reverse_index`] and callers must
/// fall back to a full scan when it is absent.
#[derive(Debug)]
pub struct TagSet {
    name: String,
    tags: Vec<String>,
    vertex_tags: HashMap<Id, TagIndex, IdHasher>,
    edge_tags: HashMap<Id, TagIndex, IdHasher>,
    tagged_vertices: Option<Vec<Vec<Id>>>,
    tagged_edges: Option<Vec<Vec<Id>>>,
}

impl TagSet {
    pub fn new(name: &str, tags: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            vertex_tags: HashMap::default(),
            edge_tags: HashMap::default(),
            tagged_vertices: None,
            tagged_edges: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tag_index(&self, label: &str) -> Option<TagIndex> {
        self.tags.iter().position(|t| t == label)
    }

    /// Assigns a tag to a vertex, replacing any previous assignment in this
    /// tag-set. Returns false when the label is unknown.
    pub fn tag_vertex(&mut self, vertex: Id, label: &str) -> bool {
        let Some(tag) = self.tag_index(label) else {
            return false;
        };
        let previous = self.vertex_tags.insert(vertex, tag);
        if let Some(index) = self.tagged_vertices.as_mut() {
            if let Some(old) = previous {
                index[old].retain(|v| *v != vertex);
            }
            index[tag].push(vertex);
        }
        true
    }

    /// Assigns a tag to an edge, replacing any previous assignment in this
    /// tag-set. Returns false when the label is unknown.
    pub fn tag_edge(&mut self, edge: Id, label: &str) -> bool {
        let Some(tag) = self.tag_index(label) else {
            return false;
        };
        let previous = self.edge_tags.insert(edge, tag);
        if let Some(index) = self.tagged_edges.as_mut() {
            if let Some(old) = previous {
                index[old].retain(|e| *e != edge);
            }
            index[tag].push(edge);
        }
        true
    }

    pub fn vertex_tag(&self, vertex: Id) -> Option<TagIndex> {
        self.vertex_tags.get(&vertex).copied()
    }

    pub fn edge_tag(&self, edge: Id) -> Option<TagIndex> {
        self.edge_tags.get(&edge).copied()
    }

    /// Builds the tag-to-objects reverse index from the current
    /// assignments, enabling the O(k) path of equality predicates.
    pub fn build_reverse_index(&mut self) {
        let mut vertices = vec![Vec::new(); self.tags.len()];
        for (v, tag) in &self.vertex_tags {
            vertices[*tag].push(*v);
        }
        let mut edges = vec![Vec::new(); self.tags.len()];
        for (e, tag) in &self.edge_tags {
            edges[*tag].push(*e);
        }
        self.tagged_vertices = Some(vertices);
        self.tagged_edges = Some(edges);
    }

    /// Vertices carrying `tag`, or `None` when the reverse index has not
    /// been built.
    pub fn vertices_tagged_with(&self, tag: TagIndex) -> Option<&[Id]> {
        self.tagged_vertices
            .as_ref()
            .and_then(|index| index.get(tag))
            .map(Vec::as_slice)
    }

    /// Edges carrying `tag`, or `None` when the reverse index has not been
    /// built.
    pub fn edges_tagged_with(&self, tag: TagIndex) -> Option<&[Id]> {
        self.tagged_edges
            .as_ref()
            .and_then(|index| index.get(tag))
            .map(Vec::as_slice)
    }
}

/// Lookup of tag-sets by name.
#[derive(Debug, Default)]
pub struct TagSetStore {
    sets: HashMap<String, TagSet>,
}

impl TagSetStore {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn declare(&mut self, name: &str, tags: &[&str]) -> &mut TagSet {
        match self.sets.entry(name.to_owned()) {
            Entry::Vacant(e) => e.insert(TagSet::new(name, tags)),
            Entry::Occupied(e) => e.into_mut(),
        }
    }
    pub fn tag_set(&self, name: &str) -> Option<&TagSet> {
        self.sets.get(name)
    }
    pub fn tag_set_mut(&mut self, name: &str) -> Option<&mut TagSet> {
        self.sets.get_mut(name)
    }
}

// ------------- Selection store -------------

/// The live selection of the graph, shared with whatever displays it.
///
/// Observers watch the generation counter: it advances once per coherent
/// selection change. Mutations inside a [`SelectionBatch`] are coalesced
/// into a single generation step when the batch is dropped, so a bulk
/// replace is seen as one transition and never as a partial state.
#[derive(Debug, Default)]
pub struct SelectionStore {
    vertices: std::collections::HashSet<Id, IdHasher>,
    edges: std::collections::HashSet<Id, IdHasher>,
    paused: bool,
    generation: u64,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_vertices(&self) -> impl Iterator<Item = Id> + '_ {
        self.vertices.iter().copied()
    }

    pub fn selected_edges(&self) -> impl Iterator<Item = Id> + '_ {
        self.edges.iter().copied()
    }

    pub fn is_vertex_selected(&self, vertex: Id) -> bool {
        self.vertices.contains(&vertex)
    }

    pub fn is_edge_selected(&self, edge: Id) -> bool {
        self.edges.contains(&edge)
    }

    pub fn selected_vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn selected_edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn select_vertex(&mut self, vertex: Id) {
        self.vertices.insert(vertex);
        self.touch();
    }

    pub fn select_edge(&mut self, edge: Id) {
        self.edges.insert(edge);
        self.touch();
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.touch();
    }

    /// Number of selection-changed events emitted so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Suspends change notifications until the returned guard is dropped.
    /// Dropping the guard resumes them and advances the generation exactly
    /// once, also when the batch is abandoned early.
    pub fn begin_batch(&mut self) -> SelectionBatch<'_> {
        self.paused = true;
        SelectionBatch { store: self }
    }

    fn touch(&mut self) {
        if !self.paused {
            self.generation += 1;
        }
    }
}

/// Scoped batch update of a [`SelectionStore`].
#[derive(Debug)]
pub struct SelectionBatch<'a> {
    store: &'a mut SelectionStore,
}

impl SelectionBatch<'_> {
    pub fn clear(&mut self) {
        self.store.vertices.clear();
        self.store.edges.clear();
    }

    pub fn select_vertices(&mut self, ids: impl IntoIterator<Item = Id>) {
        self.store.vertices.extend(ids);
    }

    pub fn select_edges(&mut self, ids: impl IntoIterator<Item = Id>) {
        self.store.edges.extend(ids);
    }
}

impl Drop for SelectionBatch<'_> {
    fn drop(&mut self) {
        self.store.paused = false;
        self.store.generation += 1;
    }
}
