//! The lineage graph: spots (vertices) connected by links (edges).
//!
//! A cell-tracking lineage is a directed graph where each vertex is a spot
//! (one detection of a cell at one time point) and each edge is a link from a
//! spot to its successor in time. The graph owns the two independent ID
//! spaces the rest of the crate works in: every spot has a vertex id, every
//! link an edge id, both dense non-negative integers handed out by an
//! [`IdGenerator`]. Removing an object releases its id for reuse, so a bit
//! being clear in a selection never implies the object is gone from the
//! graph, only that it is not selected.
//!
//! Spots can optionally carry a human-readable label, kept in a
//! bidirectional map so demo scripts and tests can address spots by name.

use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use std::fmt;

use bimap::BiMap;
use seahash::SeaHasher;

/// Ids are dense, non-negative and reusable, one space for vertices and an
/// independent one for edges.
pub type Id = u32;

pub type IdHasher = BuildHasherDefault<SeaHasher>;

// ------------- IdGenerator -------------

/// Hands out ids starting from zero, reusing released ones first.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: Id,
    released: Vec<Id>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn generate(&mut self) -> Id {
        self.released.pop().unwrap_or_else(|| {
            let id = self.next;
            self.next += 1;
            id
        })
    }
    pub fn release(&mut self, id: Id) {
        self.released.push(id);
    }
    /// Exclusive upper bound of every id handed out so far.
    pub fn ceiling(&self) -> Id {
        self.next
    }
}

// ------------- LineageGraph -------------

#[derive(Debug, Default)]
struct SpotRecord {
    incoming: Vec<Id>,
    outgoing: Vec<Id>,
}

#[derive(Debug)]
struct LinkRecord {
    source: Id,
    target: Id,
}

/// A directed graph of spots and links with reusable integer id spaces.
#[derive(Debug, Default)]
pub struct LineageGraph {
    vertex_ids: IdGenerator,
    edge_ids: IdGenerator,
    spots: HashMap<Id, SpotRecord, IdHasher>,
    links: HashMap<Id, LinkRecord, IdHasher>,
    labels: BiMap<String, Id>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a spot and returns its vertex id.
    pub fn add_spot(&mut self) -> Id {
        let id = self.vertex_ids.generate();
        self.spots.insert(id, SpotRecord::default());
        id
    }

    /// Adds a spot carrying a label. A label already in use is rebound to
    /// the new spot.
    pub fn add_labeled_spot(&mut self, label: &str) -> Id {
        let id = self.add_spot();
        self.labels.insert(label.to_owned(), id);
        id
    }

    /// Adds a link from `source` to `target` and returns its edge id, or
    /// `None` when either endpoint is not in the graph.
    pub fn add_link(&mut self, source: Id, target: Id) -> Option<Id> {
        if !self.spots.contains_key(&source) || !self.spots.contains_key(&target) {
            return None;
        }
        let id = self.edge_ids.generate();
        self.links.insert(id, LinkRecord { source, target });
        if let Some(s) = self.spots.get_mut(&source) {
            s.outgoing.push(id);
        }
        if let Some(t) = self.spots.get_mut(&target) {
            t.incoming.push(id);
        }
        Some(id)
    }

    /// Removes a spot together with its incident links, releasing their ids.
    pub fn remove_spot(&mut self, vertex: Id) {
        let Some(record) = self.spots.remove(&vertex) else {
            return;
        };
        for edge in record.incoming.iter().chain(record.outgoing.iter()) {
            if let Some(link) = self.links.remove(edge) {
                if let Some(s) = self.spots.get_mut(&link.source) {
                    s.outgoing.retain(|e| e != edge);
                }
                if let Some(t) = self.spots.get_mut(&link.target) {
                    t.incoming.retain(|e| e != edge);
                }
                self.edge_ids.release(*edge);
            }
        }
        self.labels.remove_by_right(&vertex);
        self.vertex_ids.release(vertex);
    }

    /// Removes a link, releasing its id.
    pub fn remove_link(&mut self, edge: Id) {
        let Some(link) = self.links.remove(&edge) else {
            return;
        };
        if let Some(s) = self.spots.get_mut(&link.source) {
            s.outgoing.retain(|e| *e != edge);
        }
        if let Some(t) = self.spots.get_mut(&link.target) {
            t.incoming.retain(|e| *e != edge);
        }
        self.edge_ids.release(edge);
    }

    pub fn vertices(&self) -> impl Iterator<Item = Id> + '_ {
        self.spots.keys().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = Id> + '_ {
        self.links.keys().copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.spots.len()
    }

    pub fn edge_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains_vertex(&self, vertex: Id) -> bool {
        self.spots.contains_key(&vertex)
    }

    pub fn contains_edge(&self, edge: Id) -> bool {
        self.links.contains_key(&edge)
    }

    /// Incoming links of a spot, empty for an unknown id.
    pub fn incoming_edges(&self, vertex: Id) -> &[Id] {
        self.spots
            .get(&vertex)
            .map(|s| s.incoming.as_slice())
            .unwrap_or(&[])
    }

    /// Outgoing links of a spot, empty for an unknown id.
    pub fn outgoing_edges(&self, vertex: Id) -> &[Id] {
        self.spots
            .get(&vertex)
            .map(|s| s.outgoing.as_slice())
            .unwrap_or(&[])
    }

    pub fn source(&self, edge: Id) -> Option<Id> {
        self.links.get(&edge).map(|l| l.source)
    }

    pub fn target(&self, edge: Id) -> Option<Id> {
        self.links.get(&edge).map(|l| l.target)
    }

    pub fn endpoints(&self, edge: Id) -> Option<(Id, Id)> {
        self.links.get(&edge).map(|l| (l.source, l.target))
    }

    pub fn spot_id(&self, label: &str) -> Option<Id> {
        self.labels.get_by_left(label).copied()
    }

    pub fn spot_label(&self, vertex: Id) -> Option<&str> {
        self.labels.get_by_right(&vertex).map(String::as_str)
    }

    /// Exclusive upper bound of the vertex id space.
    pub fn vertex_id_ceiling(&self) -> Id {
        self.vertex_ids.ceiling()
    }

    /// Exclusive upper bound of the edge id space.
    pub fn edge_id_ceiling(&self) -> Id {
        self.edge_ids.ceiling()
    }
}

impl fmt::Display for LineageGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LineageGraph( {} spots, {} links )",
            self.spots.len(),
            self.links.len()
        )
    }
}
