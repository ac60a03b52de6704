//! Feature and tag-set predicates: function bindings that turn a relational
//! or membership test into a [`Selection`].
//!
//! Predicates are ephemeral. They are created when a `vertexFeature`,
//! `edgeFeature` or `tagSet` call is evaluated and dropped with the
//! expression tree, so schema or value changes are always picked up by the
//! next evaluation. Every operation is a full scan of the bound collection,
//! except tag equality which takes the reverse index of the tag-set when one
//! has been built.

use std::fmt;

use roaring::RoaringBitmap;

use crate::graph::LineageGraph;
use crate::model::{Projection, TagIndex, TagSet, Target};
use crate::selection::Selection;

// ------------- FeaturePredicate -------------

/// A named scalar projection bound to the vertex or edge collection,
/// evaluating the six relational operators into selections.
///
/// Comparisons follow IEEE floating-point semantics: an undefined value
/// fails every test, and a defined `NaN` fails every ordering and equality
/// test while `not_equal` matches it (NaN != x is true).
pub struct FeaturePredicate<'a> {
    graph: &'a LineageGraph,
    projection: Option<&'a Projection>,
    target: Target,
    feature_key: String,
    projection_key: String,
}

impl<'a> FeaturePredicate<'a> {
    pub fn new(
        graph: &'a LineageGraph,
        target: Target,
        feature_key: &str,
        projection_key: &str,
        projection: &'a Projection,
    ) -> Self {
        Self {
            graph,
            projection: Some(projection),
            target,
            feature_key: feature_key.to_owned(),
            projection_key: projection_key.to_owned(),
        }
    }

    /// A predicate bound to nothing. Every operator returns an empty
    /// selection. Only ever produced explicitly; lookups of unknown names
    /// fail loudly instead of falling back to this.
    pub fn empty(graph: &'a LineageGraph, target: Target) -> Self {
        Self {
            graph,
            projection: None,
            target,
            feature_key: String::new(),
            projection_key: String::new(),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn less_than(&self, threshold: f64) -> Selection {
        self.test(|v| v < threshold)
    }

    pub fn greater_than(&self, threshold: f64) -> Selection {
        self.test(|v| v > threshold)
    }

    pub fn less_or_equal(&self, threshold: f64) -> Selection {
        self.test(|v| v <= threshold)
    }

    pub fn greater_or_equal(&self, threshold: f64) -> Selection {
        self.test(|v| v >= threshold)
    }

    pub fn equal(&self, value: f64) -> Selection {
        self.test(|v| v == value)
    }

    pub fn not_equal(&self, value: f64) -> Selection {
        self.test(|v| v != value)
    }

    /// Scans the bound collection; an object is included iff the projection
    /// is defined for it and the test holds. The other dimension of the
    /// result stays empty.
    fn test(&self, tester: impl Fn(f64) -> bool) -> Selection {
        let mut bits = RoaringBitmap::new();
        if let Some(projection) = self.projection {
            match self.target {
                Target::Vertices => {
                    for v in self.graph.vertices() {
                        if let Some(value) = projection.value(v) {
                            if tester(value) {
                                bits.insert(v);
                            }
                        }
                    }
                }
                Target::Edges => {
                    for e in self.graph.edges() {
                        if let Some(value) = projection.value(e) {
                            if tester(value) {
                                bits.insert(e);
                            }
                        }
                    }
                }
            }
        }
        match self.target {
            Target::Vertices => Selection::from_bits(bits, RoaringBitmap::new()),
            Target::Edges => Selection::from_bits(RoaringBitmap::new(), bits),
        }
    }
}

impl fmt::Display for FeaturePredicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.projection {
            Some(_) => write!(
                f,
                "Feature( {} \u{2192} {}, {} )",
                self.feature_key,
                self.projection_key,
                self.target.noun()
            ),
            None => write!(f, "Feature( <empty>, {} )", self.target.noun()),
        }
    }
}

// ------------- TagPredicate -------------

/// Which object kind a tag predicate selects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    Vertices,
    Edges,
    /// Both kinds; every operation evaluates the vertex-only and edge-only
    /// predicate independently and unions the two results. This is the only
    /// way a bare `tagSet(name)` query selects vertices and edges at once.
    Graph,
}

/// A named tag-set's per-object assignment bound to set/unset/equal tests.
pub struct TagPredicate<'a> {
    graph: &'a LineageGraph,
    tag_set: Option<&'a TagSet>,
    scope: TagScope,
}

impl<'a> TagPredicate<'a> {
    pub fn new(graph: &'a LineageGraph, tag_set: &'a TagSet, scope: TagScope) -> Self {
        Self {
            graph,
            tag_set: Some(tag_set),
            scope,
        }
    }

    /// A predicate bound to no tag-set; every operation returns an empty
    /// selection. Mirrors [`FeaturePredicate::empty`].
    pub fn empty(graph: &'a LineageGraph, scope: TagScope) -> Self {
        Self {
            graph,
            tag_set: None,
            scope,
        }
    }

    pub fn tag_set(&self) -> Option<&'a TagSet> {
        self.tag_set
    }

    pub fn scope(&self) -> TagScope {
        self.scope
    }

    /// Objects carrying exactly `tag`. Uses the tag-set's reverse index
    /// when built, a full scan otherwise.
    pub fn equal(&self, tag: TagIndex) -> Selection {
        self.collect(
            |set, graph| match set.vertices_tagged_with(tag) {
                Some(ids) => ids.iter().copied().collect(),
                None => graph
                    .vertices()
                    .filter(|v| set.vertex_tag(*v) == Some(tag))
                    .collect(),
            },
            |set, graph| match set.edges_tagged_with(tag) {
                Some(ids) => ids.iter().copied().collect(),
                None => graph
                    .edges()
                    .filter(|e| set.edge_tag(*e) == Some(tag))
                    .collect(),
            },
        )
    }

    /// Objects whose assigned tag, or absence of one, differs from `tag`.
    pub fn not_equal(&self, tag: TagIndex) -> Selection {
        self.collect(
            |set, graph| {
                graph
                    .vertices()
                    .filter(|v| set.vertex_tag(*v) != Some(tag))
                    .collect()
            },
            |set, graph| {
                graph
                    .edges()
                    .filter(|e| set.edge_tag(*e) != Some(tag))
                    .collect()
            },
        )
    }

    /// Objects with no tag assigned in this tag-set.
    pub fn unset(&self) -> Selection {
        self.collect(
            |set, graph| {
                graph
                    .vertices()
                    .filter(|v| set.vertex_tag(*v).is_none())
                    .collect()
            },
            |set, graph| {
                graph
                    .edges()
                    .filter(|e| set.edge_tag(*e).is_none())
                    .collect()
            },
        )
    }

    /// Objects with any tag assigned in this tag-set.
    pub fn set(&self) -> Selection {
        self.collect(
            |set, graph| {
                graph
                    .vertices()
                    .filter(|v| set.vertex_tag(*v).is_some())
                    .collect()
            },
            |set, graph| {
                graph
                    .edges()
                    .filter(|e| set.edge_tag(*e).is_some())
                    .collect()
            },
        )
    }

    fn collect(
        &self,
        vertex_bits: impl Fn(&TagSet, &LineageGraph) -> RoaringBitmap,
        edge_bits: impl Fn(&TagSet, &LineageGraph) -> RoaringBitmap,
    ) -> Selection {
        let Some(set) = self.tag_set else {
            return Selection::new();
        };
        let vertices = match self.scope {
            TagScope::Vertices | TagScope::Graph => vertex_bits(set, self.graph),
            TagScope::Edges => RoaringBitmap::new(),
        };
        let edges = match self.scope {
            TagScope::Edges | TagScope::Graph => edge_bits(set, self.graph),
            TagScope::Vertices => RoaringBitmap::new(),
        };
        Selection::from_bits(vertices, edges)
    }
}

impl fmt::Display for TagPredicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.tag_set {
            Some(set) => write!(f, "TagSet( {}, {:?} )", set.name(), self.scope),
            None => write!(f, "TagSet( <empty>, {:?} )", self.scope),
        }
    }
}
