//! Trackselect – selection expressions for cell-tracking lineage graphs.
//!
//! A lineage graph is a directed graph where vertices are *spots* (one cell
//! detection at one time point) and edges are *links* between successive
//! spots. Trackselect lets a user replace the current selection of such a
//! graph by typing a small expression combining:
//!
//! * numeric feature thresholds: `vertexFeature('N links') == 3`,
//! * tag membership tests: `tagSet('Reviewed by') == 'JY'`,
//! * set algebra on selections: `|` (or `+`), `&`, `-`,
//! * structural morphing: `morph(vertexSelection, 'incomingEdges')`,
//! * the ambient variables `selection`, `vertexSelection`, `edgeSelection`.
//!
//! ## Modules
//! * [`graph`] – The [`graph::LineageGraph`] collaborator with its two
//!   reusable integer ID spaces and the label↔id bimap.
//! * [`model`] – Read-only feature and tag-set stores, and the mutable
//!   [`model::SelectionStore`] with transactional batch updates.
//! * [`selection`] – [`selection::Selection`], a pair of roaring bitmaps
//!   over the vertex and edge ID spaces, with in-place set algebra.
//! * [`predicate`] – Feature and tag-set predicates turning threshold and
//!   membership tests into selections.
//! * [`morph`] – Adjacency walks and whole-track (undirected connected
//!   component) discovery.
//! * [`parse`] – The pest grammar and the expression tree.
//! * [`evaluate`] – The postorder interpreter over the dynamic operand
//!   domain.
//! * [`creator`] – The driver: parse → evaluate → commit to the store.
//! * [`error`] – One [`error::SelectError`] channel for parse, lookup,
//!   type and ambiguity errors.
//!
//! ## Quick Start
//! ```
//! use trackselect::creator::SelectionCreator;
//! use trackselect::graph::LineageGraph;
//! use trackselect::model::{FeatureStore, SelectionStore, TagSetStore, Target};
//!
//! let mut graph = LineageGraph::new();
//! let a = graph.add_spot();
//! let b = graph.add_spot();
//! graph.add_link(a, b).unwrap();
//!
//! let mut features = FeatureStore::new();
//! let frame = features.declare("frame", Target::Vertices);
//! frame.set_scalar(a, 0.0);
//! frame.set_scalar(b, 1.0);
//!
//! let tags = TagSetStore::new();
//! let mut store = SelectionStore::new();
//! let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
//! let selection = creator.evaluate("vertexFeature('frame') == 1").unwrap();
//! assert_eq!(selection.vertex_count(), 1);
//! assert!(store.is_vertex_selected(b));
//! ```
//!
//! ## Evaluation model
//! Expression text is parsed into an operator tree, walked bottom-up; every
//! operator dispatches on the runtime kinds of its operands (number,
//! string, selection, feature predicate, tag-set predicate, tuple,
//! unresolved name). The first failing node aborts the walk and its message
//! is the one surfaced; the selection store is only written when the whole
//! expression reduces to a selection, and then in a single atomic batch so
//! observers see exactly one selection-changed event.
//!
//! Evaluation is synchronous and single-threaded per call and assumes the
//! graph snapshot does not change underneath it. Concurrent read-only
//! evaluations of an unchanging graph are safe.

pub mod creator;
pub mod error;
pub mod evaluate;
pub mod graph;
pub mod model;
pub mod morph;
pub mod parse;
pub mod predicate;
pub mod selection;
