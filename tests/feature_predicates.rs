use trackselect::graph::LineageGraph;
use trackselect::model::{FeatureStore, Target};
use trackselect::predicate::FeaturePredicate;

// Five spots in a chain; `frame` is defined on the first four only and the
// last defined value is NaN.
fn setup() -> (LineageGraph, FeatureStore, Vec<u32>) {
    let mut graph = LineageGraph::new();
    let spots: Vec<_> = (0..5).map(|_| graph.add_spot()).collect();
    for w in spots.windows(2) {
        graph.add_link(w[0], w[1]).unwrap();
    }
    let mut features = FeatureStore::new();
    let frame = features.declare("frame", Target::Vertices);
    frame.set_scalar(spots[0], 0.0);
    frame.set_scalar(spots[1], 1.0);
    frame.set_scalar(spots[2], 2.0);
    frame.set_scalar(spots[3], f64::NAN);
    (graph, features, spots)
}

fn predicate<'a>(
    graph: &'a LineageGraph,
    features: &'a FeatureStore,
) -> FeaturePredicate<'a> {
    let feature = features.feature("frame").unwrap();
    FeaturePredicate::new(
        graph,
        Target::Vertices,
        "frame",
        "frame",
        feature.projection("frame").unwrap(),
    )
}

#[test]
fn orderings_partition_the_defined_subset() {
    let (graph, features, spots) = setup();
    let p = predicate(&graph, &features);
    let below = p.less_than(1.0);
    let at_or_above = p.greater_or_equal(1.0);
    assert!(below.contains_vertex(spots[0]));
    assert_eq!(below.vertex_count(), 1);
    assert!(at_or_above.contains_vertex(spots[1]));
    assert!(at_or_above.contains_vertex(spots[2]));
    assert_eq!(at_or_above.vertex_count(), 2);
    // NaN fails both orderings, the undefined spot appears nowhere.
    assert!(!below.contains_vertex(spots[3]));
    assert!(!at_or_above.contains_vertex(spots[3]));
    assert!(!below.contains_vertex(spots[4]));
    assert!(!at_or_above.contains_vertex(spots[4]));
}

#[test]
fn equality_and_inequality() {
    let (graph, features, spots) = setup();
    let p = predicate(&graph, &features);
    let eq = p.equal(1.0);
    assert_eq!(eq.vertex_count(), 1);
    assert!(eq.contains_vertex(spots[1]));

    let neq = p.not_equal(1.0);
    assert!(neq.contains_vertex(spots[0]));
    assert!(neq.contains_vertex(spots[2]));
    // NaN != x holds, so the NaN spot is matched.
    assert!(neq.contains_vertex(spots[3]));
    // Undefined is not the same as unequal.
    assert!(!neq.contains_vertex(spots[4]));
    assert_eq!(neq.vertex_count(), 3);
}

#[test]
fn boundary_values_of_le_and_ge() {
    let (graph, features, spots) = setup();
    let p = predicate(&graph, &features);
    assert!(p.less_or_equal(2.0).contains_vertex(spots[2]));
    assert!(!p.less_than(2.0).contains_vertex(spots[2]));
    assert!(p.greater_or_equal(0.0).contains_vertex(spots[0]));
    assert!(!p.greater_than(0.0).contains_vertex(spots[0]));
}

#[test]
fn vertex_predicate_never_selects_edges() {
    let (graph, features, _) = setup();
    let p = predicate(&graph, &features);
    let all = p.greater_or_equal(f64::NEG_INFINITY);
    assert_eq!(all.edge_count(), 0);
}

#[test]
fn edge_predicate_never_selects_vertices() {
    let mut graph = LineageGraph::new();
    let a = graph.add_spot();
    let b = graph.add_spot();
    let e = graph.add_link(a, b).unwrap();
    let mut features = FeatureStore::new();
    features.declare("speed", Target::Edges).set_scalar(e, 4.5);

    let feature = features.feature("speed").unwrap();
    let p = FeaturePredicate::new(
        &graph,
        Target::Edges,
        "speed",
        "speed",
        feature.projection("speed").unwrap(),
    );
    let s = p.greater_than(4.0);
    assert_eq!(s.vertex_count(), 0);
    assert_eq!(s.edge_count(), 1);
    assert!(s.contains_edge(e));
}

#[test]
fn empty_predicate_selects_nothing() {
    let (graph, _, _) = setup();
    let p = FeaturePredicate::empty(&graph, Target::Vertices);
    assert!(p.equal(0.0).is_empty());
    assert!(p.not_equal(0.0).is_empty());
    assert!(p.less_than(f64::INFINITY).is_empty());
}
