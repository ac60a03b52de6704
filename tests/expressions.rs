use trackselect::creator::SelectionCreator;
use trackselect::graph::LineageGraph;
use trackselect::model::{FeatureStore, SelectionStore, TagSetStore, Target};

// Track a: a0 -> a1 -> a2 -> a3, track b: b0 -> b1. Vertex features `frame`
// and `pos` (projections `x`), edge feature `link frame` (the frame of the
// link's target). Tag-set `Reviewed by`: a0, a1 and the a0->a1 link carry
// JY, b0 carries TP.
fn setup() -> (LineageGraph, FeatureStore, TagSetStore) {
    let mut graph = LineageGraph::new();
    let a: Vec<_> = (0..4)
        .map(|f| graph.add_labeled_spot(&format!("a{f}")))
        .collect();
    let b: Vec<_> = (0..2)
        .map(|f| graph.add_labeled_spot(&format!("b{f}")))
        .collect();
    let mut a_links = Vec::new();
    for w in a.windows(2) {
        a_links.push(graph.add_link(w[0], w[1]).unwrap());
    }
    let b_link = graph.add_link(b[0], b[1]).unwrap();

    let mut features = FeatureStore::new();
    let frame = features.declare("frame", Target::Vertices);
    for (i, v) in a.iter().chain(b.iter()).enumerate() {
        let f = if i < 4 { i } else { i - 4 };
        frame.set_scalar(*v, f as f64);
    }
    let pos = features.declare("pos", Target::Vertices);
    for (i, v) in a.iter().enumerate() {
        pos.projection_mut("x").set(*v, i as f64 * 10.0);
    }
    let link_frame = features.declare("link frame", Target::Edges);
    for (i, e) in a_links.iter().enumerate() {
        link_frame.set_scalar(*e, (i + 1) as f64);
    }
    link_frame.set_scalar(b_link, 1.0);

    let mut tags = TagSetStore::new();
    let reviewed = tags.declare("Reviewed by", &["JY", "TP"]);
    reviewed.tag_vertex(a[0], "JY");
    reviewed.tag_vertex(a[1], "JY");
    reviewed.tag_vertex(b[0], "TP");
    reviewed.tag_edge(a_links[0], "JY");
    reviewed.build_reverse_index();

    (graph, features, tags)
}

#[test]
fn feature_equality_selects_matching_vertices() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator.evaluate("vertexFeature('frame') == 2").unwrap();
    assert_eq!(s.vertex_count(), 1);
    assert_eq!(s.edge_count(), 0);
    let a2 = graph.spot_id("a2").unwrap();
    assert!(s.contains_vertex(a2));
    assert!(store.is_vertex_selected(a2));
    assert_eq!(store.selected_vertex_count(), 1);
}

#[test]
fn pipe_unions_without_brackets() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator
        .evaluate("vertexFeature('frame') == 0 | vertexFeature('frame') == 3")
        .unwrap();
    // Frame 0 exists in both tracks, frame 3 only in track a.
    assert_eq!(s.vertex_count(), 3);
}

#[test]
fn ampersand_intersects() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator
        .evaluate("vertexFeature('frame') > 0 & vertexFeature('frame') <= 2")
        .unwrap();
    assert_eq!(s.vertex_count(), 3);
    assert!(s.contains_vertex(graph.spot_id("a1").unwrap()));
    assert!(s.contains_vertex(graph.spot_id("a2").unwrap()));
    assert!(s.contains_vertex(graph.spot_id("b1").unwrap()));
}

#[test]
fn comparison_is_mirrored_when_the_number_is_on_the_left() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator.evaluate("2 > vertexFeature('frame')").unwrap();
    assert_eq!(s.vertex_count(), 4);
}

#[test]
fn arithmetic_binds_tighter_than_equality() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    // Parsed as frame == (1 + 1).
    let s = creator.evaluate("vertexFeature('frame') == 1 + 1").unwrap();
    assert_eq!(s.vertex_count(), 1);
    assert!(s.contains_vertex(graph.spot_id("a2").unwrap()));
}

#[test]
fn edge_features_select_edges() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator.evaluate("edgeFeature('link frame') == 1").unwrap();
    assert_eq!(s.vertex_count(), 0);
    assert_eq!(s.edge_count(), 2);
}

#[test]
fn projection_key_can_be_spelled_out() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator.evaluate("vertexFeature('pos', 'x') >= 20").unwrap();
    assert_eq!(s.vertex_count(), 2);
    assert!(s.contains_vertex(graph.spot_id("a2").unwrap()));
    assert!(s.contains_vertex(graph.spot_id("a3").unwrap()));
}

#[test]
fn a_wrapped_argument_list_is_flattened() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator
        .evaluate("vertexFeature(('pos', 'x')) >= 20")
        .unwrap();
    assert_eq!(s.vertex_count(), 2);
}

#[test]
fn tag_set_selects_both_object_kinds() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator.evaluate("tagSet('Reviewed by') == 'JY'").unwrap();
    assert_eq!(s.vertex_count(), 2);
    assert_eq!(s.edge_count(), 1);
}

#[test]
fn vertex_and_edge_tag_sets_are_scoped() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator
        .evaluate("vertexTagSet('Reviewed by') == 'JY'")
        .unwrap();
    assert_eq!(s.vertex_count(), 2);
    assert_eq!(s.edge_count(), 0);
    let s = creator
        .evaluate("edgeTagSet('Reviewed by') == 'JY'")
        .unwrap();
    assert_eq!(s.vertex_count(), 0);
    assert_eq!(s.edge_count(), 1);
}

#[test]
fn tag_inequality_includes_untagged_objects() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator
        .evaluate("vertexTagSet('Reviewed by') != 'JY'")
        .unwrap();
    // a2, a3, b1 are untagged, b0 carries TP.
    assert_eq!(s.vertex_count(), 4);
    assert!(s.contains_vertex(graph.spot_id("b0").unwrap()));
}

#[test]
fn bang_selects_untagged_and_tilde_selects_tagged() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let untagged = creator.evaluate("!vertexTagSet('Reviewed by')").unwrap();
    assert_eq!(untagged.vertex_count(), 3);
    let tagged = creator.evaluate("~vertexTagSet('Reviewed by')").unwrap();
    assert_eq!(tagged.vertex_count(), 3);
    assert!(tagged.contains_vertex(graph.spot_id("b0").unwrap()));
}

#[test]
fn morphing_inside_an_expression() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator
        .evaluate("morph(vertexFeature('frame') == 2, 'incomingEdges')")
        .unwrap();
    assert_eq!(s.vertex_count(), 0);
    assert_eq!(s.edge_count(), 1);
}

#[test]
fn morph_with_a_switch_list_unions_each_result() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator
        .evaluate("morph(edgeFeature('link frame') == 1, ('sourceVertex', 'targetVertex'))")
        .unwrap();
    assert_eq!(s.vertex_count(), 4);
    assert_eq!(s.edge_count(), 0);
}

#[test]
fn whole_track_recovers_the_full_track() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let s = creator
        .evaluate("morph(vertexFeature('frame') == 3, 'wholeTrack')")
        .unwrap();
    assert_eq!(s.vertex_count(), 4);
    assert_eq!(s.edge_count(), 3);
    assert!(!s.contains_vertex(graph.spot_id("b0").unwrap()));
}

#[test]
fn morph_arguments_work_in_either_order() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    let forward = creator
        .evaluate("morph(vertexFeature('frame') == 3, 'wholeTrack')")
        .unwrap();
    let reversed = creator
        .evaluate("morph('wholeTrack', vertexFeature('frame') == 3)")
        .unwrap();
    assert_eq!(forward, reversed);
}

#[test]
fn ambient_variables_snapshot_the_live_selection() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    creator.evaluate("tagSet('Reviewed by') == 'JY'").unwrap();
    let vertices = creator.evaluate("vertexSelection").unwrap();
    assert_eq!(vertices.vertex_count(), 2);
    assert_eq!(vertices.edge_count(), 0);
    // The previous evaluation replaced the store, so edgeSelection now
    // snapshots the vertex-only result.
    let edges = creator.evaluate("edgeSelection").unwrap();
    assert_eq!(edges.vertex_count(), 0);
    assert_eq!(edges.edge_count(), 0);
}

#[test]
fn selection_can_be_narrowed_with_subtraction() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    creator.evaluate("vertexFeature('frame') <= 1").unwrap();
    let s = creator
        .evaluate("selection - (vertexFeature('frame') == 0)")
        .unwrap();
    assert_eq!(s.vertex_count(), 2);
    assert!(s.contains_vertex(graph.spot_id("a1").unwrap()));
    assert!(s.contains_vertex(graph.spot_id("b1").unwrap()));
}

#[test]
fn names_are_case_insensitive() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    creator.evaluate("VertexFeature('frame') == 3").unwrap();
    let s = creator.evaluate("MORPH(Selection, 'WHOLETRACK')").unwrap();
    assert_eq!(s.vertex_count(), 4);
    assert_eq!(s.edge_count(), 3);
}

#[test]
fn each_evaluation_replaces_the_store() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    creator.evaluate("vertexFeature('frame') == 0").unwrap();
    creator.evaluate("vertexFeature('frame') == 3").unwrap();
    assert_eq!(store.selected_vertex_count(), 1);
    assert!(store.is_vertex_selected(graph.spot_id("a3").unwrap()));
}

#[test]
fn a_successful_evaluation_advances_the_generation_once() {
    let (graph, features, tags) = setup();
    let mut store = SelectionStore::new();
    let before = store.generation();
    let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
    creator.evaluate("vertexFeature('frame') == 0").unwrap();
    assert_eq!(store.generation(), before + 1);
}
