//! Interactive demo: builds a synthetic lineage and evaluates selection
//! expressions typed on stdin.
//!
//! The demo dataset is a handful of linear tracks with a `frame` and an
//! `N links` vertex feature, a `link frame` edge feature and a
//! `Reviewed by` tag-set, enough to exercise every part of the expression
//! language.
//! Track count and length can be overridden in `trackselect.toml` or with
//! `TRACKSELECT_*` environment variables.

use std::io::{BufRead, Write};

use tracing::info;

use trackselect::creator::SelectionCreator;
use trackselect::graph::LineageGraph;
use trackselect::model::{FeatureStore, SelectionStore, TagSetStore, Target};

struct Settings {
    tracks: usize,
    track_length: usize,
}

fn load_settings() -> Settings {
    let loaded = config::Config::builder()
        .add_source(config::File::with_name("trackselect").required(false))
        .add_source(config::Environment::with_prefix("TRACKSELECT"))
        .build();
    match loaded {
        Ok(settings) => Settings {
            tracks: settings.get_int("tracks").unwrap_or(3).max(1) as usize,
            track_length: settings.get_int("track_length").unwrap_or(10).max(2) as usize,
        },
        Err(_) => Settings {
            tracks: 3,
            track_length: 10,
        },
    }
}

/// Builds `tracks` disjoint linear tracks with features and a few tags.
fn build_demo(
    settings: &Settings,
) -> (LineageGraph, FeatureStore, TagSetStore) {
    let mut graph = LineageGraph::new();
    let mut features = FeatureStore::new();
    features.declare("frame", Target::Vertices);
    features.declare("N links", Target::Vertices);
    features.declare("link frame", Target::Edges);
    let mut tags = TagSetStore::new();
    tags.declare("Reviewed by", &["JY", "TP"]);

    let mut spots = Vec::new();
    let mut links = Vec::new();
    for track in 0..settings.tracks {
        let mut previous = None;
        for frame in 0..settings.track_length {
            let spot = graph.add_labeled_spot(&format!("t{track}s{frame}"));
            spots.push((spot, frame as f64));
            if let Some(previous) = previous {
                if let Some(link) = graph.add_link(previous, spot) {
                    links.push((link, frame as f64));
                }
            }
            previous = Some(spot);
        }
    }

    // Fill the features and review tags now that the topology exists.
    for (v, frame) in &spots {
        let degree = (graph.incoming_edges(*v).len() + graph.outgoing_edges(*v).len()) as f64;
        features.declare("frame", Target::Vertices).set_scalar(*v, *frame);
        features.declare("N links", Target::Vertices).set_scalar(*v, degree);
    }
    for (e, frame) in &links {
        features.declare("link frame", Target::Edges).set_scalar(*e, *frame);
    }
    if let Some(set) = tags.tag_set_mut("Reviewed by") {
        for (v, _) in spots.iter().step_by(2) {
            set.tag_vertex(*v, "JY");
        }
        for (e, _) in links.iter().step_by(3) {
            set.tag_edge(*e, "TP");
        }
        set.build_reverse_index();
    }

    (graph, features, tags)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let (graph, features, tags) = build_demo(&settings);
    let mut store = SelectionStore::new();
    info!(%graph, "demo lineage ready");

    println!("{graph}");
    println!("Type a selection expression, e.g. vertexFeature('frame') > 3. Ctrl-D quits.");

    let stdin = std::io::stdin();
    let mut out = std::io::stdout();
    loop {
        print!("> ");
        let _ = out.flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => (),
        }
        let expression = line.trim();
        if expression.is_empty() {
            continue;
        }
        if expression.eq_ignore_ascii_case("quit") || expression.eq_ignore_ascii_case("exit") {
            break;
        }
        let mut creator = SelectionCreator::new(&graph, &features, &tags, &mut store);
        match creator.evaluate(expression) {
            Ok(selection) => println!("{selection}"),
            Err(err) => println!("Evaluation failed. {err}"),
        }
    }
}
