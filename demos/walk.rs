//! Meshsel walkthrough: runs each selection operation on a small tube and
//! prints the resulting selection.
//!
//! Usage:
//! ```text
//! cargo run --example walk
//! RUST_LOG=meshsel=debug cargo run --example walk
//! ```

use meshsel::component::{ElementType, Pick, SelectionCollection, SelectionUpdate};
use meshsel::config::{Preferences, SelectConfig};
use meshsel::operations::{
    CoplanarMode, CoplanarSession, Flood, InBetween, Invert, PatternWalker, SceneContext,
    SelectMode, ToggleUnderCursor,
};
use meshsel::topology::{MeshStore, PolyMesh};

fn show(label: &str, selection: &SelectionCollection, store: &MeshStore) {
    let picks: Vec<String> = selection
        .to_picks(store)
        .iter()
        .map(|p| format!("{}[{}]", p.element, p.index))
        .collect();
    println!("{label:<12} {}", picks.join(" "));
}

fn main() -> meshsel::Result<()> {
    // Default: WARN for everything, INFO for meshsel.
    // Override with RUST_LOG env var (e.g. RUST_LOG=meshsel=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("meshsel=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut store = MeshStore::new();
    let tube = store.add_mesh(PolyMesh::tube(8, 3, 1.0, 3.0));
    let config = SelectConfig::default();
    let mut prefs = Preferences {
        track_selection_order: true,
        ..Preferences::default()
    };

    // in-between along the bottom ring
    let mut selection = SelectionCollection::from_ordered_picks([
        Pick::new(tube, ElementType::Face, 0),
        Pick::new(tube, ElementType::Face, 3),
    ]);
    let update = InBetween::new().execute(&store, &selection, &prefs)?;
    selection = update.apply(&selection, &store)?;
    show("in-between", &selection, &store);

    // every second face around the middle ring
    let picks = SelectionCollection::from_ordered_picks([
        Pick::new(tube, ElementType::Face, 8),
        Pick::new(tube, ElementType::Face, 10),
    ]);
    let mut walker = PatternWalker::new(&store, &picks)?;
    let mut walked = picks.merged();
    for _ in 0..2 {
        walked = walker.next().apply(&walked, &store)?;
    }
    show("pattern", &walked, &store);

    // coplanar growth from one face, widened by a drag
    let mut session = CoplanarSession::begin(
        &store,
        &selection,
        CoplanarMode::Contiguous,
        &prefs,
        &[],
        &config.coplanar,
    )?;
    session.drag(250.0);
    let grown = session.update(&store)?.apply(&selection, &store)?;
    show("coplanar", &grown, &store);
    let threshold = session.commit(&mut prefs);
    println!("{:<12} {threshold:.3}", "threshold");

    // toggle the loop above the bottom ring, then invert the faces
    let edge = store.mesh(tube)?.find_edge(8, 9).unwrap_or_default();
    let hovered = Some(Pick::new(tube, ElementType::Edge, edge));
    let edges = ToggleUnderCursor::new(hovered)
        .execute(&store, &SelectionCollection::new())?
        .apply(&SelectionCollection::new(), &store)?;
    show("toggle", &edges, &store);

    let context = SceneContext {
        mode: SelectMode::Component,
        mask: vec![ElementType::Face],
        hilited: vec![tube],
        visible_objects: vec![tube],
    };
    let inverted = Invert::new()
        .execute(&store, &selection, &context)?
        .apply(&selection, &store)?;
    show("invert", &inverted, &store);

    let flooded = Flood::new().execute(&store, &selection)?;
    if let SelectionUpdate::Add(shell) = &flooded {
        println!("{:<12} {} faces", "flood", shell.to_picks(&store).len());
    }
    Ok(())
}
