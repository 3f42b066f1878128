//! End-to-end tests: import a trace export into redb, then explain from it.

use std::path::Path;

use isgci_why::class::{ClassId, RelationKey};
use isgci_why::explain::{Explainer, NO_DATA};
use isgci_why::import::TraceExport;
use isgci_why::logfile::{LogLine, read_log};
use isgci_why::store::{DurableStore, TraceStore};

const TRACES: &str = r#"[
    {"sub": 1, "super": 16, "type": "VB",
     "dependencies": "[{\"sub\":1,\"sup\":5},{\"sub\":5,\"sup\":16}]"},
    {"sub": 1, "super": 5, "type": "direct", "dependencies": "[]"},
    {"sub": 5, "super": 16, "type": "direct", "dependencies": null},
    {"sub": 7, "super": 9, "type": "transitive",
     "dependencies": [{"sub": 7, "sup": 1}, {"sub": 1, "sup": 16}, {"sub": 16, "sup": 9}]},
    {"sub": 7, "super": 1, "type": "forbidden subgraphs", "dependencies": []}
]"#;

const NAMES: &str = r#"[
    {"id": 1, "name": "Planar"},
    {"id": 5, "name": "4-colourable"},
    {"id": 16, "name": "Bipartite"}
]"#;

fn imported_store(dir: &Path) -> DurableStore {
    let store = DurableStore::create(&dir.join("trace.redb")).unwrap();
    TraceExport::from_traces_json(TRACES, "traces.json")
        .unwrap()
        .with_names_json(NAMES, "names.json")
        .unwrap()
        .write_to(&store)
        .unwrap();
    store
}

#[test]
fn explains_imported_relation() {
    let dir = tempfile::TempDir::new().unwrap();
    let explainer = Explainer::new(imported_store(dir.path()));
    let text = explainer
        .explain(ClassId::new(1), ClassId::new(16), false)
        .unwrap();
    assert_eq!(text, "1 -> 16    VB\n    1 -> 5    direct\n    5 -> 16    direct\n");
}

#[test]
fn explains_with_names() {
    let dir = tempfile::TempDir::new().unwrap();
    let explainer = Explainer::new(imported_store(dir.path()));
    let text = explainer
        .explain(ClassId::new(1), ClassId::new(16), true)
        .unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("(1) Planar -> (16) Bipartite    VB"));
    assert_eq!(lines.next(), Some("    (1) Planar -> (5) 4-colourable    direct"));
    assert_eq!(lines.next(), Some("    (5) 4-colourable -> (16) Bipartite    direct"));
    assert_eq!(lines.next(), None);
}

#[test]
fn nested_dependencies_indent_per_level() {
    let dir = tempfile::TempDir::new().unwrap();
    let explainer = Explainer::new(imported_store(dir.path()));
    let text = explainer
        .explain(ClassId::new(7), ClassId::new(9), false)
        .unwrap();
    assert_eq!(
        text,
        "7 -> 9    transitive\n\
         \x20   7 -> 1    forbidden subgraphs\n\
         \x20   1 -> 16    VB\n\
         \x20       1 -> 5    direct\n\
         \x20       5 -> 16    direct\n\
         \x20   16 -> 9    (no tracedata)\n"
    );
}

#[test]
fn unknown_pair_is_the_sentinel() {
    let dir = tempfile::TempDir::new().unwrap();
    let explainer = Explainer::new(imported_store(dir.path()));
    for with_names in [false, true] {
        let text = explainer
            .explain(ClassId::new(2), ClassId::new(2), with_names)
            .unwrap();
        assert_eq!(text, NO_DATA);
    }
}

#[test]
fn names_do_not_change_the_tree() {
    let dir = tempfile::TempDir::new().unwrap();
    let explainer = Explainer::new(imported_store(dir.path()));
    let key = RelationKey::new(7, 9);
    let plain = explainer.trace(key, false).unwrap();
    let named = explainer.trace(key, true).unwrap();
    let shape = |e: &isgci_why::explain::Explanation| {
        e.lines
            .iter()
            .map(|l| (l.depth, l.key))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&plain), shape(&named));
}

#[test]
fn repeated_queries_are_identical() {
    let dir = tempfile::TempDir::new().unwrap();
    let explainer = Explainer::new(imported_store(dir.path()));
    let first = explainer.explain(ClassId::new(7), ClassId::new(9), true).unwrap();
    let second = explainer.explain(ClassId::new(7), ClassId::new(9), true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn memory_and_durable_stores_agree() {
    let dir = tempfile::TempDir::new().unwrap();
    let durable = Explainer::new(imported_store(dir.path()));
    let mem = Explainer::new(
        TraceExport::from_traces_json(TRACES, "traces.json")
            .unwrap()
            .with_names_json(NAMES, "names.json")
            .unwrap()
            .into_mem_store(),
    );
    for (sub, sup) in [(1, 16), (7, 9), (1, 5), (3, 4)] {
        for with_names in [false, true] {
            assert_eq!(
                durable
                    .explain(ClassId::new(sub), ClassId::new(sup), with_names)
                    .unwrap(),
                mem.explain(ClassId::new(sub), ClassId::new(sup), with_names)
                    .unwrap()
            );
        }
    }
}

#[test]
fn fetch_carries_names_only_when_asked() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = imported_store(dir.path());
    let key = RelationKey::new(1, 16);

    let plain = store.fetch(key, false).unwrap().unwrap();
    assert_eq!(plain.kind, "VB");
    assert_eq!(plain.sub_name, None);

    let named = store.fetch(key, true).unwrap().unwrap();
    assert_eq!(named.sub_name.as_deref(), Some("Planar"));
    assert_eq!(named.super_name.as_deref(), Some("Bipartite"));
    assert_eq!(named.dependencies.len(), 2);
}

#[test]
fn log_relations_resolve_against_the_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let log = dir.path().join("log.txt");
    std::fs::write(
        &log,
        "# RCheckForbidden\n1 -> 16 $planar$ -> $bipartite$\n\n**Finished\n",
    )
    .unwrap();
    let explainer = Explainer::new(imported_store(dir.path()));

    let lines = read_log(&log).unwrap();
    assert_eq!(lines.len(), 3);
    let Some(LogLine::Relation { key, .. }) = lines.get(1) else {
        panic!("expected a relation line, got {:?}", lines.get(1));
    };
    let explanation = explainer.trace(*key, false).unwrap();
    assert!(!explanation.is_no_data());
    assert_eq!(explanation.lines.len(), 3);
}
