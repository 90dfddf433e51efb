//! End-to-end tests: flat files → catalog → filter → aggregate / network.

use std::collections::BTreeSet;
use std::io::Write;

use imprint_kernel::{
    aggregate, build_subgraph, contingency, filter, AggregateQuery, Catalog, CountKind,
    DataLoadError, DataPaths, Dimension, FilterRequest, FilterSpec, GraphSelection, GraphStatus,
    GroupKey, LayoutConfig, NodeId, Preset,
};
use tempfile::NamedTempFile;

const EPSILON: f64 = 1e-9;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

const PUBLICATIONS: &str = "\
id;Printer;publishDate;author;genre;topic;language_cs
b1;P1;1643;A1;g1;t1;latina
b1;P1;1643;A2;g1;t1;latina
b2;P1;1651;A1;g2;t2;čeština
b2;P1;1651;A1;g2;t2;němčina
b3;P2;1660;A3;g1;t1;čeština
b4;P3;1672;A3;g3;;latina
b5;P4;1690;;g3;t3;latina
";

const DYNASTIES: &str = "\
Printer;Dynastie
P1;Černochové
P2;Černochové
P3;Akademická
P9;Jezuité
";

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn load_catalog() -> Catalog {
    let pubs = write_file(PUBLICATIONS);
    let dyns = write_file(DYNASTIES);
    Catalog::load(&DataPaths::new(pubs.path(), dyns.path())).unwrap()
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Record Store
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_load_joins_dynasties() {
    let catalog = load_catalog();
    let relation = catalog.relation();

    assert_eq!(relation.len(), 7);
    assert_eq!(relation.distinct_works(), 5);
    assert_eq!(catalog.year_bounds(), (1643, 1690));

    let p4 = relation.iter().find(|r| r.printer == "P4").unwrap();
    assert!(!p4.dynasty.is_set());
    let p2 = relation.iter().find(|r| r.printer == "P2").unwrap();
    assert_eq!(p2.dynasty.as_str(), Some("Černochové"));
}

#[test]
fn test_store_load_function() {
    let pubs = write_file(PUBLICATIONS);
    let dyns = write_file(DYNASTIES);
    let relation = imprint_kernel::load(pubs.path(), dyns.path()).unwrap();
    assert_eq!(relation.len(), 7);
}

#[test]
fn test_header_only_table_is_empty_dataset() {
    let pubs = write_file("id;Printer;publishDate;author;genre;topic;language_cs\n");
    let dyns = write_file(DYNASTIES);
    let result = Catalog::load(&DataPaths::new(pubs.path(), dyns.path()));
    assert!(matches!(result, Err(DataLoadError::EmptyDataset)));
}

#[test]
fn test_directory_includes_lookup_only_printers() {
    let catalog = load_catalog();
    let p9 = catalog.directory().get("P9").unwrap();
    assert_eq!((p9.active_from, p9.active_to), (0, 0));
    assert_eq!(catalog.options(Dimension::Dynasty), vec!["Akademická", "Jezuité", "Černochové"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: one work, two authors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_two_author_scenario() {
    use imprint_kernel::{PublicationRecord, Relation};

    let relation: Relation = vec![
        PublicationRecord::new("b1", "P1", 1650).with_author("A1").with_genre("g1"),
        PublicationRecord::new("b1", "P1", 1650).with_author("A2").with_genre("g1"),
    ]
    .into_iter()
    .collect();

    let authors = aggregate(&relation, &AggregateQuery::proportional(Dimension::Author)).unwrap();
    assert_eq!(authors.count_kind, CountKind::Proportional);
    assert!((authors.get(&[GroupKey::from("A1")]).unwrap() - 0.5).abs() < EPSILON);
    assert!((authors.get(&[GroupKey::from("A2")]).unwrap() - 0.5).abs() < EPSILON);

    let printers = aggregate(&relation, &AggregateQuery::exact(Dimension::Printer)).unwrap();
    assert_eq!(printers.count_kind, CountKind::Exact);
    assert_eq!(printers.get(&[GroupKey::from("P1")]), Some(1.0));
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter → Aggregate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_request_to_aggregate() {
    let catalog = load_catalog();
    let mut request = FilterRequest::default();
    request
        .selections
        .insert("Dynastie".to_string(), vec!["Černochové".to_string()]);
    let spec = request.into_spec(catalog.year_bounds()).unwrap();

    let filtered = filter::apply(catalog.relation(), &spec);
    assert_eq!(filtered.printers().into_iter().collect::<Vec<_>>(), vec!["P1", "P2"]);

    let languages = aggregate(&filtered, &AggregateQuery::proportional(Dimension::Language)).unwrap();
    // b2 is split between two languages; b1 has two latina rows.
    assert!((languages.total() - 3.0).abs() < EPSILON);
    assert!((languages.get(&[GroupKey::from("latina")]).unwrap() - 1.0).abs() < EPSILON);
    assert!((languages.get(&[GroupKey::from("čeština")]).unwrap() - 1.5).abs() < EPSILON);
}

#[test]
fn test_interval_preset() {
    let catalog = load_catalog();
    let result = aggregate(catalog.relation(), &Preset::WorksPerInterval.query(10)).unwrap();

    let keys: Vec<i32> = result.rows.iter().filter_map(|r| r.keys[0].as_year()).collect();
    assert_eq!(keys, vec![1640, 1650, 1660, 1670, 1690]);
    assert!((result.total() - 5.0).abs() < EPSILON);
}

#[test]
fn test_dynasty_cross_preset() {
    let catalog = load_catalog();
    let result = aggregate(catalog.relation(), &Preset::DynastyLanguages.query(5)).unwrap();

    // P4 has no dynasty, so b5 is not counted.
    assert!((result.total() - 4.0).abs() < EPSILON);
    let outer: Vec<String> = result.rows.iter().map(|r| r.keys[0].to_string()).collect();
    let mut sorted = outer.clone();
    sorted.sort();
    assert_eq!(outer, sorted);
}

#[test]
fn test_contingency_sufficiency() {
    let catalog = load_catalog();
    let table = contingency(catalog.relation(), Dimension::Genre, Dimension::Language);
    assert_eq!(table.shape(), (3, 3));
    assert!(table.is_sufficient(3));

    let narrow = filter::apply(catalog.relation(), &FilterSpec::new(1643, 1651));
    assert!(!contingency(&narrow, Dimension::Genre, Dimension::Language).is_sufficient(3));
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter → Network
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_network_for_dynasty_selection() {
    let catalog = load_catalog();
    let spec = catalog.unrestricted().with_dynasties(["Černochové"]);

    let selection = GraphSelection::resolve(&catalog, &spec);
    assert_eq!(selection.printers, set(&["P1", "P2"]));

    let filtered = filter::apply(catalog.relation(), &spec);
    let network = build_subgraph(&filtered, &selection.printers, &LayoutConfig::default());

    assert_eq!(network.status, GraphStatus::Ok);
    // P1, P2, A1, A2, A3
    assert_eq!(network.nodes.len(), 5);
    assert_eq!(network.edges.len(), 3);

    let a1 = network.node(&NodeId::author("A1")).unwrap();
    assert_eq!(a1.works, 2);
    let p1 = network.node(&NodeId::printer("P1")).unwrap();
    assert!(p1.selected);
    assert_eq!(p1.works, 2);
}

#[test]
fn test_network_year_range_excludes_everything() {
    let catalog = load_catalog();
    let spec = FilterSpec::new(1500, 1550).with_printers(["P1"]);
    let filtered = filter::apply(catalog.relation(), &spec);

    let network = build_subgraph(&filtered, &spec.printers, &LayoutConfig::default());
    assert_eq!(network.status, GraphStatus::Empty);
    assert!(network.nodes.is_empty());
}

#[test]
fn test_map_printers() {
    let catalog = load_catalog();
    let spec = FilterSpec::new(1655, 1675);
    let names: Vec<String> = catalog
        .directory()
        .visible(&spec)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["P2", "P3"]);
}
