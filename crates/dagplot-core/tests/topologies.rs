//! Known-topology regressions for the build → layout pipeline.

use dagplot_core::{
    Dependency, Extent, Forest, GraphError, build, count_nodes, layout, parse_all,
    unconsumed_dependencies,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn forest_from(lines: &[&str]) -> Forest {
    let mut deps = parse_all(lines).expect("parse");
    let mut forest = build(&mut deps).expect("build");
    layout(&mut forest).expect("layout");
    forest
}

fn root_names(forest: &Forest) -> Vec<&str> {
    forest
        .roots()
        .iter()
        .map(|&id| forest.node(id).name())
        .collect()
}

fn x_of(forest: &Forest, name: &str) -> usize {
    forest
        .get(name)
        .and_then(|n| n.x())
        .unwrap_or_else(|| panic!("{name} has no column"))
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[test]
fn diamond() {
    let forest = forest_from(&["a>b", "a>c", "b>d", "c>d"]);

    assert_eq!(count_nodes(&forest), 4);
    assert_eq!(root_names(&forest), ["a"]);

    let d = forest.id_of("d").expect("d");
    assert_eq!(forest.ancestor_names(d), ["b", "c"]);
    assert_eq!(x_of(&forest, "d"), 2);
}

#[test]
fn child_declared_before_parent() {
    let forest = forest_from(&["b>c", "a>b"]);
    assert_eq!(root_names(&forest), ["a"]);
    assert_eq!(x_of(&forest, "c"), 2);
}

#[test]
fn uneven_branches_use_longest_path() {
    let forest = forest_from(&["a>b", "a>c", "b>e", "c>d", "d>e"]);
    assert_eq!(x_of(&forest, "b"), 1);
    assert_eq!(x_of(&forest, "d"), 2);
    assert_eq!(x_of(&forest, "e"), 3);
}

#[test]
fn single_standalone_node() {
    let forest = forest_from(&["a"]);
    assert_eq!(root_names(&forest), ["a"]);
    assert_eq!(count_nodes(&forest), 1);
    let a = forest.get("a").expect("a");
    assert_eq!(a.position(), Some((0, 0)));
    assert_eq!(forest.extent(), Extent { columns: 1, rows: 1 });
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let forest = forest_from(&["# header", "", "a > b", "   ", "b>c"]);
    assert_eq!(count_nodes(&forest), 3);
    assert_eq!(forest.unconsumed(), 0);
}

#[test]
fn empty_input_gives_empty_forest() {
    let forest = forest_from(&[]);
    assert!(forest.is_empty());
    assert_eq!(forest.extent(), Extent::default());
}

#[test]
fn multiple_roots_share_a_sink() {
    let forest = forest_from(&["build>test", "lint>test", "test>ship", "docs"]);
    assert_eq!(root_names(&forest), ["build", "lint", "docs"]);
    assert_eq!(count_nodes(&forest), 5);
    assert_eq!(x_of(&forest, "ship"), 2);
    assert_eq!(x_of(&forest, "docs"), 0);

    let rows: Vec<usize> = ["build", "test", "ship", "lint", "docs"]
        .iter()
        .map(|n| forest.get(n).and_then(|node| node.y()).expect("row"))
        .collect();
    assert_eq!(rows, [0, 1, 2, 3, 4]);
}

// ---------------------------------------------------------------------------
// Failure and orphan handling
// ---------------------------------------------------------------------------

#[test]
fn cycle_below_a_root_is_rejected() {
    let mut deps = parse_all(["r>a", "a>b", "b>c", "c>a"]).expect("parse");
    let err = build(&mut deps).expect_err("cycle");
    let GraphError::Cycle { repeated_name, path } = err;
    assert_eq!(repeated_name, "a");
    assert_eq!(path, ["a", "b", "c", "a"]);
}

#[test]
fn rootless_cycle_is_rejected() {
    let mut deps = parse_all(["a>b", "b>c", "c>a"]).expect("parse");
    assert!(matches!(build(&mut deps), Err(GraphError::Cycle { .. })));
}

#[test]
fn self_loop_is_orphaned() {
    let mut deps = parse_all(["a>b", "b>b"]).expect("parse");
    let mut forest = build(&mut deps).expect("build");
    layout(&mut forest).expect("layout");

    assert_eq!(count_nodes(&forest), 2);
    assert_eq!(forest.unconsumed(), 1);
    let orphans: Vec<&Dependency> = unconsumed_dependencies(&deps).collect();
    assert_eq!(orphans.len(), 1);
    assert!(orphans[0].is_self_loop());
}
