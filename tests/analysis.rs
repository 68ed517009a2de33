//! Throw trees and reports over the sample program.

use raise_this::analysis::{Leaf, ProgramIndex, SourceLoc, TryBlockId};
use raise_this::scenario::sample_index;
use raise_this::PayloadKind;

fn index() -> ProgramIndex {
    sample_index().expect("sample program is well formed")
}

fn at(line: u32, column: u32) -> SourceLoc {
    SourceLoc::new("sample_proj/src/main.cpp", line, column)
}

#[test]
fn test_throwers_in_source_order() {
    let index = index();
    let sites: Vec<_> = index
        .throwers()
        .iter()
        .map(|t| (t.function.as_str(), t.loc.line, t.kind))
        .collect();
    assert_eq!(
        sites,
        vec![
            ("foo", 11, Some(PayloadKind::Int)),
            ("foo", 13, Some(PayloadKind::Record)),
            ("bar", 28, Some(PayloadKind::Int)),
        ]
    );
}

#[test]
fn test_int_raise_caught_by_int_clause_or_escapes() {
    let index = index();
    let tree = index.throw_tree(&index.throwers()[0]);

    let uncaught_in = |f: &str| Leaf::Uncaught { function: f.into() };
    assert_eq!(
        tree.leaves,
        vec![
            // through baz, then bar, which only bar calls
            uncaught_in("bar"),
            // bar's two direct calls
            uncaught_in("bar"),
            uncaught_in("bar"),
            Leaf::Caught {
                try_block: TryBlockId(0),
                clause: 1,
                function: "main".into(),
                loc: at(47, 5),
            },
            uncaught_in("main"),
        ]
    );
    assert!(!tree.is_fully_caught());
}

#[test]
fn test_record_raise_caught_by_record_clause() {
    let index = index();
    let tree = index.throw_tree(&index.throwers()[1]);

    assert_eq!(
        tree.leaves[3],
        Leaf::Caught {
            try_block: TryBlockId(0),
            clause: 0,
            function: "main".into(),
            loc: at(42, 5),
        }
    );
    assert_eq!(tree.leaves[4], Leaf::Uncaught { function: "main".into() });
    assert_eq!(tree.leaves.iter().filter(|l| l.is_caught()).count(), 1);
}

#[test]
fn test_tree_follows_every_caller() {
    let index = index();
    let tree = index.throw_tree(&index.throwers()[0]);
    let callers: Vec<_> = tree
        .root
        .children
        .iter()
        .map(|c| (c.function.as_str(), c.loc.line))
        .collect();
    assert_eq!(callers, vec![("baz", 19), ("bar", 25), ("bar", 29), ("main", 40), ("main", 55)]);

    // baz is reached only through bar, which only bar calls.
    let baz = &tree.root.children[0];
    assert_eq!(baz.children[0].function, "bar");
    assert!(baz.children[0].children.is_empty());
}

#[test]
fn test_self_recursive_raise_is_uncaught() {
    let index = index();
    let tree = index.throw_tree(&index.throwers()[2]);
    assert_eq!(tree.leaves, vec![Leaf::Uncaught { function: "bar".into() }]);
    assert!(!tree.is_fully_caught());
    assert_eq!(tree.root.children.len(), 1);
    assert_eq!(tree.root.children[0].loc, at(26, 5));
}

#[test]
fn test_call_graph_report() {
    let index = index();
    let report = index.call_graph_report().to_string();

    assert!(report.contains("Node: foo (main.cpp:7:1)"));
    assert!(report.contains("  caller: main at main.cpp:40:9 [try#0]"));
    assert!(report.contains("  caller: main at main.cpp:55:5 []"));
    assert!(report.contains("  calls:  bar at main.cpp:26:5 []"));
}

#[test]
fn test_throw_tree_report() {
    let index = index();
    let report = index.throw_tree_report().to_string();
    let lines: Vec<_> = report.lines().collect();

    assert_eq!(lines[0], "throw: main.cpp:11:9 : i32");
    assert_eq!(lines[1], "  catch: uncaught in bar");
    assert_eq!(lines[4], "  catch: main.cpp:47:5 (try#0) clause 1 `i32` in main");
    assert_eq!(lines[5], "  catch: uncaught in main");
    assert_eq!(lines[6], "throw: main.cpp:13:5 : Record");
    assert_eq!(lines[10], "  catch: main.cpp:42:5 (try#0) clause 0 `Record` in main");
    assert_eq!(lines[12], "throw: main.cpp:28:5 : i32");
    assert_eq!(lines[13], "  catch: uncaught in bar");
    assert_eq!(lines.len(), 14);
}

#[test]
fn test_tree_display_indents_callers() {
    let index = index();
    let text = index.throw_tree(&index.throwers()[2]).to_string();
    assert_eq!(text, "bar main.cpp:28:5\n  bar main.cpp:26:5\n=> uncaught in bar\n");
}
