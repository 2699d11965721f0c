//! Whole-pipeline behaviour on in-memory units.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use pyl_pass::{OptLevel, PassConfig, SourceUnit, Unit};
use pylc::input::InputFile;
use pylc::Pipeline;

fn optimize(level: OptLevel, source: &str) -> String {
    let mut pipeline = Pipeline::new(PassConfig::with_level(level), 100).with_default_passes();
    pipeline.add_source(SourceUnit::new("main.py", source));
    let outputs = pipeline.transform().unwrap();
    match outputs.as_slice() {
        [Unit::Source(unit)] => unit.text.clone(),
        other => panic!("expected one source unit, got {other:?}"),
    }
}

#[test]
fn constant_branches_are_resolved() {
    let source = "if True:\n    x = 1\nelse:\n    x = 2\n";
    assert_eq!(optimize(OptLevel::O1, source), "x = 1\n");
}

#[test]
fn unfolded_loops_with_dead_results_vanish() {
    let source = "y = 0\nfor i in range(3):\n    y += i\n";
    assert_eq!(optimize(OptLevel::O2, source), "");
    assert_eq!(optimize(OptLevel::O1, source), source);
}

#[test]
fn folded_calls_with_dead_results_vanish() {
    let source = "def f():\n    return 1\n\nz = f()\n";
    assert_eq!(optimize(OptLevel::O3, source), "");
}

#[test]
fn level_zero_only_reformats() {
    assert_eq!(optimize(OptLevel::O0, "x = (1 + 2)\n"), "x = 1 + 2\n");
}

#[test]
fn folding_feeds_dead_code_elimination() {
    let source = "if 2 * 3 > 5:\n    print('big')\nelse:\n    print('small')\n";
    assert_eq!(optimize(OptLevel::O1, source), "print('big')\n");
}

#[test]
fn a_second_run_changes_nothing() {
    let programs = [
        "x = 1 + 2\nprint(x * 2)\n",
        "y = 0\nfor i in range(3):\n    y += i\nprint(y)\n",
        "c = input()\nif c:\n    print(1)\nelse:\n    print(2)\n",
        "def total(n):\n    s = 0\n    for i in range(n):\n        s += i\n    return s\n\nprint(total(4))\n",
        "class A:\n    \"\"\"Doc.\"\"\"\n    x: int = 1\n\nprint(A.x)\n",
    ];
    for level in OptLevel::ALL {
        for source in programs {
            let once = optimize(level, source);
            let twice = optimize(level, &once);
            assert_eq!(once, twice, "{level} on {source:?}");
        }
    }
}

#[test]
fn every_unit_is_kept_in_order() {
    let mut pipeline = Pipeline::new(PassConfig::with_level(OptLevel::O1), 100).with_default_passes();
    pipeline.add_source(SourceUnit::new("a.py", "x = 1 + 1\n"));
    pipeline.add_source(SourceUnit::new("b.py", "'pylang: skip'\nx = 1 + 1\n"));
    pipeline.add_source(SourceUnit::new("c.py", "x = (\n"));
    let outputs = pipeline.transform().unwrap();

    let texts: Vec<(PathBuf, String)> = outputs
        .into_iter()
        .map(|unit| match unit {
            Unit::Source(source) => (source.path, source.text),
            Unit::Artifact(artifact) => panic!("unexpected artifact {}", artifact.path.display()),
        })
        .collect();
    assert_eq!(
        texts,
        [
            (PathBuf::from("a.py"), "x = 2\n".to_owned()),
            (PathBuf::from("b.py"), "'pylang: skip'\nx = 1 + 1\n".to_owned()),
            (PathBuf::from("c.py"), "x = (\n".to_owned()),
        ]
    );
}

#[test]
fn missing_files_are_dropped() {
    let mut pipeline = Pipeline::new(PassConfig::default(), 100);
    let added = pipeline.add_file(&InputFile {
        path: PathBuf::from("/nonexistent/gone.py"),
        relative: PathBuf::from("gone.py"),
    });
    assert!(!added);
    assert!(pipeline.transform().unwrap().is_empty());
}

#[test]
fn tight_cycle_caps_are_errors() {
    let mut pipeline = Pipeline::new(PassConfig::with_level(OptLevel::O1), 1).with_default_passes();
    pipeline.add_source(SourceUnit::new("main.py", "x = 1 + 2\n"));
    let err = pipeline.transform().unwrap_err();
    assert_eq!(err.to_string(), "no fixed point after 1 cycles");
}
