use pretty_assertions::assert_eq;

use super::*;
use crate::test_util::{run_fixpoint, run_once};

fn prune(source: &str) -> String {
    run_once(&mut UnusedVariableRemover, source).text
}

fn assert_unchanged(source: &str) {
    let outcome = run_once(&mut UnusedVariableRemover, source);
    assert_eq!(outcome.text, source);
    assert_eq!(outcome.changes, 0);
}

#[test]
fn dead_literal_store_goes() {
    assert_eq!(
        prune("def f():\n    x = 1\n    y = 2\n    return y\n"),
        "def f():\n    y = 2\n    return y\n"
    );
}

#[test]
fn conditional_reads_keep_the_store() {
    assert_unchanged("def f(c):\n    x = 1\n    if c:\n        print(x)\n");
    assert_unchanged("def f():\n    x = 1\n    return f'{x}'\n");
}

#[test]
fn while_tests_count_as_reads() {
    assert_unchanged("def f():\n    n = 3\n    while n:\n        n -= 1\n");
}

#[test]
fn declared_and_captured_names_survive() {
    assert_unchanged("def f():\n    global g\n    g = 1\n");
    assert_unchanged("def f():\n    x = 1\n    def g():\n        return x\n    return g\n");
    assert_unchanged("def f(a):\n    a = 1\n");
    assert_unchanged("def f():\n    x = 1\n    del x\n");
}

#[test]
fn dynamic_scopes_are_skipped() {
    assert_unchanged("def f():\n    x = 1\n    return locals()\n");
}

#[test]
fn non_literal_values_stay() {
    assert_unchanged("def f():\n    x = g()\n");
}

#[test]
fn augmented_assignment_keeps_effects() {
    assert_eq!(prune("def f():\n    x = 0\n    x += g()\n"), "def f():\n    g()\n");
}

#[test]
fn annotated_stores() {
    assert_eq!(prune("def f():\n    x: int = 1\n    y: int\n"), "def f():\n    pass\n");
}

#[test]
fn one_of_several_targets() {
    assert_eq!(
        prune("def f():\n    a = b = 1\n    return b\n"),
        "def f():\n    b = 1\n    return b\n"
    );
}

#[test]
fn module_level_stores() {
    assert_eq!(prune("y = 0\ny += 1\n"), "");
    assert_unchanged("__all__ = ['y']\ny = 0\n");
    assert_unchanged("__version__ = '1'\n");
    assert_unchanged("y = 0\n\ndef f():\n    return y\n");
}

#[test]
fn class_bodies_are_untouched() {
    assert_unchanged("class C:\n    x = 1\n");
}

#[test]
fn unfolded_loop_disappears() {
    let source = "y = 0\ni = 0\ny += i\ni = 1\ny += i\n";
    assert_eq!(run_fixpoint(&mut UnusedVariableRemover, source).text, "");
}
