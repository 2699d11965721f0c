use pretty_assertions::assert_eq;

use super::*;
use crate::test_util::run_once;

fn fold(source: &str) -> String {
    run_once(&mut BuiltinFolding, source).text
}

#[test]
fn pure_builtins_over_literals_fold() {
    assert_eq!(fold("x = len('abc')\n"), "x = 3\n");
    assert_eq!(fold("x = max(1, 5, 2)\n"), "x = 5\n");
    assert_eq!(fold("x = sorted((3, 1, 2))\n"), "x = [1, 2, 3]\n");
    assert_eq!(fold("x = abs(-4)\n"), "x = 4\n");
    assert_eq!(fold("x = int('12')\n"), "x = 12\n");
}

#[test]
fn keyword_arguments_are_passed_through() {
    assert_eq!(fold("x = sum([1, 2], start=10)\n"), "x = 13\n");
}

#[test]
fn nested_calls_fold_inside_out() {
    assert_eq!(fold("x = len(sorted([3, 1]))\n"), "x = 2\n");
}

#[test]
fn non_literal_arguments_are_kept() {
    assert_eq!(fold("x = len(y)\n"), "x = len(y)\n");
    assert_eq!(fold("x = max(*xs)\n"), "x = max(*xs)\n");
    assert_eq!(fold("x = max(1, **kw)\n"), "x = max(1, **kw)\n");
}

#[test]
fn impure_builtins_are_kept() {
    assert_eq!(fold("print(1)\n"), "print(1)\n");
    assert_eq!(fold("x = open('f')\n"), "x = open('f')\n");
}

#[test]
fn rebound_builtins_are_kept() {
    let source = "def len(x):\n    return 0\n\nx = len('abc')\n";
    assert_eq!(fold(source), source);
    let source = "from m import *\nx = len('abc')\n";
    assert_eq!(fold(source), source);
}

#[test]
fn raising_calls_are_flagged_and_kept() {
    let outcome = run_once(&mut BuiltinFolding, "x = max([])\n");
    assert_eq!(outcome.text, "x = max([])\n");
    assert_eq!(outcome.changes, 0);
    assert_eq!(outcome.messages, vec!["ValueError: max() iterable argument is empty".to_owned()]);
}
