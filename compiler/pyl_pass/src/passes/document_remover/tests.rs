use pretty_assertions::assert_eq;

use super::*;
use crate::test_util::run_once;

fn strip(source: &str) -> String {
    run_once(&mut DocumentRemover, source).text
}

#[test]
fn docstrings_leave_every_body() {
    let source = "\
'''Module.'''
import os
def f(a):
    'Doc.'
    return a
class C:
    \"\"\"Doc.\"\"\"
    x = 1
";
    assert_eq!(
        strip(source),
        "import os\n\ndef f(a):\n    return a\n\nclass C:\n    x = 1\n"
    );
}

#[test]
fn emptied_definitions_get_pass() {
    assert_eq!(strip("def f():\n    'only a docstring'\n"), "def f():\n    pass\n");
    assert_eq!(strip("class C:\n    'only a docstring'\n"), "class C:\n    pass\n");
}

#[test]
fn empty_module_stays_empty() {
    assert_eq!(strip("'just a docstring'\n"), "");
}

#[test]
fn strings_in_nested_blocks_stay() {
    let source = "if x:\n    'kept'\n";
    assert_eq!(strip(source), source);
}

#[test]
fn signature_annotations_go() {
    assert_eq!(
        strip("def f(a: int, *args: str, b: 'T' = 1, **kw: dict) -> None:\n    pass\n"),
        "def f(a, *args, b=1, **kw):\n    pass\n"
    );
}

#[test]
fn annotated_assignments_outside_classes() {
    assert_eq!(strip("x: int = 1\ny: str\n"), "x = 1\n");
    assert_eq!(strip("def f():\n    z: int = 2\n    return z\n"), "def f():\n    z = 2\n    return z\n");
}

#[test]
fn class_annotations_are_fields() {
    let source = "class P:\n    x: int\n    y: int = 0\n    def m(self):\n        t: int = 1\n        return t\n";
    assert_eq!(
        strip(source),
        "class P:\n    x: int\n    y: int = 0\n    def m(self):\n        t = 1\n        return t\n"
    );
}

#[test]
fn nothing_to_remove_is_no_change() {
    let outcome = run_once(&mut DocumentRemover, "def f(a):\n    return a\n");
    assert_eq!(outcome.changes, 0);
}
