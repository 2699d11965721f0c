use pretty_assertions::assert_eq;

use super::*;
use crate::test_util::{run_fixpoint, run_once};

fn fold(source: &str) -> String {
    run_once(&mut ConstantFolding, source).text
}

#[test]
fn arithmetic_folds_bottom_up() {
    assert_eq!(fold("x = 1 + 2 * 3\n"), "x = 7\n");
    assert_eq!(fold("x = (1 + 2) * 3\n"), "x = 9\n");
    assert_eq!(fold("x = 7 // -2\n"), "x = -4\n");
    assert_eq!(fold("x = 1 / 4\n"), "x = 0.25\n");
    assert_eq!(fold("x = 'ab' * 2\n"), "x = 'abab'\n");
}

#[test]
fn displays_fold() {
    assert_eq!(fold("x = (1, 2) + (3,)\n"), "x = 1, 2, 3\n");
    assert_eq!(fold("x = [0] * 3\n"), "x = [0, 0, 0]\n");
    assert_eq!(fold("x = 2 in {1, 2}\n"), "x = True\n");
}

#[test]
fn comparisons_and_chains() {
    assert_eq!(fold("x = 1 < 2 < 3\n"), "x = True\n");
    assert_eq!(fold("x = 'a' in 'abc'\n"), "x = True\n");
    assert_eq!(fold("x = 3 == 3.0 != 4\n"), "x = True\n");
    assert_eq!(fold("x = y < 2\n"), "x = y < 2\n");
}

#[test]
fn unary_operators() {
    assert_eq!(fold("x = not 0\n"), "x = True\n");
    assert_eq!(fold("x = ~5\n"), "x = -6\n");
    assert_eq!(fold("x = -(-5)\n"), "x = 5\n");
}

#[test]
fn signed_numbers_are_left_alone() {
    let outcome = run_once(&mut ConstantFolding, "x = -5\ny = -2.5\n");
    assert_eq!(outcome.text, "x = -5\ny = -2.5\n");
    assert_eq!(outcome.changes, 0);
}

#[test]
fn runtime_errors_are_flagged_not_folded() {
    let outcome = run_fixpoint(&mut ConstantFolding, "x = 1 / 0\ny = 1 + 'a'\n");
    assert_eq!(outcome.text, "x = 1 / 0\ny = 1 + 'a'\n");
    assert_eq!(outcome.changes, 0);
    assert_eq!(
        outcome.messages,
        vec![
            "ZeroDivisionError: division by zero".to_owned(),
            "TypeError: unsupported operand type(s) for +: 'int' and 'str'".to_owned(),
        ]
    );
}

#[test]
fn undecidable_operations_stay_silently() {
    let outcome = run_once(&mut ConstantFolding, "x = 2 ** 100\ny = 1 is 1\n");
    assert_eq!(outcome.text, "x = 2 ** 100\ny = 1 is 1\n");
    assert!(outcome.messages.is_empty());
}

#[test]
fn boolean_chains() {
    assert_eq!(fold("x = a or 0 or b\n"), "x = a or b\n");
    assert_eq!(fold("x = 0 or b\n"), "x = b\n");
    assert_eq!(fold("x = 1 and b\n"), "x = b\n");
    assert_eq!(fold("x = a and 0 and b\n"), "x = a and 0\n");
    assert_eq!(fold("x = a or 1 or b\n"), "x = a or 1\n");
    assert_eq!(fold("x = a and b\n"), "x = a and b\n");
}

#[test]
fn if_tests_become_booleans() {
    assert_eq!(fold("if 1:\n    pass\n"), "if True:\n    pass\n");
    assert_eq!(fold("if []:\n    pass\n"), "if False:\n    pass\n");
    let outcome = run_once(&mut ConstantFolding, "if True:\n    pass\n");
    assert_eq!(outcome.changes, 0);
}

#[test]
fn folding_reaches_a_fixed_point() {
    let outcome = run_fixpoint(&mut ConstantFolding, "x = (1 + 2) * (3 - 4)\n");
    assert_eq!(outcome.text, "x = -3\n");
    let again = run_once(&mut ConstantFolding, &outcome.text);
    assert_eq!(again.changes, 0);
}
