use pretty_assertions::assert_eq;

use super::*;
use crate::test_util::{predict, predict_with};

fn text(source: &str) -> String {
    predict(source).text
}

#[test]
fn known_names_become_literals() {
    assert_eq!(text("x = 3\ny = x * 2\nprint(y)\n"), "print(6)\n");
}

#[test]
fn unused_results_disappear() {
    assert_eq!(text("def f():\n    return 1\n\nz = f()\n"), "");
}

#[test]
fn undecided_branches_merge() {
    let source = "c = input()\nif c:\n    x = 1\nelse:\n    x = 2\nprint(x)\n";
    assert_eq!(text(source), source);
}

#[test]
fn branch_tests_are_written_back() {
    assert_eq!(text("DEBUG = False\nif DEBUG:\n    print(1)\n"), "if False:\n    print(1)\n");
}

#[test]
fn runaway_recursion_is_reported_once() {
    let source = "def f(n):\n    return f(n + 1)\n\nx = f(0)\nprint(x)\n";
    let outcome = predict(source);
    assert_eq!(outcome.text, source);
    assert_eq!(outcome.messages, [OVERFLOW_MESSAGE]);
}

#[test]
fn uncaught_exception_abandons_the_unit() {
    let source = "def f():\n    return 1 / 0\n\nx = f()\n";
    let outcome = predict(source);
    assert_eq!(outcome.text, source);
    assert_eq!(outcome.messages, ["(Simulation) ZeroDivisionError: division by zero"]);
}

#[test]
fn handlers_catch_simulated_exceptions() {
    let source = "def f(n):\n    try:\n        return 10 // n\n    except ZeroDivisionError:\n        return -1\n\nprint(f(0))\n";
    assert_eq!(text(source), "print(-1)\n");
}

#[test]
fn exceptions_from_callees_reach_the_caller_handler() {
    let source = "def inv(n):\n    return 1 // n\n\ndef safe(n):\n    try:\n        return inv(n)\n    except ZeroDivisionError:\n        return 0\n\nprint(safe(0))\n";
    let outcome = predict(source);
    assert!(outcome.text.ends_with("print(0)\n"), "{}", outcome.text);
    assert!(outcome.messages.is_empty());
}

#[test]
fn finally_runs_after_return() {
    let source = "def f():\n    x = 1\n    try:\n        return x\n    finally:\n        x = 2\n\nprint(f())\n";
    assert_eq!(text(source), "print(1)\n");
}

#[test]
fn closures_see_their_defining_frame() {
    let source = "def outer(a):\n    def inner(b):\n        return a + b\n    return inner(3)\n\nprint(outer(3))\n";
    assert_eq!(text(source), "print(6)\n");
}

#[test]
fn reading_a_local_before_binding() {
    let source = "def f():\n    print(x)\n    x = 1\n\nf()\n";
    let outcome = predict(source);
    assert_eq!(outcome.text, source);
    assert_eq!(
        outcome.messages,
        ["(Simulation) UnboundLocalError: cannot access local variable 'x' where it is not associated with a value"]
    );
}

#[test]
fn loops_over_range_run_to_completion() {
    let source = "def total(n):\n    s = 0\n    for i in range(n):\n        s += i\n    return s\n\nprint(total(4))\n";
    assert_eq!(text(source), "print(6)\n");
}

#[test]
fn while_loops_and_break() {
    let source = "def first(n):\n    i = 0\n    while True:\n        if i * i > n:\n            break\n        i += 1\n    return i\n\nprint(first(10))\n";
    assert_eq!(text(source), "print(4)\n");
}

#[test]
fn side_effects_keep_the_call() {
    let source = "def f():\n    print('hi')\n    return 1\n\nx = f()\nprint(x)\n";
    assert_eq!(text(source), "def f():\n    print('hi')\n    return 1\n\nf()\nprint(1)\n");
}

#[test]
fn dynamic_namespaces_are_left_alone() {
    let source = "x = 1\nprint(locals())\n";
    assert_eq!(text(source), source);
}

#[test]
fn names_used_by_functions_stay() {
    let source = "x = 1\n\ndef f():\n    return x\n\nprint(f)\n";
    assert_eq!(text(source), source);
}

#[test]
fn unread_functions_release_their_names() {
    assert_eq!(text("x = 1\ndef f():\n    return x\n"), "");
}

#[test]
fn exported_names_stay() {
    let source = "__all__ = ['x']\nx = 1\n";
    assert_eq!(text(source), source);
}

#[test]
fn module_loops_forget_what_they_assign() {
    let source = "n = 0\nfor i in range(3):\n    n += 1\nprint(n)\n";
    assert_eq!(text(source), source);
}

#[test]
fn default_arguments_fill_missing_parameters() {
    let source = "def add(a, b=2):\n    return a + b\n\nprint(add(1))\n";
    assert_eq!(text(source), "print(3)\n");
}

#[test]
fn keyword_arguments_bind_by_name() {
    let source = "def sub(a, b):\n    return a - b\n\nprint(sub(b=1, a=5))\n";
    assert_eq!(text(source), "print(4)\n");
}

#[test]
fn unpacking_in_calls() {
    let source = "def f(p):\n    a, *_, b = p\n    return a * b\n\nprint(f((3, 0, 4)))\n";
    assert_eq!(text(source), "print(12)\n");
}

#[test]
fn bad_calls_are_flagged() {
    let source = "def f(a, b):\n    return a\n\nf(1)\n";
    let outcome = predict(source);
    assert_eq!(outcome.text, source);
    assert_eq!(
        outcome.messages,
        ["TypeError: f() missing 1 required positional argument: 'b'"]
    );

    let outcome = predict("def g(a):\n    return a\n\ng(1, 2)\n");
    assert_eq!(
        outcome.messages,
        ["TypeError: g() takes 1 positional argument but 2 were given"]
    );

    let outcome = predict("def h(a):\n    return a\n\nh(1, c=2)\n");
    assert_eq!(outcome.messages, ["TypeError: h() got an unexpected keyword argument 'c'"]);
}

#[test]
fn generators_are_not_simulated() {
    let source = "def gen():\n    yield 1\n\ng = gen()\nprint(g)\n";
    assert_eq!(text(source), source);
}

#[test]
fn spinning_calls_give_up_quietly() {
    let source = "def spin():\n    while True:\n        pass\n\nx = spin()\nprint(x)\n";
    let outcome = predict(source);
    assert_eq!(outcome.text, source);
    assert!(outcome.messages.is_empty());
}

#[test]
fn single_return_functions_are_inlined() {
    let source = "def f():\n    return y + 1\n\ny = int(input())\nprint(f())\n";
    assert_eq!(text(source), "y = int(input())\nprint(y + 1)\n");
}

#[test]
fn module_level_errors_are_flagged() {
    let outcome = predict("x = 1 // 0\n");
    assert_eq!(outcome.messages, ["ZeroDivisionError: integer division or modulo by zero"]);
}

#[test]
fn placeholders_are_stripped() {
    assert_eq!(text("pass\nx = input()\nif x:\n    pass\n    print(x)\n"), "x = input()\nif x:\n    print(x)\n");
}

#[test]
fn shallow_depth_limit() {
    let config = PassConfig {
        max_predict_depth: 2,
        ..PassConfig::with_level(OptLevel::O3)
    };
    let source = "def a():\n    return b()\n\ndef b():\n    return c()\n\ndef c():\n    return 1\n\nprint(a())\n";
    let outcome = predict_with(source, &config);
    assert_eq!(outcome.messages, [OVERFLOW_MESSAGE]);
}
