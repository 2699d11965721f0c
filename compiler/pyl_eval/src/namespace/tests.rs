use pretty_assertions::assert_eq;

use super::*;
use pyl_object::Object;

fn int(n: i64) -> Value {
    Value::Constant(Object::Int(n))
}

fn stack() -> ScopeStack {
    let mut builtins = Namespace::new(NodeId::new(0));
    builtins.bind("len", Value::Unknown);
    ScopeStack::new(Namespace::new(NodeId::new(0)), builtins)
}

#[test]
fn rebinding_keeps_insertion_order() {
    let mut ns = Namespace::new(NodeId::new(0));
    ns.bind("a", int(1));
    ns.bind("b", int(2));
    ns.bind("a", int(3));
    let snapshot = ns.snapshot();
    let names: Vec<&str> = snapshot.keys().map(String::as_str).collect();
    assert_eq!(names, ["a", "b"]);
    assert!(matches!(ns.get("a").map(Variable::peek), Some(Value::Constant(Object::Int(3)))));
}

#[test]
fn restore_swaps_bindings() {
    let mut ns = Namespace::new(NodeId::new(0));
    ns.bind("a", int(1));
    let saved = ns.snapshot();
    ns.bind("b", int(2));
    let replaced = ns.restore(saved);
    assert_eq!(replaced.len(), 2);
    assert!(ns.get("b").is_none());
    assert!(ns.remove("a").is_some());
    assert!(ns.get("a").is_none());
}

#[test]
fn lookup_walks_the_lexical_chain() {
    let mut scopes = stack();
    scopes.global().borrow_mut().bind("g", int(1));
    let parent = scopes.global().clone();
    let locals = ["x".to_owned()].into_iter().collect();
    scopes.push(Namespace::with_parent(NodeId::new(1), parent, locals));
    assert_eq!(scopes.depth(), 1);
    assert!(matches!(scopes.lookup("g"), Lookup::Found(_)));
    assert!(matches!(scopes.lookup("x"), Lookup::Unbound));
    assert!(matches!(scopes.lookup("len"), Lookup::Builtin(_)));
    assert!(matches!(scopes.lookup("nope"), Lookup::Missing));
    scopes.current().borrow_mut().bind("x", int(2));
    assert!(matches!(scopes.lookup("x"), Lookup::Found(_)));
    scopes.pop();
    assert_eq!(scopes.depth(), 0);
    assert!(matches!(scopes.lookup("x"), Lookup::Missing));
}

#[test]
fn post_tasks_come_back_in_order() {
    let mut scopes = stack();
    scopes.push(Namespace::new(NodeId::new(1)));
    for index in 1..=2 {
        let variable = scopes.current().borrow_mut().bind("v", int(index));
        scopes.current().borrow_mut().on_exit(PostTask {
            variable,
            statement: NodeId::new(u32::try_from(index).unwrap_or_default()),
            target: None,
            pure: true,
        });
    }
    let tasks = scopes.pop();
    let statements: Vec<NodeId> = tasks.iter().map(|task| task.statement).collect();
    assert_eq!(statements, [NodeId::new(1), NodeId::new(2)]);
    assert!(scopes.pop().is_empty());
}

#[test]
fn shared_scopes_compare_by_identity() {
    let a = LocalScope::new(Namespace::new(NodeId::new(0)));
    let b = LocalScope::new(Namespace::new(NodeId::new(0)));
    assert!(a.ptr_eq(&a.clone()));
    assert!(!a.ptr_eq(&b));
}
