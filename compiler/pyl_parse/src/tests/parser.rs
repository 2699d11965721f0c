//! Core parser tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use pyl_ir::{
    BoolOperator, CmpOperator, ExprContext, Literal, NodeId, NodeKind, Operator, Span, Tree, UnaryOperator,
};

use crate::{parse, parse_expression_into, parse_statements_into};

fn body(tree: &Tree) -> Vec<NodeId> {
    tree.body().to_vec()
}

/// The expression of the single expression statement in `source`.
fn expr(source: &str) -> (Tree, NodeId) {
    let tree = parse(source).unwrap();
    let stmts = body(&tree);
    assert_eq!(stmts.len(), 1);
    match tree.kind(stmts[0]) {
        NodeKind::Expr { value } => {
            let value = *value;
            (tree, value)
        }
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn name_of(tree: &Tree, id: NodeId) -> &str {
    match tree.kind(id) {
        NodeKind::Name { id, .. } => id,
        other => panic!("expected name, got {other:?}"),
    }
}

#[test]
fn test_empty_module() {
    let tree = parse("").unwrap();
    assert!(body(&tree).is_empty());
    let tree = parse("\n\n# only a comment\n").unwrap();
    assert!(body(&tree).is_empty());
}

#[test]
fn test_root_spans_whole_source() {
    let source = "x = 1\ny = 2\n";
    let tree = parse(source).unwrap();
    assert_eq!(tree.span(tree.root()), Span::new(0, 12));
}

#[test]
fn test_precedence() {
    let (tree, id) = expr("1 + 2 * 3");
    let NodeKind::BinOp { left, op, right } = tree.kind(id) else {
        panic!("expected binop");
    };
    assert_eq!(*op, Operator::Add);
    assert_eq!(tree.kind(*left).as_literal(), Some(&Literal::Int(1)));
    assert!(matches!(tree.kind(*right), NodeKind::BinOp { op: Operator::Mult, .. }));
}

#[test]
fn test_power_is_right_associative_and_binds_tighter_than_unary() {
    let (tree, id) = expr("-2 ** 3 ** 2");
    let NodeKind::UnaryOp { op, operand } = tree.kind(id) else {
        panic!("expected unary op");
    };
    assert_eq!(*op, UnaryOperator::USub);
    let NodeKind::BinOp { op, right, .. } = tree.kind(*operand) else {
        panic!("expected power");
    };
    assert_eq!(*op, Operator::Pow);
    assert!(matches!(tree.kind(*right), NodeKind::BinOp { op: Operator::Pow, .. }));
}

#[test]
fn test_left_associative_subtraction() {
    let (tree, id) = expr("a - b - c");
    let NodeKind::BinOp { left, right, .. } = tree.kind(id) else {
        panic!("expected binop");
    };
    assert_eq!(name_of(&tree, *right), "c");
    assert!(matches!(tree.kind(*left), NodeKind::BinOp { op: Operator::Sub, .. }));
}

#[test]
fn test_chained_comparison() {
    let (tree, id) = expr("a < b <= c is not d not in e");
    let NodeKind::Compare { ops, comparators, .. } = tree.kind(id) else {
        panic!("expected compare");
    };
    assert_eq!(
        ops,
        &vec![CmpOperator::Lt, CmpOperator::LtE, CmpOperator::IsNot, CmpOperator::NotIn]
    );
    assert_eq!(comparators.len(), 4);
}

#[test]
fn test_boolean_operators_flatten() {
    let (tree, id) = expr("a or b or not c and d");
    let NodeKind::BoolOp { op, values } = tree.kind(id) else {
        panic!("expected boolop");
    };
    assert_eq!(*op, BoolOperator::Or);
    assert_eq!(values.len(), 3);
    assert!(matches!(tree.kind(values[2]), NodeKind::BoolOp { op: BoolOperator::And, .. }));
}

#[test]
fn test_conditional_expression_and_lambda() {
    let (tree, id) = expr("lambda x, y=2: x if y else -x");
    let NodeKind::Lambda { params, body } = tree.kind(id) else {
        panic!("expected lambda");
    };
    assert_eq!(params.args.len(), 2);
    assert!(params.args[1].default.is_some());
    assert!(matches!(tree.kind(*body), NodeKind::IfExp { .. }));
}

#[test]
fn test_call_arguments() {
    let (tree, id) = expr("f(a, *b, c=1, **d)");
    let NodeKind::Call { func, args, keywords } = tree.kind(id) else {
        panic!("expected call");
    };
    assert_eq!(name_of(&tree, *func), "f");
    assert_eq!(args.len(), 2);
    assert!(matches!(tree.kind(args[1]), NodeKind::Starred { .. }));
    assert_eq!(keywords.len(), 2);
    assert_eq!(keywords[0].arg.as_deref(), Some("c"));
    assert_eq!(keywords[1].arg, None);
}

#[test]
fn test_generator_as_sole_argument() {
    let (tree, id) = expr("sum(x for x in range(3) if x)");
    let NodeKind::Call { args, .. } = tree.kind(id) else {
        panic!("expected call");
    };
    let NodeKind::GeneratorExp { generators, .. } = tree.kind(args[0]) else {
        panic!("expected generator");
    };
    assert_eq!(generators.len(), 1);
    assert_eq!(generators[0].ifs.len(), 1);
    assert!(matches!(
        tree.kind(generators[0].target),
        NodeKind::Name { ctx: ExprContext::Store, .. }
    ));
}

#[test]
fn test_subscripts_and_slices() {
    let (tree, id) = expr("a[1:2, ::3]");
    let NodeKind::Subscript { slice, .. } = tree.kind(id) else {
        panic!("expected subscript");
    };
    let NodeKind::Tuple { elts, .. } = tree.kind(*slice) else {
        panic!("expected tuple slice");
    };
    let NodeKind::Slice { lower, upper, step } = tree.kind(elts[1]) else {
        panic!("expected slice");
    };
    assert!(lower.is_none() && upper.is_none() && step.is_some());
}

#[test]
fn test_displays_and_comprehensions() {
    let (tree, id) = expr("[1, 2, *rest]");
    assert!(matches!(tree.kind(id), NodeKind::List { elts, .. } if elts.len() == 3));

    let (tree, id) = expr("{1: 2, **extra}");
    let NodeKind::Dict { keys, values } = tree.kind(id) else {
        panic!("expected dict");
    };
    assert_eq!(keys.len(), 2);
    assert!(keys[1].is_none());
    assert_eq!(values.len(), 2);

    let (tree, id) = expr("{k: v for k, v in items}");
    assert!(matches!(tree.kind(id), NodeKind::DictComp { .. }));

    let (tree, id) = expr("{x for x in y}");
    assert!(matches!(tree.kind(id), NodeKind::SetComp { .. }));

    let (tree, id) = expr("{1, 2}");
    assert!(matches!(tree.kind(id), NodeKind::Set { elts } if elts.len() == 2));

    let (tree, id) = expr("{}");
    assert!(matches!(tree.kind(id), NodeKind::Dict { keys, .. } if keys.is_empty()));

    let (tree, id) = expr("()");
    assert!(matches!(tree.kind(id), NodeKind::Tuple { elts, .. } if elts.is_empty()));

    let (tree, id) = expr("(1,)");
    assert!(matches!(tree.kind(id), NodeKind::Tuple { elts, .. } if elts.len() == 1));
}

#[test]
fn test_adjacent_strings_concatenate() {
    let (tree, id) = expr("'a' \"b\" '''c'''");
    assert_eq!(tree.kind(id).as_literal(), Some(&Literal::Str("abc".to_owned())));
    let (tree, id) = expr("b'\\x00' b'z'");
    assert_eq!(tree.kind(id).as_literal(), Some(&Literal::Bytes(vec![0, b'z'])));
}

#[test]
fn test_numbers() {
    let (tree, id) = expr("0x1f");
    assert_eq!(tree.kind(id).as_literal(), Some(&Literal::Int(31)));
    let (tree, id) = expr("1.5");
    assert_eq!(tree.kind(id).as_literal(), Some(&Literal::Float(1.5)));
    let (tree, id) = expr("2j");
    assert_eq!(tree.kind(id).as_literal(), Some(&Literal::Imaginary(2.0)));
    let (tree, id) = expr("123456789012345678901234567890");
    assert_eq!(
        tree.kind(id).as_literal(),
        Some(&Literal::LongInt("123456789012345678901234567890".to_owned()))
    );
}

#[test]
fn test_assignment_forms() {
    let tree = parse("a = b = 1\nx, *y = z\nn += 1\nm: int = 2\n(p): int\n").unwrap();
    let stmts = body(&tree);
    assert_eq!(stmts.len(), 5);

    let NodeKind::Assign { targets, .. } = tree.kind(stmts[0]) else {
        panic!("expected assign");
    };
    assert_eq!(targets.len(), 2);
    assert!(matches!(tree.kind(targets[0]), NodeKind::Name { ctx: ExprContext::Store, .. }));

    let NodeKind::Assign { targets, .. } = tree.kind(stmts[1]) else {
        panic!("expected assign");
    };
    let NodeKind::Tuple { elts, ctx } = tree.kind(targets[0]) else {
        panic!("expected tuple target");
    };
    assert_eq!(*ctx, ExprContext::Store);
    assert!(matches!(tree.kind(elts[1]), NodeKind::Starred { ctx: ExprContext::Store, .. }));

    assert!(matches!(tree.kind(stmts[2]), NodeKind::AugAssign { op: Operator::Add, .. }));
    assert!(matches!(tree.kind(stmts[3]), NodeKind::AnnAssign { simple: true, value: Some(_), .. }));
    assert!(matches!(tree.kind(stmts[4]), NodeKind::AnnAssign { simple: false, value: None, .. }));
}

#[test]
fn test_walrus() {
    let (tree, id) = expr("(n := 10)");
    let NodeKind::NamedExpr { target, value } = tree.kind(id) else {
        panic!("expected named expression");
    };
    assert!(matches!(tree.kind(*target), NodeKind::Name { ctx: ExprContext::Store, .. }));
    assert_eq!(tree.kind(*value).as_literal(), Some(&Literal::Int(10)));
}

#[test]
fn test_compound_statements() {
    let source = "\
if a:
    pass
elif b:
    x = 1
else:
    x = 2
while x:
    break
else:
    pass
for i, j in pairs:
    continue
try:
    f()
except ValueError as e:
    raise
except:
    pass
else:
    g()
finally:
    h()
with open(p) as fh, lock:
    fh.read()
";
    let tree = parse(source).unwrap();
    let stmts = body(&tree);
    assert_eq!(stmts.len(), 5);

    let NodeKind::If { orelse, .. } = tree.kind(stmts[0]) else {
        panic!("expected if");
    };
    assert_eq!(orelse.len(), 1);
    assert!(matches!(tree.kind(orelse[0]), NodeKind::If { orelse, .. } if orelse.len() == 1));

    assert!(matches!(tree.kind(stmts[1]), NodeKind::While { orelse, .. } if orelse.len() == 1));
    assert!(matches!(tree.kind(stmts[2]), NodeKind::For { is_async: false, .. }));

    let NodeKind::Try {
        handlers,
        orelse,
        finalbody,
        ..
    } = tree.kind(stmts[3])
    else {
        panic!("expected try");
    };
    assert_eq!(handlers.len(), 2);
    assert_eq!(orelse.len(), 1);
    assert_eq!(finalbody.len(), 1);
    assert!(matches!(
        tree.kind(handlers[0]),
        NodeKind::ExceptHandler { name: Some(n), typ: Some(_), .. } if n == "e"
    ));

    let NodeKind::With { items, .. } = tree.kind(stmts[4]) else {
        panic!("expected with");
    };
    assert_eq!(items.len(), 2);
    assert!(items[0].vars.is_some());
    assert!(items[1].vars.is_none());
}

#[test]
fn test_function_and_class_definitions() {
    let source = "\
@decorator
async def f(a, /, b: int = 1, *args, c, d=2, **kw) -> str:
    '''doc'''
    return await g(a)

class C(Base, metaclass=Meta):
    x = 1
";
    let tree = parse(source).unwrap();
    let stmts = body(&tree);
    let NodeKind::FunctionDef {
        name,
        params,
        decorators,
        returns,
        is_async,
        body: fbody,
    } = tree.kind(stmts[0])
    else {
        panic!("expected function");
    };
    assert_eq!(name, "f");
    assert!(*is_async);
    assert_eq!(decorators.len(), 1);
    assert!(returns.is_some());
    assert_eq!(params.posonly.len(), 1);
    assert_eq!(params.args.len(), 1);
    assert!(params.args[0].annotation.is_some());
    assert_eq!(params.vararg.as_ref().map(|p| p.name.as_str()), Some("args"));
    assert_eq!(params.kwonly.len(), 2);
    assert_eq!(params.kwarg.as_ref().map(|p| p.name.as_str()), Some("kw"));
    assert_eq!(fbody.len(), 2);

    let NodeKind::ClassDef {
        name, bases, keywords, ..
    } = tree.kind(stmts[1])
    else {
        panic!("expected class");
    };
    assert_eq!(name, "C");
    assert_eq!(bases.len(), 1);
    assert_eq!(keywords[0].arg.as_deref(), Some("metaclass"));
}

#[test]
fn test_imports_and_declarations() {
    let tree = parse("import os.path as p, sys\nfrom ..pkg import (a, b as c)\nfrom . import *\nglobal g\n").unwrap();
    let stmts = body(&tree);
    let NodeKind::Import { names } = tree.kind(stmts[0]) else {
        panic!("expected import");
    };
    assert_eq!(names[0].bound_name(), "p");
    assert_eq!(names[1].bound_name(), "sys");

    let NodeKind::ImportFrom { module, names, level } = tree.kind(stmts[1]) else {
        panic!("expected import from");
    };
    assert_eq!(module.as_deref(), Some("pkg"));
    assert_eq!(*level, 2);
    assert_eq!(names[1].bound_name(), "c");

    assert!(matches!(
        tree.kind(stmts[2]),
        NodeKind::ImportFrom { module: None, level: 1, names } if names[0].name == "*"
    ));
    assert!(matches!(tree.kind(stmts[3]), NodeKind::Global { names } if names == &vec!["g".to_owned()]));
}

#[test]
fn test_semicolon_separated_statements() {
    let tree = parse("a = 1; b = 2; pass\n").unwrap();
    assert_eq!(body(&tree).len(), 3);
}

#[test]
fn test_statement_spans() {
    let source = "x = 1\nif x:\n    y = 2\n";
    let tree = parse(source).unwrap();
    let stmts = body(&tree);
    assert_eq!(&source[tree.span(stmts[0]).to_range()], "x = 1");
    assert_eq!(&source[tree.span(stmts[1]).to_range()], "if x:\n    y = 2");
}

#[test]
fn test_parse_into_existing_tree() {
    let mut tree = parse("x = 1\n").unwrap();
    let before = tree.len();
    let id = parse_expression_into(&mut tree, "a + 1").unwrap();
    assert!(tree.len() > before);
    assert!(matches!(tree.kind(id), NodeKind::BinOp { .. }));
    assert_eq!(body(&tree).len(), 1);

    let stmts = parse_statements_into(&mut tree, "y = 2\nz = 3\n").unwrap();
    assert_eq!(stmts.len(), 2);
    assert!(matches!(tree.kind(stmts[1]), NodeKind::Assign { .. }));
}

#[test]
fn test_deeply_nested_expression() {
    let depth = 2_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let (tree, id) = expr(&source);
    assert_eq!(tree.kind(id).as_literal(), Some(&Literal::Int(1)));
}
