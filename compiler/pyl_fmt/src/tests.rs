//! Source-level serializer tests: parse, serialize, compare.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use crate::serialize;

fn fmt(source: &str) -> String {
    serialize(&pyl_parse::parse(source).unwrap())
}

/// Serializing the output again changes nothing.
fn assert_stable(source: &str) -> String {
    let once = fmt(source);
    let twice = fmt(&once);
    assert_eq!(once, twice, "serializer output is not stable for {source:?}");
    once
}

#[test]
fn test_simple_statements() {
    assert_eq!(fmt("x=1;y =  2\n"), "x = 1\ny = 2\n");
    assert_eq!(fmt("a,b=b,a\n"), "a, b = b, a\n");
    assert_eq!(fmt("x, = t\n"), "(x,) = t\n");
    assert_eq!(fmt("n += 1\n"), "n += 1\n");
    assert_eq!(fmt("del a, b[0]\n"), "del a, b[0]\n");
    assert_eq!(fmt("import os.path as p, sys\n"), "import os.path as p, sys\n");
    assert_eq!(fmt("from .. import (a,\n b as c)\n"), "from .. import a, b as c\n");
    assert_eq!(fmt("raise E('x') from None\n"), "raise E('x') from None\n");
    assert_eq!(fmt("assert x, 'msg'\n"), "assert x, 'msg'\n");
    assert_eq!(fmt("x: int = 1\n(y): str\n"), "x: int = 1\n(y): str\n");
}

#[test]
fn test_compound_statements() {
    let source = "\
if a:
  pass
else:
  if b:
    x = 1
  else:
    x = 2
for i in range(3):
  continue
else:
  done()
";
    let expected = "\
if a:
    pass
elif b:
    x = 1
else:
    x = 2
for i in range(3):
    continue
else:
    done()
";
    assert_eq!(fmt(source), expected);
}

#[test]
fn test_definitions_are_separated() {
    let source = "x = 1\n@dec\ndef f(a, /, b=1, *c, d, **e) -> int:\n    return a\nclass C(B, metaclass=M): pass\ny = 2\n";
    let expected = "\
x = 1

@dec
def f(a, /, b=1, *c, d, **e) -> int:
    return a

class C(B, metaclass=M):
    pass

y = 2
";
    assert_eq!(fmt(source), expected);
}

#[test]
fn test_try_and_with() {
    let source = "\
try:
    f()
except (A, B) as e:
    g(e)
except:
    raise
finally:
    h()
with open(p) as fh, lock:
    fh.read()
";
    assert_eq!(fmt(source), source);
}

#[test]
fn test_expression_forms() {
    assert_eq!(fmt("x = lambda a, b=2: a if b else -a\n"), "x = lambda a, b=2: a if b else -a\n");
    assert_eq!(fmt("x = [i*2 for i in y if i]\n"), "x = [i * 2 for i in y if i]\n");
    assert_eq!(fmt("x = {k: v for k, v in d.items()}\n"), "x = {k: v for k, v in d.items()}\n");
    assert_eq!(fmt("x = a[1:2, ::3]\n"), "x = a[1:2, ::3]\n");
    assert_eq!(fmt("x = f(*a, k=1, **kw)\n"), "x = f(*a, k=1, **kw)\n");
    assert_eq!(fmt("x = sum(i for i in y)\n"), "x = sum((i for i in y))\n");
    assert_eq!(fmt("x = not a == b\n"), "x = not a == b\n");
    assert_eq!(fmt("x = (a or b) and c\n"), "x = (a or b) and c\n");
    assert_eq!(fmt("x = 2 ** -1\n"), "x = 2 ** -1\n");
    assert_eq!(fmt("if (n := 10) > 5:\n    pass\n"), "if (n := 10) > 5:\n    pass\n");
    assert_eq!(fmt("x = ()\ny = (1,)\n"), "x = ()\ny = (1,)\n");
    assert_eq!(fmt("x = {**a, 'b': 1}\n"), "x = {**a, 'b': 1}\n");
}

#[test]
fn test_literals() {
    assert_eq!(fmt("x = 0x10\n"), "x = 16\n");
    assert_eq!(fmt("x = 1_000.50\n"), "x = 1000.5\n");
    assert_eq!(fmt("x = 1e20\n"), "x = 1e+20\n");
    assert_eq!(fmt("x = \"it's\"\n"), "x = \"it's\"\n");
    assert_eq!(fmt("x = 'a' 'b'\n"), "x = 'ab'\n");
    assert_eq!(fmt("x = b'\\x00'\n"), "x = b'\\x00'\n");
    assert_eq!(fmt("x = 3j\n"), "x = 3j\n");
    assert_eq!(fmt("x = ...\n"), "x = ...\n");
}

#[test]
fn test_fstrings() {
    assert_eq!(fmt("x = f'a{b!r:>{w}}c'\n"), "x = f'a{b!r:>{w}}c'\n");
    assert_eq!(fmt("x = f'{{}}{y}'\n"), "x = f'{{}}{y}'\n");
    assert_eq!(fmt("x = f\"{d['k']}\"\n"), "x = f\"{d['k']}\"\n");
    assert_eq!(fmt("x = f'{y=}'\n"), "x = f'y={y!r}'\n");
}

#[test]
fn test_output_is_stable() {
    for source in [
        "x = (yield)\n",
        "def g():\n    x = yield 1\n    y = yield from z\n",
        "async def f():\n    async with a as b:\n        await c\n    async for i in d:\n        pass\n",
        "x = a if b else (c if d else e)\n",
        "x = (a, *b)\n",
        "print(*[1, 2], sep='')\n",
        "x = -(-1)\n",
        "x = (-1) ** 2\n",
        "x = {1, 2} | {3}\n",
        "while (line := read()):\n    pass\n",
        "global a, b\n",
        "with (a, b):\n    pass\n",
        "x = 'a\\nb'\n",
        "class A:\n    '''doc'''\n",
    ] {
        assert_stable(source);
    }
}
