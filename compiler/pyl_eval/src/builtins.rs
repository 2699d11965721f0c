//! The builtins namespace and the names every module starts with.

use std::rc::Rc;

use pyl_ir::NodeId;
use pyl_object::{Object, PURE_BUILTINS};

use crate::namespace::Namespace;
use crate::value::{Function, Value};

/// Every name the runtime's builtins module provides.
pub const BUILTIN_NAMES: &[&str] = &[
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "BaseException",
    "BaseExceptionGroup",
    "BlockingIOError",
    "BrokenPipeError",
    "BufferError",
    "BytesWarning",
    "ChildProcessError",
    "ConnectionAbortedError",
    "ConnectionError",
    "ConnectionRefusedError",
    "ConnectionResetError",
    "DeprecationWarning",
    "EOFError",
    "Ellipsis",
    "EncodingWarning",
    "EnvironmentError",
    "Exception",
    "ExceptionGroup",
    "FileExistsError",
    "FileNotFoundError",
    "FloatingPointError",
    "FutureWarning",
    "GeneratorExit",
    "IOError",
    "ImportError",
    "ImportWarning",
    "IndentationError",
    "IndexError",
    "InterruptedError",
    "IsADirectoryError",
    "KeyError",
    "KeyboardInterrupt",
    "LookupError",
    "MemoryError",
    "ModuleNotFoundError",
    "NameError",
    "NotADirectoryError",
    "NotImplemented",
    "NotImplementedError",
    "OSError",
    "OverflowError",
    "PendingDeprecationWarning",
    "PermissionError",
    "ProcessLookupError",
    "RecursionError",
    "ReferenceError",
    "ResourceWarning",
    "RuntimeError",
    "RuntimeWarning",
    "StopAsyncIteration",
    "StopIteration",
    "SyntaxError",
    "SyntaxWarning",
    "SystemError",
    "SystemExit",
    "TabError",
    "TimeoutError",
    "TypeError",
    "UnboundLocalError",
    "UnicodeDecodeError",
    "UnicodeEncodeError",
    "UnicodeError",
    "UnicodeTranslateError",
    "UnicodeWarning",
    "UserWarning",
    "ValueError",
    "Warning",
    "ZeroDivisionError",
    "__build_class__",
    "__debug__",
    "__import__",
    "abs",
    "aiter",
    "all",
    "anext",
    "any",
    "ascii",
    "bin",
    "bool",
    "breakpoint",
    "bytearray",
    "bytes",
    "callable",
    "chr",
    "classmethod",
    "compile",
    "complex",
    "copyright",
    "credits",
    "delattr",
    "dict",
    "dir",
    "divmod",
    "enumerate",
    "eval",
    "exec",
    "exit",
    "filter",
    "float",
    "format",
    "frozenset",
    "getattr",
    "globals",
    "hasattr",
    "hash",
    "help",
    "hex",
    "id",
    "input",
    "int",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "license",
    "list",
    "locals",
    "map",
    "max",
    "memoryview",
    "min",
    "next",
    "object",
    "oct",
    "open",
    "ord",
    "pow",
    "print",
    "property",
    "quit",
    "range",
    "repr",
    "reversed",
    "round",
    "set",
    "setattr",
    "slice",
    "sorted",
    "staticmethod",
    "str",
    "sum",
    "super",
    "tuple",
    "type",
    "vars",
    "zip",
];

/// Names bound in every module namespace before its first statement.
pub const MODULE_NAMES: &[&str] = &[
    "__name__",
    "__doc__",
    "__file__",
    "__builtins__",
    "__loader__",
    "__package__",
    "__spec__",
    "__cached__",
    "__annotations__",
];

/// The builtins namespace.
///
/// Builtins the engine can compute on host objects are callable values;
/// every other name is bound but unknown.
pub fn builtins_namespace(scope: NodeId) -> Namespace {
    let mut ns = Namespace::new(scope);
    for &name in BUILTIN_NAMES {
        let value = match name {
            "Ellipsis" => Value::Constant(Object::Ellipsis),
            _ => match PURE_BUILTINS.iter().find(|&&pure| pure == name) {
                Some(&pure) => Value::Function(Rc::new(Function::builtin(pure))),
                None => Value::Unknown,
            },
        };
        ns.bind(name, value);
    }
    ns
}

/// A fresh module namespace.
pub fn module_namespace(scope: NodeId) -> Namespace {
    let mut ns = Namespace::new(scope);
    for &name in MODULE_NAMES {
        ns.bind(name, Value::Unknown);
    }
    ns
}
