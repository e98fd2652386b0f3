//! Python's built-in namespace, as far as name look-up needs it.

use crate::core::{ScopeObject, TypeObject, BUILTINS_MODULE};
use once_cell::sync::Lazy;
use std::collections::HashSet;

static BUILTIN_CLASSES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bool", "bytearray", "bytes", "classmethod", "complex", "dict", "enumerate",
        "filter", "float", "frozenset", "int", "list", "map", "memoryview", "object",
        "property", "range", "reversed", "set", "slice", "staticmethod", "str", "super",
        "tuple", "type", "zip",
        // Exceptions
        "ArithmeticError", "AssertionError", "AttributeError", "BaseException",
        "BlockingIOError", "BrokenPipeError", "BufferError", "ConnectionError",
        "EOFError", "Exception", "FileExistsError", "FileNotFoundError",
        "FloatingPointError", "GeneratorExit", "ImportError", "IndexError",
        "InterruptedError", "IsADirectoryError", "KeyError", "KeyboardInterrupt",
        "LookupError", "MemoryError", "ModuleNotFoundError", "NameError",
        "NotADirectoryError", "NotImplementedError", "OSError", "OverflowError",
        "PermissionError", "RecursionError", "ReferenceError", "RuntimeError",
        "StopAsyncIteration", "StopIteration", "SyntaxError", "SystemError",
        "SystemExit", "TimeoutError", "TypeError", "UnboundLocalError",
        "UnicodeDecodeError", "UnicodeEncodeError", "UnicodeError", "ValueError",
        "ZeroDivisionError",
        // Warnings
        "BytesWarning", "DeprecationWarning", "FutureWarning", "ImportWarning",
        "PendingDeprecationWarning", "ResourceWarning", "RuntimeWarning",
        "SyntaxWarning", "UnicodeWarning", "UserWarning", "Warning",
    ]
    .into_iter()
    .collect()
});

static BUILTIN_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "__import__", "abs", "aiter", "all", "anext", "any", "ascii", "bin", "breakpoint",
        "callable", "chr", "compile", "delattr", "dir", "divmod", "eval", "exec", "format",
        "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input", "isinstance",
        "issubclass", "iter", "len", "locals", "max", "min", "next", "oct", "open", "ord",
        "pow", "print", "repr", "round", "setattr", "sorted", "sum", "vars",
    ]
    .into_iter()
    .collect()
});

static BUILTIN_CONSTANTS: [&str; 6] = [
    "None",
    "True",
    "False",
    "Ellipsis",
    "NotImplemented",
    "__debug__",
];

/// Look `name` up in the built-in namespace
pub fn lookup(name: &str) -> Option<ScopeObject> {
    if BUILTIN_CLASSES.contains(name) {
        Some(ScopeObject::Class(TypeObject::builtin(name)))
    } else if BUILTIN_FUNCTIONS.contains(name) {
        Some(ScopeObject::Function(format!("{}.{}", BUILTINS_MODULE, name)))
    } else if BUILTIN_CONSTANTS.contains(&name) {
        Some(ScopeObject::Value)
    } else {
        None
    }
}
