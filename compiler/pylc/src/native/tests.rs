#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use pyl_pass::PassConfig;

use super::*;
use crate::Pipeline;

/// Records what it is asked to compile.
struct Recording {
    calls: Rc<RefCell<Vec<String>>>,
    succeed: bool,
}

impl NativeCompiler for Recording {
    fn compile(&self, source: &SourceUnit, existing: &FxHashSet<String>) -> Option<NativeArtifact> {
        self.calls.borrow_mut().push(source.text.clone());
        let stem = source.path.file_stem()?.to_str()?;
        let name = native_name(stem, existing)?;
        self.succeed.then(|| NativeArtifact {
            path: source.path.with_file_name(format!("{name}.so")),
            bytes: b"\x7fELF".to_vec(),
        })
    }
}

struct Converted {
    text: String,
    artifacts: Vec<PathBuf>,
    calls: Vec<String>,
}

fn convert_at(level: OptLevel, source: &str, succeed: bool) -> Converted {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let compiler = Recording {
        calls: Rc::clone(&calls),
        succeed,
    };
    let mut pipeline = Pipeline::new(PassConfig::with_level(level), 10);
    pipeline.register(Box::new(NativeConvertor::with_compiler(Box::new(compiler))));
    pipeline.add_source(SourceUnit::new("pkg/m.py", source));
    let outputs = pipeline.transform().unwrap();

    let mut text = String::new();
    let mut artifacts = Vec::new();
    for unit in outputs {
        match unit {
            Unit::Source(source) => text = source.text,
            Unit::Artifact(artifact) => artifacts.push(artifact.path),
        }
    }
    Converted {
        text,
        artifacts,
        calls: calls.take(),
    }
}

fn convert(source: &str) -> Converted {
    convert_at(OptLevel::O3, source, true)
}

#[test]
fn marked_functions_become_imports() {
    let converted = convert("from pylang_annotations import native\n\n@native\ndef f(x):\n    return x + 1\n\nprint(f(2))\n");
    assert_eq!(
        converted.text,
        "from pylang_annotations import native\nif __name__ == '__main__':\n    from m_native import f\nelse:\n    from .m_native import f\nprint(f(2))\n"
    );
    assert_eq!(converted.artifacts, [PathBuf::from("pkg/m_native.so")]);
    assert_eq!(converted.calls.len(), 1);
    assert!(converted.calls[0].contains("def f(x):"));
}

#[test]
fn one_build_serves_every_marked_function() {
    let source = "import pylang_annotations as pa\n\n@pa.native\ndef f():\n    return 1\n\n@pa.native()\ndef g():\n    return 2\n";
    let converted = convert(source);
    assert_eq!(converted.calls.len(), 1);
    assert_eq!(converted.artifacts.len(), 1);
    assert!(converted.text.contains("from .m_native import f\n"));
    assert!(converted.text.contains("from .m_native import g\n"));
    assert!(!converted.text.contains("def "));
}

#[test]
fn marker_spellings() {
    for source in [
        "import pylang_annotations\n\n@pylang_annotations.native\ndef f():\n    pass\n",
        "import pylang_annotations\n\n@pylang_annotations.annotations.native\ndef f():\n    pass\n",
        "import pylang_annotations.annotations as ann\n\n@ann.native\ndef f():\n    pass\n",
        "from pylang_annotations import annotations\n\n@annotations.native\ndef f():\n    pass\n",
        "from pylang_annotations.annotations import native as fast\n\n@fast\ndef f():\n    pass\n",
    ] {
        let converted = convert(source);
        assert_eq!(converted.artifacts.len(), 1, "{source}");
    }
}

#[test]
fn lookalike_decorators_are_ignored() {
    for source in [
        "import other\n\n@other.native\ndef f():\n    pass\n",
        "def native(f):\n    return f\n\n@native\ndef f():\n    pass\n",
        "from pylang_annotations import native\nnative = print\n\n@native\ndef f():\n    pass\n",
    ] {
        let converted = convert(source);
        assert!(converted.calls.is_empty(), "{source}");
        assert!(converted.artifacts.is_empty(), "{source}");
    }
}

#[test]
fn failed_builds_keep_the_function() {
    let source = "from pylang_annotations import native\n\n@native\ndef f():\n    return 1\n";
    let converted = convert_at(OptLevel::O3, source, false);
    assert_eq!(converted.calls.len(), 1);
    assert!(converted.artifacts.is_empty());
    assert_eq!(converted.text, source);
}

#[test]
fn lower_levels_do_not_convert() {
    let source = "from pylang_annotations import native\n\n@native\ndef f():\n    return 1\n";
    let converted = convert_at(OptLevel::O2, source, true);
    assert!(converted.calls.is_empty());
    assert_eq!(converted.text, source);
}

#[test]
fn module_names_avoid_collisions() {
    let mut existing = FxHashSet::default();
    assert_eq!(native_name("m", &existing).as_deref(), Some("m_native"));

    existing.insert("m_native".to_owned());
    assert_eq!(native_name("m", &existing).as_deref(), Some("_0_m_native"));

    existing.insert("_0_m_native".to_owned());
    assert_eq!(native_name("m", &existing).as_deref(), Some("_1__0_m_native"));

    assert_eq!(native_name("1x", &FxHashSet::default()).as_deref(), Some("_0_1x_native"));
    assert_eq!(native_name("my-mod", &FxHashSet::default()), None);
}

#[test]
fn identifiers() {
    assert!(is_identifier("_private"));
    assert!(is_identifier("données"));
    assert!(!is_identifier("9lives"));
    assert!(!is_identifier(""));
}
