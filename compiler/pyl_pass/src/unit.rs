//! Units: the files a run reads and writes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A text unit. `path` is relative to the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub text: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        SourceUnit {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn view(&self) -> UnitView<'_> {
        UnitView {
            path: &self.path,
            text: &self.text,
        }
    }
}

/// A compiled extension module produced by the native toolchain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeArtifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    Source(SourceUnit),
    Artifact(NativeArtifact),
}

impl Unit {
    pub fn path(&self) -> &Path {
        match self {
            Unit::Source(source) => &source.path,
            Unit::Artifact(artifact) => &artifact.path,
        }
    }

    /// Write the unit beneath `dir`, creating parent directories.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let target = dir.join(self.path());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        match self {
            Unit::Source(source) => fs::write(&target, &source.text)?,
            Unit::Artifact(artifact) => fs::write(&target, &artifact.bytes)?,
        }
        Ok(target)
    }
}

/// Borrowed view of the unit a pass is looking at.
#[derive(Copy, Clone, Debug)]
pub struct UnitView<'a> {
    pub path: &'a Path,
    pub text: &'a str,
}

impl UnitView<'_> {
    /// Path as shown in diagnostics.
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}
