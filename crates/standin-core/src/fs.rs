//! Scoped filesystem substitution under an ephemeral root.
//!
//! A [`MockFileSystem`] declares directories and files; [`FsMock`]
//! materializes them under a temporary directory and removes the whole
//! tree when the scope ends, on every exit path.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::Result;

/// Content of a mocked file, with the serialization format made explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    Text(String),
    Bytes(Vec<u8>),
    /// Serialized as compact JSON when written.
    Json(serde_json::Value),
}

/// A target path (relative to the ephemeral root) plus content.
#[derive(Debug, Clone, PartialEq)]
pub struct MockFile {
    pub path: PathBuf,
    pub content: FileContent,
}

impl MockFile {
    pub fn text(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: FileContent::Text(content.into()),
        }
    }

    pub fn bytes(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: FileContent::Bytes(content.into()),
        }
    }

    pub fn json(path: impl Into<PathBuf>, value: serde_json::Value) -> Self {
        Self {
            path: path.into(),
            content: FileContent::Json(value),
        }
    }

    /// Writes the file under `root`, creating parent directories first.
    pub fn write_into(&self, root: &Path) -> Result<PathBuf> {
        let full_path = root.join(&self.path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        match &self.content {
            FileContent::Text(text) => fs::write(&full_path, text)?,
            FileContent::Bytes(bytes) => fs::write(&full_path, bytes)?,
            FileContent::Json(value) => fs::write(&full_path, serde_json::to_vec(value)?)?,
        }

        Ok(full_path)
    }
}

/// Declarative layout: bare directories plus files, materialized in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockFileSystem {
    pub directories: Vec<PathBuf>,
    pub files: Vec<MockFile>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.directories.push(path.into());
        self
    }

    pub fn with_file(mut self, file: MockFile) -> Self {
        self.files.push(file);
        self
    }

    /// Creates the declared structure under `root`: directories first,
    /// then files.
    pub fn materialize_in(&self, root: &Path) -> Result<()> {
        for directory in &self.directories {
            fs::create_dir_all(root.join(directory))?;
        }
        for file in &self.files {
            file.write_into(root)?;
        }
        Ok(())
    }
}

/// Scope guard owning the ephemeral root.
///
/// The root and everything under it are removed when the guard drops,
/// whether the scope exits normally, returns early, or panics.
#[derive(Debug)]
pub struct FsMock {
    temp: TempDir,
}

impl FsMock {
    /// An empty ephemeral root.
    pub fn empty() -> Result<Self> {
        let temp = TempDir::new()?;
        debug!(root = %temp.path().display(), "created ephemeral filesystem root");
        Ok(Self { temp })
    }

    /// An ephemeral root populated with the given layout.
    pub fn with_layout(layout: &MockFileSystem) -> Result<Self> {
        let mock = Self::empty()?;
        layout.materialize_in(mock.root())?;
        Ok(mock)
    }

    /// The ephemeral root path, valid for the scope's duration.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Resolves a path relative to the ephemeral root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root().join(relative)
    }
}
