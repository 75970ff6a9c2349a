//! Uploaded files and the per-invocation working directory they are copied into.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A file attached to a request: original filename plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        UploadedFile {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Final path component of the client-supplied filename, so an upload
    /// named `../../etc/passwd` lands inside the working directory as `passwd`.
    pub fn safe_name(&self) -> Option<&str> {
        Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
    }

    /// Write the bytes to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, &self.bytes)
    }
}

/// The file fields of an incoming request, keyed by form field name.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    files: BTreeMap<String, UploadedFile>,
}

impl UploadRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, field: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(field.into(), file);
        self
    }

    /// Wrap a local file as if it had been uploaded under `field`.
    pub fn from_path(field: impl Into<String>, path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self::new().with_file(field, UploadedFile::new(filename, bytes)))
    }

    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.get(field)
    }
}

/// Directory the upload is copied into before it is read.
///
/// A scoped directory gets a random name under its parent so concurrent
/// pipelines never share an input copy; a fixed directory is used as is.
#[derive(Debug)]
pub enum WorkingDir {
    Scoped(TempDir),
    Fixed(PathBuf),
}

impl WorkingDir {
    /// Create a randomly named directory inside `parent`, creating `parent` first.
    pub fn scoped_in(parent: &Path) -> io::Result<Self> {
        fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new().prefix("upload-").tempdir_in(parent)?;
        Ok(WorkingDir::Scoped(dir))
    }

    /// Use `path` itself, creating it if absent.
    pub fn fixed(path: &Path) -> io::Result<Self> {
        fs::create_dir_all(path)?;
        Ok(WorkingDir::Fixed(path.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        match self {
            WorkingDir::Scoped(dir) => dir.path(),
            WorkingDir::Fixed(path) => path,
        }
    }

    /// Delete the directory and everything in it. A directory that is
    /// already gone is not an error; other failures are logged and ignored.
    pub fn remove(self) {
        let path = self.path().to_path_buf();
        let result = match self {
            WorkingDir::Scoped(dir) => dir.close(),
            WorkingDir::Fixed(path) => fs::remove_dir_all(path),
        };
        match result {
            Ok(()) => log::debug!("Removed working directory {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove working directory {}: {e}", path.display()),
        }
    }
}
