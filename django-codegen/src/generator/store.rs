//! File-system access for the generator
//!
//! All paths handed to a [`FileStore`] are relative to the project root.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// Reads existing sources and writes generated ones
pub trait FileStore {
    /// Current contents of `path`, `None` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    fn read_if_exists(&self, path: &Path) -> io::Result<Option<String>>;

    /// Replace the contents of `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Files under a project directory
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a reader never sees a half-written source.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileStore for DiskStore {
    fn read_if_exists(&self, path: &Path) -> io::Result<Option<String>> {
        match fs::read_to_string(self.resolve(path)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let target = self.resolve(path);
        let parent = target.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        let file_name = target
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".codegen-tmp");
        let temp = parent.join(temp_name);

        fs::write(&temp, contents)?;
        fs::rename(&temp, &target).inspect_err(|_| {
            let _ = fs::remove_file(&temp);
        })
    }
}

/// In-memory files, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `files`
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<PathBuf>,
        C: Into<String>,
    {
        let store = Self::new();
        store
            .files
            .lock()
            .extend(files.into_iter().map(|(p, c)| (p.into(), c.into())));
        store
    }

    /// Contents of `path`
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    /// All stored paths, sorted
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }
}

impl FileStore for MemoryStore {
    fn read_if_exists(&self, path: &Path) -> io::Result<Option<String>> {
        Ok(self.files.lock().get(path).cloned())
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.files
            .lock()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
