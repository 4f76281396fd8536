//! Filesystem access used by the scanner, the rename executor and the journal.
//!
//! Everything that touches the disk goes through [`FileSystem`] so a run can be
//! pointed at [`MemoryFileSystem`] in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub trait FileSystem: Send + Sync {
    /// Names of the regular files directly inside `dir`.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>>;

    fn is_dir(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool;

    /// Whether both paths name one existing file, as a case-only change
    /// does on a case-insensitive filesystem.
    fn same_file(&self, a: &Path, b: &Path) -> bool;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().to_string());
        }

        Ok(names)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    #[cfg(unix)]
    fn same_file(&self, a: &Path, b: &Path) -> bool {
        use std::os::unix::fs::MetadataExt;

        match (fs::metadata(a), fs::metadata(b)) {
            (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        }
    }

    #[cfg(not(unix))]
    fn same_file(&self, a: &Path, b: &Path) -> bool {
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    denied: BTreeSet<PathBuf>,
    fold_case: bool,
}

/// In-memory filesystem for tests and dry experiments.
///
/// Directories are implicit: any parent of a stored file counts as a
/// directory, plus whatever was registered with [`MemoryFileSystem::add_dir`].
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<MemoryState>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filesystem that matches file paths ignoring case, like the macOS and
    /// Windows defaults.
    pub fn case_insensitive() -> Self {
        let memfs = Self::new();
        memfs.lock().fold_case = true;
        memfs
    }

    /// Create a filesystem holding empty files called `names` inside `dir`.
    pub fn with_files<I, S>(dir: &Path, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let memfs = Self::new();
        memfs.add_dir(dir);
        for name in names {
            memfs.add_file(&dir.join(name.as_ref()), b"");
        }
        memfs
    }

    pub fn add_file(&self, path: &Path, contents: &[u8]) {
        self.lock().files.insert(path.to_path_buf(), contents.to_vec());
    }

    pub fn add_dir(&self, path: &Path) {
        self.lock().dirs.insert(path.to_path_buf());
    }

    /// Make every rename touching `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: &Path) {
        self.lock().denied.insert(path.to_path_buf());
    }

    /// Sorted names of the files directly inside `dir`.
    pub fn file_names(&self, dir: &Path) -> Vec<String> {
        let state = self.lock();
        Self::children(&state, dir)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn children(state: &MemoryState, dir: &Path) -> Vec<String> {
        state
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect()
    }

    /// Stored path that `path` refers to
    fn resolve(state: &MemoryState, path: &Path) -> Option<PathBuf> {
        if state.files.contains_key(path) {
            return Some(path.to_path_buf());
        }
        if !state.fold_case {
            return None;
        }

        let wanted = path.to_string_lossy().to_lowercase();
        state
            .files
            .keys()
            .find(|p| p.to_string_lossy().to_lowercase() == wanted)
            .cloned()
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("No such file: {}", path.display()),
        )
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let state = self.lock();
        let known_dir =
            state.dirs.contains(dir) || state.files.keys().any(|p| p.parent() == Some(dir));
        if !known_dir {
            return Err(Self::not_found(dir));
        }
        Ok(Self::children(&state, dir))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.lock();
        state.dirs.contains(path) || state.files.keys().any(|p| p.starts_with(path) && p != path)
    }

    fn exists(&self, path: &Path) -> bool {
        let is_file = Self::resolve(&self.lock(), path).is_some();
        is_file || self.is_dir(path)
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        let state = self.lock();
        match (Self::resolve(&state, a), Self::resolve(&state, b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.lock();

        if state.denied.contains(from) || state.denied.contains(to) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Permission denied: {}", from.display()),
            ));
        }

        let stored = Self::resolve(&state, from).ok_or_else(|| Self::not_found(from))?;
        let contents = state.files.remove(&stored).ok_or_else(|| Self::not_found(from))?;
        state.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.lock()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }
}
