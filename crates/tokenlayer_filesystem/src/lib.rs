use std::io;
use std::path::Path;
use std::sync::Arc;

/// In-memory file-system for testing
pub mod in_memory_file_system;

/// File-system implementation using std::fs
pub mod os_file_system;

pub use in_memory_file_system::InMemoryFileSystem;
pub use os_file_system::{OsFileSource, OsFileSystem};

/// FileSystem abstraction instance
///
/// This should be `OsFileSystem` for non-testing environments and
/// `InMemoryFileSystem` for testing.
pub type FileSystemRef = Arc<dyn FileSystem + Send + Sync>;

/// Trait abstracting file-system reads. The engine core never writes.
pub trait FileSystem {
  fn read_to_string(&self, path: &Path) -> io::Result<String>;
  fn is_file(&self, path: &Path) -> bool;
}

/// The source-file boundary the scanner consumes: read one file, or list
/// every project file matching the configured include/exclude globs.
pub trait FileSource {
  fn read_file(&self, path: &Path) -> io::Result<String>;
  fn glob(&self, include: &[String], exclude: &[String]) -> Vec<std::path::PathBuf>;
}

pub type FileSourceRef = Arc<dyn FileSource + Send + Sync>;

pub(crate) fn is_excluded(path: &str, exclude: &[String]) -> bool {
  exclude
    .iter()
    .any(|pattern| glob_match::glob_match(pattern, path))
}
