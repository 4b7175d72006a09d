use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::is_excluded;
use crate::FileSource;
use crate::FileSystem;

/// In-memory file-system, used by scanner and facade tests. Paths are kept
/// sorted so `glob` output is deterministic.
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
  files: RwLock<BTreeMap<PathBuf, String>>,
}

impl InMemoryFileSystem {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn write_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
    let mut files = self.files.write().unwrap();
    let _ = files.insert(path.into(), contents.into());
  }

  pub fn remove_file(&self, path: &Path) {
    let mut files = self.files.write().unwrap();
    let _ = files.remove(path);
  }
}

impl FileSystem for InMemoryFileSystem {
  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    let files = self.files.read().unwrap();
    files
      .get(path)
      .cloned()
      .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display())))
  }

  fn is_file(&self, path: &Path) -> bool {
    self.files.read().unwrap().contains_key(path)
  }
}

impl FileSource for InMemoryFileSystem {
  fn read_file(&self, path: &Path) -> io::Result<String> {
    self.read_to_string(path)
  }

  fn glob(&self, include: &[String], exclude: &[String]) -> Vec<PathBuf> {
    let files = self.files.read().unwrap();
    files
      .keys()
      .filter(|path| {
        let path = path.to_string_lossy();
        include
          .iter()
          .any(|pattern| glob_match::glob_match(pattern, &path))
          && !is_excluded(&path, exclude)
      })
      .cloned()
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn reads_written_files() {
    let fs = InMemoryFileSystem::new();
    fs.write_file("src/app.tsx", "let x = 1;");

    assert_eq!(
      fs.read_to_string(Path::new("src/app.tsx")).unwrap(),
      "let x = 1;"
    );
    assert!(fs.read_to_string(Path::new("missing.tsx")).is_err());
  }

  #[test]
  fn globs_with_includes_and_excludes() {
    let fs = InMemoryFileSystem::new();
    fs.write_file("src/app.tsx", "");
    fs.write_file("src/app.test.tsx", "");
    fs.write_file("readme.md", "");

    let paths = fs.glob(&["**/*.tsx".into()], &["**/*.test.tsx".into()]);
    assert_eq!(paths, vec![PathBuf::from("src/app.tsx")]);
  }
}
