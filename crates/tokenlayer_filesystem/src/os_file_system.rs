use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::is_excluded;
use crate::FileSource;
use crate::FileSystem;

#[derive(Clone, Debug, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn is_file(&self, path: &Path) -> bool {
    path.is_file()
  }
}

/// OS-backed file source rooted at a project directory. Include patterns are
/// resolved relative to the root with `glob`; excludes are matched with
/// `glob-match` against the root-relative path.
#[derive(Clone, Debug)]
pub struct OsFileSource {
  root: PathBuf,
}

impl OsFileSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    OsFileSource { root: root.into() }
  }
}

impl FileSource for OsFileSource {
  fn read_file(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(self.root.join(path))
  }

  fn glob(&self, include: &[String], exclude: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for pattern in include {
      let absolute = self.root.join(pattern);
      let Ok(entries) = glob::glob(&absolute.to_string_lossy()) else {
        continue;
      };
      for path in entries.flatten() {
        if !path.is_file() {
          continue;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(&path).to_path_buf();
        if is_excluded(&relative.to_string_lossy(), exclude) {
          continue;
        }
        if !paths.contains(&relative) {
          paths.push(relative);
        }
      }
    }
    paths.sort();
    paths
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn globs_and_excludes_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
    std::fs::write(dir.path().join("src/app.tsx"), "").unwrap();
    std::fs::write(dir.path().join("node_modules/pkg/index.tsx"), "").unwrap();

    let source = OsFileSource::new(dir.path());
    let paths = source.glob(
      &["**/*.tsx".into()],
      &["node_modules/**".into()],
    );

    assert_eq!(paths, vec![PathBuf::from("src/app.tsx")]);
  }
}
