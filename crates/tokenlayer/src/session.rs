//! A build session ties the pieces together for a host: one config, one
//! file source, one incremental token store, and a compile step over the
//! aggregate. Hosts are responsible for debouncing file-change bursts
//! before asking for a new stylesheet.

use std::path::Path;

use anyhow::Context;
use tokenlayer_compiler::compile;
use tokenlayer_compiler::CompileOptions;
use tokenlayer_config::Config;
use tokenlayer_filesystem::FileSourceRef;
use tokenlayer_scanner::recover_stylesheet;
use tokenlayer_scanner::scan_file;
use tokenlayer_scanner::ScanResult;
use tokenlayer_scanner::TokenStore;

pub struct BuildSession {
  config: Config,
  source: FileSourceRef,
  options: CompileOptions,
  store: TokenStore,
}

impl BuildSession {
  pub fn new(config: Config, source: FileSourceRef) -> Self {
    Self::with_options(config, source, CompileOptions::default())
  }

  pub fn with_options(config: Config, source: FileSourceRef, options: CompileOptions) -> Self {
    BuildSession {
      config,
      source,
      options,
      store: TokenStore::new(),
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn store(&self) -> &TokenStore {
    &self.store
  }

  /// Scans every file matching the configured globs into a fresh store and
  /// compiles the result. Stale entries for files that no longer match
  /// disappear with the old store.
  pub fn rebuild(&mut self) -> anyhow::Result<String> {
    let store = TokenStore::new();
    for path in self.source.glob(&self.config.include, &self.config.exclude) {
      let text = self
        .source
        .read_file(&path)
        .with_context(|| format!("reading {}", path.display()))?;
      let result = self.scan_text(&path, &text);
      store.update_file(path, result);
    }
    tracing::debug!(files = store.len(), "rebuilt token store");
    self.store = store;
    Ok(self.stylesheet())
  }

  /// Re-scans one changed file; the store entry is replaced wholesale.
  pub fn update_file(&self, path: &Path) -> anyhow::Result<()> {
    let text = self
      .source
      .read_file(path)
      .with_context(|| format!("reading {}", path.display()))?;
    let result = self.scan_text(path, &text);
    self.store.update_file(path.to_path_buf(), result);
    Ok(())
  }

  pub fn remove_file(&self, path: &Path) {
    self.store.remove_file(path);
  }

  /// Swaps the config and re-scans everything against it. Scan
  /// classification depends on the config, so no store entry stays valid
  /// across the swap.
  pub fn set_config(&mut self, config: Config) -> anyhow::Result<String> {
    self.config = config;
    self.rebuild()
  }

  /// Compiles the current aggregate. Empty when nothing was found.
  pub fn stylesheet(&self) -> String {
    compile(&self.store.aggregate(), &self.config, &self.options)
  }

  /// Stylesheets are walked structurally for previously emitted compose
  /// blocks; everything else gets the textual scan.
  fn scan_text(&self, path: &Path, text: &str) -> ScanResult {
    let is_css = path
      .extension()
      .is_some_and(|extension| extension.eq_ignore_ascii_case("css"));
    if is_css {
      recover_stylesheet(&self.config, text)
    } else {
      scan_file(&self.config, text)
    }
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;
  use std::sync::Arc;

  use pretty_assertions::assert_eq;
  use tokenlayer_filesystem::InMemoryFileSystem;

  use super::*;

  fn config() -> Config {
    let mut config = Config::default();
    config.include = vec!["**/*.tsx".into(), "**/*.css".into()];
    config.exclude = vec!["**/node_modules/**".into()];
    config
  }

  fn session(files: &[(&str, &str)]) -> BuildSession {
    let fs = InMemoryFileSystem::default();
    for (path, text) in files {
      fs.write_file(PathBuf::from(path), (*text).to_string());
    }
    BuildSession::new(config(), Arc::new(fs))
  }

  #[test]
  fn rebuild_scans_matching_files_only() {
    let mut session = session(&[
      ("src/app.tsx", "let style = { '--padding': 4 };"),
      ("node_modules/dep/index.tsx", "'--margin'"),
      ("README.md", "--color"),
    ]);

    let css = session.rebuild().unwrap();
    assert_eq!(session.store().len(), 1);
    assert!(css.contains("[style*=\"--padding:\"]"));
    assert!(!css.contains("--margin"));
  }

  #[test]
  fn empty_projects_compile_to_nothing() {
    let mut session = session(&[("src/app.tsx", "no tokens here")]);
    assert_eq!(session.rebuild().unwrap(), "");
  }

  #[test]
  fn update_and_remove_are_incremental() {
    let fs = Arc::new(InMemoryFileSystem::default());
    fs.write_file(PathBuf::from("src/app.tsx"), "'--padding'".to_string());
    let mut session = BuildSession::new(config(), fs.clone());
    let _ = session.rebuild().unwrap();
    assert!(session.stylesheet().contains("[style*=\"--padding:\"]"));

    fs.write_file(PathBuf::from("src/app.tsx"), "'--margin'".to_string());
    session.update_file(Path::new("src/app.tsx")).unwrap();
    let css = session.stylesheet();
    assert!(css.contains("[style*=\"--margin:\"]"));
    assert!(!css.contains("[style*=\"--padding:\"]"));

    session.remove_file(Path::new("src/app.tsx"));
    assert_eq!(session.stylesheet(), "");
  }

  #[test]
  fn update_file_reports_read_failures() {
    let session = session(&[]);
    let error = session.update_file(Path::new("missing.tsx")).unwrap_err();
    assert!(error.to_string().contains("missing.tsx"));
  }

  #[test]
  fn stylesheets_round_trip_through_recovery() {
    let mut session = session(&[(
      "dist/tokens.css",
      r#"
        @layer tkc {
          .tk-feedface {
            --padding: 4;
            padding-top: 1rem;
          }
        }
      "#,
    )]);

    let css = session.rebuild().unwrap();
    assert!(css.contains(".tk-feedface"));
    assert!(css.contains("[style*=\"--padding:\"]"));
  }

  #[test]
  fn set_config_rescans_against_the_new_config() {
    let mut session = session(&[("src/app.tsx", "'--md_padding'")]);
    // `md` is not a known breakpoint yet, so the token is skipped.
    assert_eq!(session.rebuild().unwrap(), "");

    let mut next = config();
    let _ = next
      .responsive
      .insert("md".into(), "(min-width: 700px)".into());
    let css = session.set_config(next).unwrap();
    // lightningcss rewrites the configured query to range syntax.
    assert!(css.contains("@media (width >= 700px)"));
  }
}
