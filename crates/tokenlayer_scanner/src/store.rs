//! The incremental per-file token store shared between a host's file
//! watcher and the compiler.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::RwLock;

use tokenlayer_core::grammar::TokenProperty;
use tokenlayer_core::grammar::TokenValue;

use crate::scanner::ScanResult;

type Hasher = xxhash_rust::xxh3::Xxh3Builder;

/// Per-file scan results keyed by path. Updates replace whole entries, so
/// concurrent notifications for different files may land in any order
/// without corruption. A config change invalidates nothing here directly;
/// callers re-scan every file against the new config because value
/// classification depends on it.
#[derive(Debug, Default)]
pub struct TokenStore {
  inner: RwLock<HashMap<PathBuf, ScanResult, Hasher>>,
}

impl TokenStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn update_file(&self, path: impl Into<PathBuf>, result: ScanResult) {
    let mut files = self.inner.write().unwrap();
    let _ = files.insert(path.into(), result);
  }

  pub fn remove_file(&self, path: &Path) {
    let mut files = self.inner.write().unwrap();
    let _ = files.remove(path);
  }

  pub fn len(&self) -> usize {
    self.inner.read().unwrap().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.read().unwrap().is_empty()
  }

  /// Pure merge of every current entry. Output is identical regardless of
  /// the order files were updated in: entries merge in path order,
  /// properties and values dedupe by identity and sort canonically,
  /// compose blocks collapse by class key (identical keys carry identical
  /// content, so last-write-wins is inert).
  pub fn aggregate(&self) -> ScanResult {
    let files = self.inner.read().unwrap();
    let mut ordered: Vec<(&PathBuf, &ScanResult)> = files.iter().collect();
    ordered.sort_by_key(|(path, _)| path.to_path_buf());

    let mut properties: BTreeMap<String, TokenProperty> = BTreeMap::new();
    let mut values: BTreeMap<String, TokenValue> = BTreeMap::new();
    let mut compose_blocks = BTreeMap::new();
    for (_, result) in ordered {
      for property in &result.properties {
        let _ = properties.insert(property.serialize(), property.clone());
      }
      for value in &result.values {
        let _ = values.insert(value.serialize(), value.clone());
      }
      for (class_name, block) in &result.compose_blocks {
        let _ = compose_blocks.insert(class_name.clone(), block.clone());
      }
    }

    ScanResult {
      properties: properties.into_values().collect(),
      values: values.into_values().collect(),
      compose_blocks,
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use tokenlayer_config::Config;

  use super::*;
  use crate::scanner::scan_file;

  #[test]
  fn aggregation_is_order_independent() {
    let config = Config::default();
    let a = scan_file(&config, "--padding --hover_color");
    let b = scan_file(&config, "--padding --margin");

    let forward = TokenStore::new();
    forward.update_file("a.tsx", a.clone());
    forward.update_file("b.tsx", b.clone());

    let reverse = TokenStore::new();
    reverse.update_file("b.tsx", b);
    reverse.update_file("a.tsx", a);

    assert_eq!(forward.aggregate(), reverse.aggregate());
    assert_eq!(forward.aggregate().properties.len(), 3);
  }

  #[test]
  fn updates_replace_whole_entries() {
    let config = Config::default();
    let store = TokenStore::new();
    store.update_file("a.tsx", scan_file(&config, "--padding"));
    store.update_file("a.tsx", scan_file(&config, "--margin"));

    let aggregated = store.aggregate();
    assert_eq!(aggregated.properties.len(), 1);
    assert_eq!(aggregated.properties[0].alias, "margin");
  }

  #[test]
  fn removal_deletes_the_entry() {
    let config = Config::default();
    let store = TokenStore::new();
    store.update_file("a.tsx", scan_file(&config, "--padding"));
    store.remove_file(Path::new("a.tsx"));

    assert!(store.is_empty());
    assert!(store.aggregate().is_empty());
  }
}
