//! The per-file scan: a coarse pass over raw text pulling every `--`-led
//! run, classified value-first against the grammar and theme, plus compose
//! block extraction and responsive variant derivation.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use tokenlayer_config::Config;
use tokenlayer_core::grammar::parse_token_property;
use tokenlayer_core::grammar::parse_token_value;
use tokenlayer_core::grammar::TokenProperty;
use tokenlayer_core::grammar::TokenValue;

use crate::compose::extract_compose_blocks;
use crate::compose::ComposeBlock;

/// Everything extracted from one file. Owned exclusively by the store entry
/// for that file and replaced wholesale on re-scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
  pub properties: Vec<TokenProperty>,
  pub values: Vec<TokenValue>,
  pub compose_blocks: BTreeMap<String, ComposeBlock>,
}

impl ScanResult {
  pub fn is_empty(&self) -> bool {
    self.properties.is_empty() && self.values.is_empty() && self.compose_blocks.is_empty()
  }
}

// Either a whole `var(--…)` reference (value candidate) or a bare `--` run
// with optional `{…}` arbitrary-selector groups (property candidate).
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"var\(\s*(--[A-Za-z0-9][A-Za-z0-9_.-]*)\s*\)|(--(?:\{[^}\n]*\}|[A-Za-z0-9_;&-])+)")
    .unwrap()
});

/// Scans one file's text against the current config. Pure function of its
/// inputs; value classification needs the theme to disambiguate a bare
/// `--foo` property from a substring inside `var(--foo_bar)`.
pub fn scan_file(config: &Config, text: &str) -> ScanResult {
  let mut collector = Collector::default();

  for captures in TOKEN_PATTERN.captures_iter(text) {
    if let Some(value_match) = captures.get(1) {
      let whole = captures.get(0).unwrap().as_str();
      if let Ok(value) = parse_token_value(whole) {
        if config.theme.contains(&value.theme_key, &value.token) {
          collector.record_value(value);
          continue;
        }
      }
      // Not a resolving theme reference; the inner run may still be a
      // token property.
      collector.record_property(config, value_match.as_str());
    } else if let Some(property_match) = captures.get(2) {
      collector.record_property(config, property_match.as_str());
    }
  }

  let mut compose_blocks = BTreeMap::new();
  for block in extract_compose_blocks(text) {
    for key in block.base.keys() {
      collector.record_property(config, key);
    }
    for styles in &block.variants {
      for key in styles.keys() {
        collector.record_property(config, key);
      }
    }
    for styles in &block.responsive_variants {
      for key in styles.keys() {
        collector.record_property(config, key);
        collector.record_responsive_derivations(config, key);
      }
    }
    let block = ComposeBlock::from_base(block.base);
    let _ = compose_blocks.insert(block.class_name.clone(), block);
  }

  ScanResult {
    properties: collector.properties,
    values: collector.values,
    compose_blocks,
  }
}

#[derive(Default)]
struct Collector {
  properties: Vec<TokenProperty>,
  values: Vec<TokenValue>,
  seen_properties: BTreeSet<String>,
  seen_values: BTreeSet<String>,
}

impl Collector {
  fn record_value(&mut self, value: TokenValue) {
    if self.seen_values.insert(value.serialize()) {
      self.values.push(value);
    }
  }

  fn record_property(&mut self, config: &Config, input: &str) {
    match parse_token_property(input, config) {
      Ok(property) => self.record_parsed(property),
      Err(error) => tracing::debug!(input, %error, "skipping token"),
    }
  }

  fn record_parsed(&mut self, property: TokenProperty) {
    if self.seen_properties.insert(property.serialize()) {
      self.properties.push(property);
    }
  }

  /// A `responsiveVariants` style key implies the breakpoint-prefixed token
  /// for every configured breakpoint, even though `--md_size` never appears
  /// literally in source.
  fn record_responsive_derivations(&mut self, config: &Config, key: &str) {
    let Ok(property) = parse_token_property(key, config) else {
      return;
    };
    if property.responsive.is_some() {
      return;
    }
    for breakpoint in config.responsive.keys() {
      let mut derived = property.clone();
      derived.responsive = Some(breakpoint.clone());
      self.record_parsed(derived);
    }
  }
}

#[cfg(test)]
mod tests {
  use indexmap::IndexMap;
  use pretty_assertions::assert_eq;
  use tokenlayer_config::Theme;

  use super::*;

  fn test_config() -> Config {
    let mut config = Config::default();
    let _ = config
      .responsive
      .insert("md".into(), "@media (min-width: 700px)".into());
    let _ = config
      .responsive
      .insert("lg".into(), "@media (min-width: 1024px)".into());
    let mut theme = IndexMap::new();
    let _ = theme.insert(
      "color".to_string(),
      IndexMap::from_iter([("sky-500".to_string(), "#0ea5e9".to_string())]),
    );
    config.theme = Theme::Flat(theme);
    config
  }

  fn serialized_properties(result: &ScanResult) -> Vec<String> {
    result.properties.iter().map(TokenProperty::serialize).collect()
  }

  #[test]
  fn classifies_properties_and_values() {
    let config = test_config();
    let result = scan_file(&config, "css({'--hover_color': 'var(--color_sky-500)'})");

    assert_eq!(serialized_properties(&result), vec!["--hover_color"]);
    assert_eq!(
      result.values.iter().map(TokenValue::serialize).collect::<Vec<_>>(),
      vec!["var(--color_sky-500)"]
    );
  }

  #[test]
  fn unresolving_values_are_not_counted() {
    let config = test_config();
    let result = scan_file(&config, "var(--color_mint-200)");

    assert_eq!(result.values, Vec::new());
    assert_eq!(result.properties, Vec::new());
  }

  #[test]
  fn skips_invalid_tokens_and_keeps_scanning() {
    let config = test_config();
    let result = scan_file(&config, "--xl_color --md_padding --md_lg_gap");

    assert_eq!(serialized_properties(&result), vec!["--md_padding"]);
  }

  #[test]
  fn deduplicates_by_identity() {
    let config = test_config();
    let result = scan_file(&config, "--padding --padding --md_padding");

    assert_eq!(serialized_properties(&result), vec!["--padding", "--md_padding"]);
  }

  #[test]
  fn derives_responsive_variant_tokens() {
    let config = test_config();
    let result = scan_file(
      &config,
      r#"
        compose({
          '--display': 'block',
          responsiveVariants: {
            size: { small: { '--font-size': 1 } },
          },
        })
      "#,
    );

    let properties = serialized_properties(&result);
    assert!(properties.contains(&"--font-size".to_string()));
    assert!(properties.contains(&"--md_font-size".to_string()));
    assert!(properties.contains(&"--lg_font-size".to_string()));
    assert_eq!(result.compose_blocks.len(), 1);
  }

  #[test]
  fn arbitrary_selectors_survive_the_coarse_pass() {
    let config = test_config();
    let result = scan_file(&config, "style={{ '--{&;hover_>_svg}_fill': 'red' }}");

    assert_eq!(
      serialized_properties(&result),
      vec!["--{&;hover_>_svg}_fill"]
    );
  }
}
