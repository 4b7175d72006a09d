//! Runtime style composition: merging token-style objects left to right
//! with alias-aware longhand clearing, calc sentinels, and a bounded cache.
//!
//! The composer is a capability object: it owns its cache and config, and
//! callers pass it by reference. There is no ambient shared state.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;
use tokenlayer_config::Config;
use tokenlayer_core::grammar::parse_token_property;
use tokenlayer_core::value::CALC_SUFFIX;
use tokenlayer_core::value::CALC_TOGGLE_ON;
use tokenlayer_core::StyleValue;
use tokenlayer_core::TokenProperty;
use tokenlayer_scanner::compose_class_name;

/// A token-style object: token-property keys to literal values, safe to
/// spread into any inline-style mechanism.
pub type Style = BTreeMap<String, StyleValue>;

#[derive(Clone, Debug)]
pub struct ComposerOptions {
  pub cache_capacity: usize,
}

impl Default for ComposerOptions {
  fn default() -> Self {
    ComposerOptions {
      cache_capacity: 512,
    }
  }
}

/// Where an accumulator entry came from. A composed entry is neutralized
/// with `initial` when a later longhand override clears it, so downstream
/// merges can still see the slot exists; a flat entry is deleted outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
  Composed,
  Flat,
}

#[derive(Clone, Debug)]
struct Entry {
  value: StyleValue,
  source: Source,
}

pub struct StyleComposer {
  config: Config,
  cache: Mutex<crate::lru::LruCache<Style>>,
}

impl StyleComposer {
  pub fn new(config: Config, options: ComposerOptions) -> Self {
    StyleComposer {
      config,
      cache: Mutex::new(crate::lru::LruCache::new(options.cache_capacity)),
    }
  }

  /// Left-to-right merge of token-style objects; later entries win.
  /// Configured aliases on variant-free keys are rewritten into their
  /// longhand tokens, numeric values set `__calc` sentinels, and writing a
  /// shorthand clears the longhands it contains.
  pub fn css(&self, styles: &[Style]) -> Style {
    self.cached(&("css", styles), || {
      let mut acc = BTreeMap::new();
      for style in styles {
        self.fold(&mut acc, style, Source::Flat);
      }
      finish(acc)
    })
  }

  /// Builds a composed style from a compose configuration. The class name
  /// is the same content hash the static extractor produces, so runtime
  /// and build-time blocks line up.
  pub fn compose(&self, config: ComposeConfig) -> ComposedStyle {
    ComposedStyle {
      class_name: compose_class_name(&config.base),
      base: config.base,
      variants: config.variants,
      responsive_variants: config.responsive_variants,
      includes: config.includes,
    }
  }

  pub fn cache_len(&self) -> usize {
    self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
  }

  fn fold(&self, acc: &mut BTreeMap<String, Entry>, style: &Style, source: Source) {
    for (key, value) in style {
      let Ok(property) = parse_token_property(key, &self.config) else {
        // Sentinels and anything else out of grammar pass through opaque.
        let _ = acc.insert(
          key.clone(),
          Entry {
            value: value.clone(),
            source,
          },
        );
        continue;
      };
      match self.config.aliases.get(&property.alias) {
        Some(longhands) if !property.has_variants() => {
          for longhand in longhands.clone() {
            let mut expanded = property.clone();
            expanded.alias = longhand;
            self.write(acc, &expanded, value, source);
          }
        }
        _ => self.write(acc, &property, value, source),
      }
    }
  }

  fn write(
    &self,
    acc: &mut BTreeMap<String, Entry>,
    property: &TokenProperty,
    value: &StyleValue,
    source: Source,
  ) {
    let contained = self.config.contained_longhands(&property.alias);
    if !contained.is_empty() {
      let keys: Vec<String> = acc.keys().cloned().collect();
      for key in keys {
        let Ok(current) = parse_token_property(&key, &self.config) else {
          continue;
        };
        if current.responsive != property.responsive || current.selector != property.selector {
          continue;
        }
        // Variant-scoped configured aliases are not pre-expanded by
        // `fold`, so the entry clears when any longhand its alias covers
        // falls inside the incoming key's contained set.
        let clears = self
          .config
          .expand_alias(&current.alias)
          .iter()
          .any(|longhand| contained.contains(longhand));
        if clears {
          self.clear(acc, &key);
        }
      }
    }

    let key = property.serialize();
    let calc_key = format!("{}{}", key, CALC_SUFFIX);
    if value.is_numeric() {
      let _ = acc.insert(
        calc_key,
        Entry {
          value: StyleValue::from(CALC_TOGGLE_ON),
          source,
        },
      );
    } else {
      // A non-numeric value clears any earlier sentinel for this key.
      match acc.get(&calc_key).map(|entry| entry.source) {
        Some(Source::Composed) => {
          let _ = acc.insert(
            calc_key,
            Entry {
              value: StyleValue::from("initial"),
              source: Source::Flat,
            },
          );
        }
        Some(Source::Flat) => {
          let _ = acc.remove(&calc_key);
        }
        None => {}
      }
    }
    let _ = acc.insert(
      key,
      Entry {
        value: value.clone(),
        source,
      },
    );
  }

  fn clear(&self, acc: &mut BTreeMap<String, Entry>, key: &str) {
    let calc_key = format!("{}{}", key, CALC_SUFFIX);
    match acc.get(key).map(|entry| entry.source) {
      Some(Source::Composed) => {
        let _ = acc.insert(
          key.to_string(),
          Entry {
            value: StyleValue::from("initial"),
            source: Source::Flat,
          },
        );
        if acc.contains_key(&calc_key) {
          let _ = acc.insert(
            calc_key,
            Entry {
              value: StyleValue::from("initial"),
              source: Source::Flat,
            },
          );
        }
      }
      _ => {
        let _ = acc.remove(key);
        let _ = acc.remove(&calc_key);
      }
    }
  }

  fn cached<P: Serialize>(&self, payload: &P, compute: impl FnOnce() -> Style) -> Style {
    let Ok(key) = serde_json::to_string(payload) else {
      return compute();
    };
    if let Ok(mut cache) = self.cache.lock() {
      if let Some(hit) = cache.get(&key) {
        return hit;
      }
    }
    let value = compute();
    if let Ok(mut cache) = self.cache.lock() {
      cache.insert(key, value.clone());
    }
    value
  }
}

/// Input to [`StyleComposer::compose`].
#[derive(Clone, Debug, Default)]
pub struct ComposeConfig {
  pub base: Style,
  /// Variant name -> style object.
  pub variants: BTreeMap<String, Style>,
  /// Responsive variant name -> style object; keys get re-prefixed with
  /// the selected responsive breakpoint.
  pub responsive_variants: BTreeMap<String, Style>,
  /// Other composed styles whose classes and bases this one builds on.
  pub includes: Vec<ComposedStyle>,
}

/// The result of `compose`: a deterministic class name plus a style
/// resolver for variant selection and call-site overrides.
#[derive(Clone, Debug)]
pub struct ComposedStyle {
  class_name: String,
  base: Style,
  variants: BTreeMap<String, Style>,
  responsive_variants: BTreeMap<String, Style>,
  includes: Vec<ComposedStyle>,
}

impl ComposedStyle {
  /// The block's class name, the includes' class-name chains, and any
  /// caller-supplied extra names, space-joined.
  pub fn class_name(&self, extra: &[&str]) -> String {
    let mut names = vec![self.class_name.clone()];
    for include in &self.includes {
      names.push(include.class_name(&[]));
    }
    names.extend(extra.iter().map(|name| (*name).to_string()));
    names.join(" ")
  }

  /// Resolves selected variants and overrides over the composed bases.
  /// Bases are seeded as "composed" so later longhand overrides neutralize
  /// them instead of silently coexisting.
  pub fn style(&self, composer: &StyleComposer, selected: &[&str], overrides: &[Style]) -> Style {
    let resolved = self.resolved_variants(composer, selected);
    composer.cached(
      &("style", self.class_name(&[]), &resolved, overrides),
      || {
        let mut seeds = Vec::new();
        self.seeds(&mut seeds);
        let mut acc = BTreeMap::new();
        for seed in seeds {
          composer.fold(&mut acc, seed, Source::Composed);
        }
        for style in &resolved {
          composer.fold(&mut acc, style, Source::Flat);
        }
        for style in overrides {
          composer.fold(&mut acc, style, Source::Flat);
        }
        finish(acc)
      },
    )
  }

  fn seeds<'a>(&'a self, out: &mut Vec<&'a Style>) {
    for include in &self.includes {
      include.seeds(out);
    }
    out.push(&self.base);
  }

  /// A selection is a variant name, or `{responsive}_{variant}` to pick a
  /// responsive variant with every key re-prefixed by the breakpoint.
  fn resolved_variants(&self, composer: &StyleComposer, selected: &[&str]) -> Vec<Style> {
    let mut resolved = Vec::new();
    for selection in selected {
      if let Some((responsive, name)) = selection.split_once('_') {
        if composer.config.responsive.contains_key(responsive) {
          if let Some(style) = self.responsive_variants.get(name) {
            resolved.push(
              style
                .iter()
                .map(|(key, value)| {
                  let body = key.trim_start_matches("--");
                  (format!("--{}_{}", responsive, body), value.clone())
                })
                .collect(),
            );
            continue;
          }
        }
      }
      if let Some(style) = self.variants.get(*selection) {
        resolved.push(style.clone());
      } else {
        tracing::debug!(selection, "unknown variant selection skipped");
      }
    }
    resolved
  }
}

fn finish(acc: BTreeMap<String, Entry>) -> Style {
  acc
    .into_iter()
    .map(|(key, entry)| (key, entry.value))
    .collect()
}
