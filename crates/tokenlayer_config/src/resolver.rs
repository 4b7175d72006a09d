use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;

use thiserror::Error;
use tokenlayer_core::grammar::parse_token_value;
use tokenlayer_core::grammar::TokenValue;
use tokenlayer_core::properties;

use crate::config::Config;
use crate::config::ThemeValues;

/// Theme values may reference other theme values; resolution follows the
/// chain up to this many hops before giving up on that one value.
pub const THEME_DEPTH_CEILING: usize = 8;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
  #[error("theme value `{0}` is cyclic or nested too deeply")]
  CycleOrDepthExceeded(String),
  #[error("theme value `{0}` does not resolve")]
  Unresolved(String),
}

/// One token value resolved against the root theme and every mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedThemeValue {
  pub root: Option<String>,
  pub modes: BTreeMap<String, String>,
}

impl Config {
  /// Expands an alias to the CSS longhands it covers: the configured
  /// expansion, or the alias itself when it is a recognised CSS/custom
  /// property, or nothing.
  pub fn expand_alias(&self, alias: &str) -> Vec<String> {
    if let Some(longhands) = self.aliases.get(alias) {
      return longhands.clone();
    }
    if properties::is_recognized(alias) {
      return vec![alias.to_string()];
    }
    Vec::new()
  }

  /// Recursively expands a property through the static shorthand table down
  /// to leaf longhands. Leaf properties expand to themselves.
  pub fn expand_shorthand(&self, property: &str) -> Vec<String> {
    match properties::direct_longhands(property) {
      None => vec![property.to_string()],
      Some(longhands) => longhands
        .iter()
        .flat_map(|longhand| self.expand_shorthand(longhand))
        .collect(),
    }
  }

  /// Every property strictly contained by `alias`: its configured longhands
  /// plus all properties transitively reachable through the shorthand
  /// table, intermediates included. The alias' own direct expansion target
  /// is included; the alias itself is not.
  pub fn contained_longhands(&self, alias: &str) -> BTreeSet<String> {
    let mut contained = BTreeSet::new();
    let roots = if let Some(longhands) = self.aliases.get(alias) {
      longhands.clone()
    } else {
      properties::direct_longhands(alias)
        .map(|longhands| longhands.iter().map(|l| (*l).to_string()).collect())
        .unwrap_or_default()
    };
    let mut queue: Vec<String> = roots;
    while let Some(property) = queue.pop() {
      if !contained.insert(property.clone()) {
        continue;
      }
      if let Some(longhands) = properties::direct_longhands(&property) {
        queue.extend(longhands.iter().map(|l| (*l).to_string()));
      }
    }
    let _ = contained.remove(alias);
    contained
  }

  /// Whether numeric values of this property scale by the grid unit: either
  /// the configured theme keys include `grid`, or the property is in the
  /// static space-scale set.
  pub fn is_grid_property(&self, property: &str) -> bool {
    if let Some(theme_keys) = self.properties.get(property) {
      return theme_keys.iter().any(|key| key == "grid");
    }
    properties::is_space_scale(property)
  }

  /// Resolves a token value to a literal per theme mode, following values
  /// that themselves reference other theme entries. A cyclic or too-deep
  /// chain aborts resolution of that one value.
  pub fn theme_values_for_mode(&self, value: &TokenValue) -> ResolvedThemeValue {
    let root_values = self.theme.root_values();
    let mut resolved = ResolvedThemeValue::default();

    match resolve_value(root_values, None, value) {
      Ok(literal) => resolved.root = Some(literal),
      Err(ThemeError::Unresolved(_)) => {}
      Err(error) => tracing::warn!(%error, "skipping theme value"),
    }

    if let Some(modes) = self.theme.modes() {
      for (mode, values) in modes {
        match resolve_value(values, Some(root_values), value) {
          Ok(literal) => {
            let _ = resolved.modes.insert(mode.clone(), literal);
          }
          Err(ThemeError::Unresolved(_)) => {}
          Err(error) => tracing::warn!(%error, mode, "skipping theme value"),
        }
      }
    }

    resolved
  }
}

fn resolve_value(
  values: &ThemeValues,
  fallback: Option<&ThemeValues>,
  value: &TokenValue,
) -> Result<String, ThemeError> {
  let mut visited = HashSet::new();
  resolve_value_inner(values, fallback, value, &mut visited, 0)
}

fn resolve_value_inner(
  values: &ThemeValues,
  fallback: Option<&ThemeValues>,
  value: &TokenValue,
  visited: &mut HashSet<(String, String)>,
  depth: usize,
) -> Result<String, ThemeError> {
  if depth >= THEME_DEPTH_CEILING
    || !visited.insert((value.theme_key.clone(), value.token.clone()))
  {
    return Err(ThemeError::CycleOrDepthExceeded(value.serialize()));
  }

  let literal = values
    .get(&value.theme_key)
    .and_then(|tokens| tokens.get(&value.token))
    .or_else(|| {
      fallback
        .and_then(|values| values.get(&value.theme_key))
        .and_then(|tokens| tokens.get(&value.token))
    })
    .ok_or_else(|| ThemeError::Unresolved(value.serialize()))?;

  // Whole-string references chain to another theme entry; anything else is
  // taken literally.
  match parse_token_value(literal) {
    Ok(reference) => resolve_value_inner(values, fallback, &reference, visited, depth + 1),
    Err(_) => Ok(literal.clone()),
  }
}

/// Layer index of a longhand: one for the property itself plus the depth of
/// every shorthand that contains it, summed. Deeper expansions land in
/// later layers so they win regardless of source order.
pub fn specificity_depth(property: &str) -> usize {
  if !properties::is_recognized(property) {
    return 0;
  }
  1 + properties::containing_shorthands(property)
    .iter()
    .map(|shorthand| specificity_depth(shorthand))
    .sum::<usize>()
}

/// The deepest specificity in the static table; bounds the layer ladder.
pub fn max_specificity_depth() -> usize {
  properties::SHORTHANDS
    .iter()
    .flat_map(|(_, longhands)| longhands.iter())
    .map(|longhand| specificity_depth(longhand))
    .max()
    .unwrap_or(1)
}

#[cfg(test)]
mod tests {
  use indexmap::IndexMap;
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::config::Theme;

  fn theme(entries: &[(&str, &str, &str)]) -> Theme {
    let mut values = ThemeValues::default();
    for (key, token, value) in entries {
      let _ = values
        .entry((*key).to_string())
        .or_default()
        .insert((*token).to_string(), (*value).to_string());
    }
    Theme::Flat(values)
  }

  #[test]
  fn expands_aliases() {
    let mut config = Config::default();
    let _ = config.aliases.insert(
      "px".into(),
      vec!["padding-left".into(), "padding-right".into()],
    );

    assert_eq!(
      config.expand_alias("px"),
      vec!["padding-left".to_string(), "padding-right".to_string()]
    );
    assert_eq!(config.expand_alias("color"), vec!["color".to_string()]);
    assert_eq!(config.expand_alias("not-a-property"), Vec::<String>::new());
  }

  #[test]
  fn expands_shorthands_recursively() {
    let config = Config::default();
    let mut leaves = config.expand_shorthand("border-top");
    leaves.sort_unstable();
    assert_eq!(
      leaves,
      vec!["border-top-color", "border-top-style", "border-top-width"]
    );

    let border = config.expand_shorthand("border");
    assert_eq!(border.len(), 12);
    assert!(border.iter().all(|p| p.starts_with("border-")));
  }

  #[test]
  fn contained_longhands_include_intermediates() {
    let config = Config::default();
    let contained = config.contained_longhands("padding");
    assert!(contained.contains("padding-left"));
    assert!(!contained.contains("padding"));

    let contained = config.contained_longhands("border");
    assert!(contained.contains("border-top"));
    assert!(contained.contains("border-top-color"));
  }

  #[test]
  fn depth_sums_containing_shorthands() {
    assert_eq!(specificity_depth("border"), 1);
    assert_eq!(specificity_depth("border-top"), 2);
    // border-top (2) + border-color (1) + itself.
    assert_eq!(specificity_depth("border-top-color"), 4);
    assert_eq!(specificity_depth("padding-left"), 2);
    assert!(max_specificity_depth() >= specificity_depth("border-top-color"));
  }

  #[test]
  fn resolves_chained_theme_values() {
    let mut config = Config::default();
    config.theme = theme(&[
      ("color", "sky-500", "#0ea5e9"),
      ("color", "primary", "var(--color_sky-500)"),
    ]);

    let resolved = config.theme_values_for_mode(&TokenValue::new("color", "primary"));
    assert_eq!(resolved.root.as_deref(), Some("#0ea5e9"));
  }

  #[test]
  fn aborts_cyclic_theme_values() {
    let mut config = Config::default();
    config.theme = theme(&[
      ("color", "a", "var(--color_b)"),
      ("color", "b", "var(--color_a)"),
    ]);

    let resolved = config.theme_values_for_mode(&TokenValue::new("color", "a"));
    assert_eq!(resolved.root, None);
  }

  #[test]
  fn modes_fall_back_to_root() {
    let mut root = ThemeValues::default();
    let _ = root
      .entry("color".to_string())
      .or_default()
      .insert("surface".to_string(), "#fff".to_string());
    let mut dark = ThemeValues::default();
    let _ = dark
      .entry("color".to_string())
      .or_default()
      .insert("accent".to_string(), "#38bdf8".to_string());

    let mut config = Config::default();
    config.theme = Theme::Modes {
      root,
      modes: IndexMap::from_iter([("dark".to_string(), dark)]),
    };

    let surface = config.theme_values_for_mode(&TokenValue::new("color", "surface"));
    assert_eq!(surface.root.as_deref(), Some("#fff"));
    assert_eq!(surface.modes.get("dark").map(String::as_str), Some("#fff"));

    let accent = config.theme_values_for_mode(&TokenValue::new("color", "accent"));
    assert_eq!(accent.root, None);
    assert_eq!(accent.modes.get("dark").map(String::as_str), Some("#38bdf8"));
  }
}
