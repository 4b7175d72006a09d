//! Derived per-target grouping that drives rule emission. Scanned tokens
//! are regrouped by the concrete CSS longhand (or authored custom property)
//! they resolve to, since rules are emitted per target, not per token.

use std::collections::BTreeMap;

use tokenlayer_config::specificity_depth;
use tokenlayer_config::Config;
use tokenlayer_core::hash::short_hash;
use tokenlayer_core::properties;
use tokenlayer_core::TokenProperty;

/// One scanned token contributing to a target.
#[derive(Clone, Debug)]
pub struct UsedToken {
  pub property: TokenProperty,
  /// Variant count; zero for base (unconditional) tokens.
  pub order: usize,
}

impl UsedToken {
  pub fn name(&self) -> String {
    self.property.serialize()
  }

  pub fn is_base(&self) -> bool {
    self.order == 0
  }
}

/// Every token targeting one longhand, with the facts emission needs. The
/// target is a CSS longhand, or `---{alias}` for authored custom
/// properties (triple-dashed so it can never collide with token syntax).
#[derive(Debug)]
pub struct TargetGroup {
  pub target: String,
  pub is_custom: bool,
  pub is_grid: bool,
  pub is_logical: bool,
  pub is_inherited: bool,
  /// Numbered layer the group's rules land in.
  pub depth: usize,
  pub tokens: Vec<UsedToken>,
}

/// Groups scanned properties by resolved target, deterministically ordered
/// by target name with tokens ordered by variant count then canonical name.
pub fn build_groups(scanned: &[TokenProperty], config: &Config) -> Vec<TargetGroup> {
  let mut by_target: BTreeMap<String, TargetGroup> = BTreeMap::new();

  for property in scanned {
    let order =
      usize::from(property.responsive.is_some()) + usize::from(property.selector.is_some());

    if config.custom_properties.contains_key(&property.alias) {
      let target = format!("---{}", property.alias);
      by_target
        .entry(target.clone())
        .or_insert_with(|| TargetGroup {
          target,
          is_custom: true,
          is_grid: false,
          is_logical: false,
          is_inherited: false,
          depth: 1,
          tokens: Vec::new(),
        })
        .tokens
        .push(UsedToken {
          property: property.clone(),
          order,
        });
      continue;
    }

    for longhand in config.expand_alias(&property.alias) {
      by_target
        .entry(longhand.clone())
        .or_insert_with(|| TargetGroup {
          is_custom: false,
          is_grid: config.is_grid_property(&longhand),
          is_logical: properties::is_logical(&longhand),
          is_inherited: properties::is_inherited(&longhand),
          depth: specificity_depth(&longhand).max(1),
          target: longhand,
          tokens: Vec::new(),
        })
        .tokens
        .push(UsedToken {
          property: property.clone(),
          order,
        });
    }
  }

  let mut groups: Vec<TargetGroup> = by_target.into_values().collect();
  for group in &mut groups {
    group
      .tokens
      .sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name().cmp(&b.name())));
    group.tokens.dedup_by_key(|token| token.name());
  }
  groups
}

/// Unique alias custom-property names feeding a target, most specific
/// (fewest contained properties) first; ties break alphabetically. Chain
/// builders wrap fallbacks in this order so the most specific alias ends
/// up outermost and wins. The target's own token always participates: the
/// runtime rewrites configured aliases into longhand tokens, so those keys
/// must resolve even when only an alias was scanned.
pub fn aliases_by_specificity(group: &TargetGroup, config: &Config) -> Vec<String> {
  let mut aliases: Vec<String> = group
    .tokens
    .iter()
    .map(|token| token.property.alias.clone())
    .collect();
  if !group.is_custom {
    aliases.push(group.target.clone());
  }
  aliases.sort_unstable();
  aliases.dedup();
  aliases.sort_by_key(|alias| config.contained_longhands(alias).len());
  aliases
}

/// The toggle custom property a variant token switches through,
/// hash-named to bound identifier length.
pub fn toggle_name(property: &TokenProperty) -> String {
  format!("--_tk-{}", short_hash(&property.serialize()))
}

/// The "private initial" custom property holding a target's resolved base
/// value chain, declared universally in the reset.
pub fn private_initial_name(target: &str) -> String {
  format!("--_tki-{}", target.trim_start_matches('-'))
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn config() -> Config {
    let mut config = Config::default();
    let _ = config.aliases.insert(
      "px".into(),
      vec!["padding-left".into(), "padding-right".into()],
    );
    let _ = config.responsive.insert("md".into(), "(min-width: 700px)".into());
    config
  }

  #[test]
  fn groups_by_expanded_longhand() {
    let config = config();
    let scanned = vec![
      TokenProperty::new("px"),
      TokenProperty::new("padding-left"),
    ];

    let groups = build_groups(&scanned, &config);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].target, "padding-left");
    assert_eq!(groups[0].tokens.len(), 2);
    assert_eq!(groups[1].target, "padding-right");
    assert_eq!(groups[1].tokens.len(), 1);
    assert!(groups[0].is_grid);
    assert_eq!(groups[0].depth, 2);
  }

  #[test]
  fn custom_properties_get_triple_dash_targets() {
    let mut config = config();
    let _ = config.custom_properties.insert("brand".into(), vec!["color".into()]);

    let groups = build_groups(&[TokenProperty::new("brand")], &config);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].target, "---brand");
    assert!(groups[0].is_custom);
    assert_eq!(groups[0].depth, 1);
  }

  #[test]
  fn orders_aliases_most_specific_first() {
    let config = config();
    let scanned = vec![TokenProperty::new("px"), TokenProperty::new("padding-left")];
    let groups = build_groups(&scanned, &config);

    // `padding-left` contains nothing, `px` spans two longhands.
    assert_eq!(
      aliases_by_specificity(&groups[0], &config),
      vec!["padding-left".to_string(), "px".to_string()]
    );
  }

  #[test]
  fn dedups_tokens_and_ranks_variants_after_base() {
    let config = config();
    let mut variant = TokenProperty::new("px");
    variant.responsive = Some("md".into());
    let scanned = vec![variant.clone(), TokenProperty::new("px"), variant];

    let groups = build_groups(&scanned, &config);
    assert_eq!(groups[0].tokens.len(), 2);
    assert!(groups[0].tokens[0].is_base());
    assert_eq!(groups[0].tokens[1].order, 1);
  }
}
