//! Stylesheet assembly: aggregated scan results plus a resolved config in,
//! layered CSS text out.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use itertools::Itertools;
use tokenlayer_config::max_specificity_depth;
use tokenlayer_config::Config;
use tokenlayer_core::grammar::parse_token_property;
use tokenlayer_core::value::CALC_SUFFIX;
use tokenlayer_core::Selector;
use tokenlayer_core::TokenProperty;
use tokenlayer_scanner::ScanResult;

use crate::property_config::aliases_by_specificity;
use crate::property_config::build_groups;
use crate::property_config::private_initial_name;
use crate::property_config::toggle_name;
use crate::property_config::TargetGroup;
use crate::property_config::UsedToken;
use crate::sheet::style_attr_selector;
use crate::sheet::Family;
use crate::sheet::LayerSheet;
use crate::sheet::COMPONENTS_LAYER;
use crate::sheet::TOKENS_LAYER;
use crate::transform::transform;
use crate::transform::ERROR_BANNER;

/// The custom property carrying the configured grid base unit.
pub const GRID_UNIT: &str = "--_tk-grid";

#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
  pub minify: bool,
  /// Browserslist queries for the transform step; empty means no
  /// target-based downleveling.
  pub targets: Vec<String>,
}

/// Compiles aggregated scan results to stylesheet text. An empty property
/// set returns an empty string, signalling a no-op build to the caller. A
/// transform failure is caught and replaced by a fixed error banner rather
/// than propagated.
pub fn compile(scan: &ScanResult, config: &Config, options: &CompileOptions) -> String {
  if scan.properties.is_empty() {
    return String::new();
  }

  let groups = build_groups(&scan.properties, config);
  let mut sheet = LayerSheet::new(max_specificity_depth());

  emit_theme(&mut sheet, scan, config);
  emit_reset(&mut sheet, config, &groups);
  emit_toggles(&mut sheet, config, &groups);
  emit_atomic_rules(&mut sheet, &groups);
  emit_components(&mut sheet, scan, config);

  match transform(&sheet.render(), options) {
    Ok(code) => code,
    Err(error) => {
      tracing::error!(%error, "stylesheet transform failed, emitting error banner");
      ERROR_BANNER.to_string()
    }
  }
}

fn rule(selector: &str, declarations: &[String]) -> String {
  format!("{} {{\n{}\n}}", selector, declarations.join("\n"))
}

/// Theme custom properties for every referenced value, one rule per group
/// of modes with textually identical value sets, plus tree-shaken
/// keyframes.
fn emit_theme(sheet: &mut LayerSheet, scan: &ScanResult, config: &Config) {
  let mut root_decls = vec![format!("  {}: {};", GRID_UNIT, config.grid)];
  let mut mode_decls: BTreeMap<String, Vec<String>> = BTreeMap::new();
  let mut referenced = String::new();

  let mut values: Vec<_> = scan.values.iter().collect();
  values.sort_by_key(|value| value.serialize());
  for value in values {
    let resolved = config.theme_values_for_mode(value);
    if let Some(literal) = &resolved.root {
      root_decls.push(format!("  {}: {};", value.custom_property(), literal));
      referenced.push_str(literal);
      referenced.push(' ');
    }
    for (mode, literal) in &resolved.modes {
      mode_decls
        .entry(mode.clone())
        .or_default()
        .push(format!("  {}: {};", value.custom_property(), literal));
      referenced.push_str(literal);
      referenced.push(' ');
    }
  }

  sheet.push(TOKENS_LAYER, &rule(&config.root_selector, &root_decls));

  // Modes with identical declaration sets share one rule; duplicate
  // custom-property declarations trip up some downstream transforms.
  let mut by_body: BTreeMap<String, Vec<String>> = BTreeMap::new();
  for (mode, decls) in mode_decls {
    by_body
      .entry(decls.join("\n"))
      .or_default()
      .push(config.theme_mode_selector(&mode));
  }
  for (body, selectors) in by_body {
    sheet.push(
      TOKENS_LAYER,
      &format!("{} {{\n{}\n}}", selectors.iter().join(", "), body),
    );
  }

  for (name, steps) in &config.keyframes {
    if !references_animation(&referenced, name) {
      continue;
    }
    let mut body = String::new();
    for (step, declarations) in steps {
      body.push_str(&format!("  {} {{\n", step));
      for (property, value) in declarations {
        body.push_str(&format!("    {}: {};\n", property, value));
      }
      body.push_str("  }\n");
    }
    sheet.push(TOKENS_LAYER, &format!("@keyframes {} {{\n{}}}", name, body));
  }
}

/// Whole-word containment; `fade` must not match inside `fade-in`.
fn references_animation(haystack: &str, name: &str) -> bool {
  let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
  haystack.match_indices(name).any(|(start, _)| {
    let before_ok = !haystack[..start].chars().next_back().is_some_and(is_ident);
    let after_ok = !haystack[start + name.len()..].chars().next().is_some_and(is_ident);
    before_ok && after_ok
  })
}

/// The universal reset: every target gets a private initial folding its
/// aliases down to a literal, so an unset token never leaks a stale value
/// from a sibling. Non-inherited physical properties are additionally
/// reset to `initial` on the matched elements themselves.
fn emit_reset(sheet: &mut LayerSheet, config: &Config, groups: &[TargetGroup]) {
  let mut universal = Vec::new();
  for group in groups {
    let literal = if group.is_grid { "0" } else { "initial" };
    let mut chain = literal.to_string();
    for alias in aliases_by_specificity(group, config).iter().rev() {
      chain = format!("var(--{}, {})", alias, chain);
    }
    universal.push(format!(
      "  {}: {};",
      private_initial_name(&group.target),
      chain
    ));
  }
  sheet.push(TOKENS_LAYER, &rule("*", &universal));

  for group in groups {
    if group.is_custom || group.is_logical || group.is_inherited {
      continue;
    }
    let selectors = presence_selectors(group, |_| true);
    sheet.push(
      TOKENS_LAYER,
      &rule(
        &selectors.join(", "),
        &[format!("  {}: initial;", group.target)],
      ),
    );
  }
}

/// One toggle per distinct variant token, defined inside its
/// selector/media context so it only carries a value while the variant
/// matches.
fn emit_toggles(sheet: &mut LayerSheet, config: &Config, groups: &[TargetGroup]) {
  let mut seen = BTreeSet::new();
  for group in groups {
    for token in &group.tokens {
      if token.is_base() || !seen.insert(token.name()) {
        continue;
      }
      emit_toggle(sheet, config, &token.property);
    }
  }
}

fn emit_toggle(sheet: &mut LayerSheet, config: &Config, property: &TokenProperty) {
  let name = property.serialize();
  let element = style_attr_selector(&name);
  let selectors: Vec<String> = match &property.selector {
    None => vec![element.clone()],
    Some(Selector::Named(selector)) => config
      .selectors
      .get(selector)
      .map(|template| {
        template
          .templates()
          .iter()
          .map(|template| apply_template(template, &element))
          .collect()
      })
      .unwrap_or_default(),
    Some(Selector::Arbitrary(decoded)) => vec![apply_template(decoded, &element)],
  };
  if selectors.is_empty() {
    return;
  }

  let body = rule(
    &selectors.join(", "),
    &[format!("  {}: var({});", toggle_name(property), name)],
  );
  let text = match &property.responsive {
    None => body,
    Some(responsive) => {
      let Some(query) = config.responsive.get(responsive) else {
        return;
      };
      format!("{} {{\n{}\n}}", media_prelude(query), indent(&body))
    }
  };
  sheet.push(TOKENS_LAYER, &text);
}

/// Substitutes the matched element into a selector template. A template
/// without `&` selects on the element itself.
fn apply_template(template: &str, element: &str) -> String {
  if template.contains('&') {
    template.replace('&', element)
  } else {
    format!("{}{}", element, template)
  }
}

fn media_prelude(query: &str) -> String {
  if query.trim_start().starts_with('@') {
    query.to_string()
  } else {
    format!("@media {}", query)
  }
}

fn indent(text: &str) -> String {
  text.lines().map(|line| format!("  {}", line)).join("\n")
}

/// Base and variant rules per target, placed into the numbered layer equal
/// to the target's specificity depth. Grid targets get a calc twin gated
/// on the `__calc` sentinel; within a layer the twin is emitted after the
/// plain rule so it wins when both match.
fn emit_atomic_rules(sheet: &mut LayerSheet, groups: &[TargetGroup]) {
  for group in groups {
    let initial = format!("var({})", private_initial_name(&group.target));

    let mut base_selectors = presence_selectors(group, UsedToken::is_base);
    if !base_selectors.is_empty() {
      // The runtime rewrites configured aliases into longhand tokens, so
      // the longhand's own token must match alongside the scanned ones.
      if !group.is_custom {
        base_selectors.push(style_attr_selector(&format!("--{}", group.target)));
        base_selectors.sort_unstable();
        base_selectors.dedup();
      }
      let layer = Family::atomic(group.is_logical, false).layer(group.depth);
      sheet.push(
        &layer,
        &rule(
          &base_selectors.join(", "),
          &[format!("  {}: {};", group.target, initial)],
        ),
      );
      if group.is_grid {
        let mut selectors = calc_selectors(group, UsedToken::is_base);
        selectors.push(style_attr_selector(&format!(
          "--{}{}",
          group.target, CALC_SUFFIX
        )));
        selectors.sort_unstable();
        selectors.dedup();
        sheet.push(
          &layer,
          &rule(
            &selectors.join(", "),
            &[format!(
              "  {}: calc({} * var({}));",
              group.target, initial, GRID_UNIT
            )],
          ),
        );
      }
    }

    let mut variants: Vec<&UsedToken> = group.tokens.iter().filter(|t| !t.is_base()).collect();
    if variants.is_empty() {
      continue;
    }
    // Most specific first: more variants, then canonical name. The chain
    // wraps from the inside out, so the first entry ends up outermost and
    // an unset toggle falls through toward the base value instead of a
    // hard `revert-layer`.
    variants.sort_by(|a, b| b.order.cmp(&a.order).then_with(|| a.name().cmp(&b.name())));
    let mut chain = initial.clone();
    for token in variants.iter().rev() {
      chain = format!("var({}, {})", toggle_name(&token.property), chain);
    }

    let layer = Family::atomic(group.is_logical, true).layer(group.depth);
    let selectors = presence_selectors(group, |t| !t.is_base());
    sheet.push(
      &layer,
      &rule(
        &selectors.join(", "),
        &[format!("  {}: {};", group.target, chain)],
      ),
    );
    if group.is_grid {
      sheet.push(
        &layer,
        &rule(
          &calc_selectors(group, |t| !t.is_base()).join(", "),
          &[format!(
            "  {}: calc({} * var({}));",
            group.target, chain, GRID_UNIT
          )],
        ),
      );
    }
  }
}

fn presence_selectors(group: &TargetGroup, keep: impl Fn(&UsedToken) -> bool) -> Vec<String> {
  let mut selectors: Vec<String> = group
    .tokens
    .iter()
    .filter(|token| keep(token))
    .map(|token| style_attr_selector(&token.name()))
    .collect();
  selectors.sort_unstable();
  selectors.dedup();
  selectors
}

fn calc_selectors(group: &TargetGroup, keep: impl Fn(&UsedToken) -> bool) -> Vec<String> {
  let mut selectors: Vec<String> = group
    .tokens
    .iter()
    .filter(|token| keep(token))
    .map(|token| style_attr_selector(&format!("{}{}", token.name(), CALC_SUFFIX)))
    .collect();
  selectors.sort_unstable();
  selectors.dedup();
  selectors
}

/// One literal class rule per compose block. The block's raw token
/// properties are carried verbatim (that is what round-trip recovery reads
/// back) alongside the derived longhand declarations.
fn emit_components(sheet: &mut LayerSheet, scan: &ScanResult, config: &Config) {
  for (class_name, block) in &scan.compose_blocks {
    let mut decls = Vec::new();
    for (key, value) in &block.base {
      decls.push(format!("  {}: {};", key, value));
      let Ok(property) = parse_token_property(key, config) else {
        continue;
      };
      if property.has_variants() {
        continue;
      }
      let alias = &property.alias;
      if config.custom_properties.contains_key(alias) {
        decls.push(format!("  ---{}: var(--{}, {});", alias, alias, value));
        continue;
      }
      for longhand in config.expand_alias(alias) {
        let mut chain = format!("var(--{}, {})", alias, value);
        if longhand != *alias {
          chain = format!("var(--{}, {})", longhand, chain);
        }
        if config.is_grid_property(&longhand) && value.is_numeric() {
          decls.push(format!(
            "  {}: calc({} * var({}));",
            longhand, chain, GRID_UNIT
          ));
        } else {
          decls.push(format!("  {}: {};", longhand, chain));
        }
      }
    }
    if decls.is_empty() {
      continue;
    }
    sheet.push(COMPONENTS_LAYER, &rule(&format!(".{}", class_name), &decls));
  }
}
