//! The token property/value grammar.
//!
//! Token properties are CSS custom properties of the form
//! `--{variant}_{variant}_{alias}` where at most one variant is a responsive
//! breakpoint and at most one is a selector (named or arbitrary). Token
//! values reference a theme entry as `var(--{themeKey}_{token})`.
//!
//! Inputs are substrings already pulled out of source text by the scanner,
//! so everything here is anchored matching over short strings rather than a
//! general tokenizer.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
  #[error("not a token property")]
  NotAToken,
  #[error("not a token value")]
  NotATokenValue,
  #[error("unknown variant `{0}`")]
  UnknownVariant(String),
  #[error("arbitrary selector has no literal characters")]
  EmptyArbitrarySelector,
  #[error("unresolved `{{}}` placeholder")]
  UnresolvedPlaceholder,
}

/// The set of variant names a config recognises. Implemented by the resolved
/// config; kept as a trait so the grammar stays free of the config model.
pub trait VariantSet {
  fn is_responsive(&self, name: &str) -> bool;
  fn is_selector(&self, name: &str) -> bool;
}

/// A selector variant: either a name configured in `selectors`, or an
/// arbitrary compound selector written `{...}` in the property string.
/// Arbitrary selectors are stored decoded (`_` ⇒ space, `;` ⇒ `:`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
  Named(String),
  Arbitrary(String),
}

impl Selector {
  fn encode(&self) -> String {
    match self {
      Selector::Named(name) => name.clone(),
      Selector::Arbitrary(decoded) => {
        format!("{{{}}}", decoded.replace(' ', "_").replace(':', ";"))
      }
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenProperty {
  pub alias: String,
  pub responsive: Option<String>,
  pub selector: Option<Selector>,
}

impl TokenProperty {
  pub fn new(alias: impl Into<String>) -> Self {
    TokenProperty {
      alias: alias.into(),
      responsive: None,
      selector: None,
    }
  }

  pub fn has_variants(&self) -> bool {
    self.responsive.is_some() || self.selector.is_some()
  }

  /// Canonical string form: responsive first, then selector, then alias.
  pub fn serialize(&self) -> String {
    let mut out = String::from("--");
    if let Some(responsive) = &self.responsive {
      out.push_str(responsive);
      out.push('_');
    }
    if let Some(selector) = &self.selector {
      out.push_str(&selector.encode());
      out.push('_');
    }
    out.push_str(&self.alias);
    out
  }
}

/// A `var(--{themeKey}_{token})` reference into the theme.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenValue {
  pub theme_key: String,
  pub token: String,
}

impl TokenValue {
  pub fn new(theme_key: impl Into<String>, token: impl Into<String>) -> Self {
    TokenValue {
      theme_key: theme_key.into(),
      token: token.into(),
    }
  }

  /// The custom property this value resolves through, e.g. `--color_sky-500`.
  pub fn custom_property(&self) -> String {
    format!("--{}_{}", self.theme_key, self.token)
  }

  pub fn serialize(&self) -> String {
    format!("var({})", self.custom_property())
  }
}

fn is_alias_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '-'
}

fn valid_alias(s: &str) -> bool {
  !s.is_empty() && s.starts_with(|c: char| c.is_ascii_alphabetic()) && s.chars().all(is_alias_char)
}

/// Splits the body of a token property on `_`, keeping `{...}` groups whole
/// (underscores inside braces encode spaces and must not split).
fn split_segments(body: &str) -> Option<Vec<&str>> {
  let mut segments = Vec::new();
  let mut start = 0;
  let mut depth = 0usize;
  for (i, c) in body.char_indices() {
    match c {
      '{' => depth += 1,
      '}' => depth = depth.checked_sub(1)?,
      '_' if depth == 0 => {
        segments.push(&body[start..i]);
        start = i + 1;
      }
      _ => {}
    }
  }
  if depth != 0 {
    return None;
  }
  segments.push(&body[start..]);
  Some(segments)
}

fn decode_arbitrary(segment: &str) -> Result<Selector, GrammarError> {
  let inner = &segment[1..segment.len() - 1];
  if inner.is_empty() {
    return Err(GrammarError::UnresolvedPlaceholder);
  }
  let decoded = inner.replace('_', " ").replace(';', ":");
  if decoded.trim().is_empty() {
    return Err(GrammarError::EmptyArbitrarySelector);
  }
  Ok(Selector::Arbitrary(decoded))
}

/// Parses a token property against the variants known to `config`.
///
/// Variant order in the input is irrelevant; more than one responsive or
/// selector variant, or a variant the config does not know, is rejected.
pub fn parse_token_property(
  input: &str,
  config: &dyn VariantSet,
) -> Result<TokenProperty, GrammarError> {
  let body = input.strip_prefix("--").ok_or(GrammarError::NotAToken)?;
  if body.is_empty() || body.starts_with('-') {
    return Err(GrammarError::NotAToken);
  }
  let segments = split_segments(body).ok_or(GrammarError::NotAToken)?;
  let (alias, variants) = segments.split_last().ok_or(GrammarError::NotAToken)?;
  if !valid_alias(alias) {
    return Err(GrammarError::NotAToken);
  }

  let mut property = TokenProperty::new(*alias);
  for segment in variants {
    if segment.starts_with('{') && segment.ends_with('}') && segment.len() >= 2 {
      if property.selector.is_some() {
        return Err(GrammarError::UnknownVariant((*segment).to_string()));
      }
      property.selector = Some(decode_arbitrary(segment)?);
    } else if config.is_responsive(segment) {
      if property.responsive.is_some() {
        return Err(GrammarError::UnknownVariant((*segment).to_string()));
      }
      property.responsive = Some((*segment).to_string());
    } else if config.is_selector(segment) {
      if property.selector.is_some() {
        return Err(GrammarError::UnknownVariant((*segment).to_string()));
      }
      property.selector = Some(Selector::Named((*segment).to_string()));
    } else {
      return Err(GrammarError::UnknownVariant((*segment).to_string()));
    }
  }

  Ok(property)
}

/// Parses a `var(--{themeKey}_{token})` token value. Purely syntactic; the
/// scanner additionally requires the theme to contain the referenced entry
/// before counting the value as used.
pub fn parse_token_value(input: &str) -> Result<TokenValue, GrammarError> {
  let inner = input
    .strip_prefix("var(")
    .and_then(|rest| rest.strip_suffix(')'))
    .ok_or(GrammarError::NotATokenValue)?
    .trim();
  let body = inner
    .strip_prefix("--")
    .ok_or(GrammarError::NotATokenValue)?;
  let (theme_key, token) = body.split_once('_').ok_or(GrammarError::NotATokenValue)?;
  if !valid_alias(theme_key) || token.is_empty() {
    return Err(GrammarError::NotATokenValue);
  }
  if !token
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
  {
    return Err(GrammarError::NotATokenValue);
  }
  Ok(TokenValue::new(theme_key, token))
}

/// `var(---,{literal})`: the explicitly-unthemed escape hatch.
pub fn is_arbitrary_value(input: &str) -> bool {
  parse_arbitrary_value(input).is_some()
}

pub fn parse_arbitrary_value(input: &str) -> Option<&str> {
  input
    .strip_prefix("var(---,")
    .and_then(|rest| rest.strip_suffix(')'))
    .map(str::trim)
}

/// A bare number, scaled by the configured grid unit at compile time.
pub fn is_grid_value(input: &str) -> bool {
  !input.is_empty() && input.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  struct TestVariants;

  impl VariantSet for TestVariants {
    fn is_responsive(&self, name: &str) -> bool {
      matches!(name, "md" | "lg")
    }

    fn is_selector(&self, name: &str) -> bool {
      matches!(name, "hover" | "focus")
    }
  }

  fn parse(input: &str) -> Result<TokenProperty, GrammarError> {
    parse_token_property(input, &TestVariants)
  }

  #[test]
  fn parses_bare_alias() {
    assert_eq!(parse("--padding"), Ok(TokenProperty::new("padding")));
  }

  #[test]
  fn parses_responsive_and_selector_in_any_order() {
    let expected = TokenProperty {
      alias: "color".into(),
      responsive: Some("md".into()),
      selector: Some(Selector::Named("hover".into())),
    };
    assert_eq!(parse("--md_hover_color"), Ok(expected.clone()));
    assert_eq!(parse("--hover_md_color"), Ok(expected));
  }

  #[test]
  fn parses_arbitrary_selector() {
    let parsed = parse("--{&;hover_>_svg}_fill").unwrap();
    assert_eq!(
      parsed.selector,
      Some(Selector::Arbitrary("&:hover > svg".into()))
    );
    assert_eq!(parsed.alias, "fill");
  }

  #[test]
  fn rejects_duplicate_variants() {
    assert_eq!(
      parse("--md_lg_color"),
      Err(GrammarError::UnknownVariant("lg".into()))
    );
    assert_eq!(
      parse("--hover_focus_color"),
      Err(GrammarError::UnknownVariant("focus".into()))
    );
  }

  #[test]
  fn rejects_unknown_variant() {
    assert_eq!(
      parse("--xl_color"),
      Err(GrammarError::UnknownVariant("xl".into()))
    );
  }

  #[test]
  fn rejects_empty_arbitrary_selector() {
    assert_eq!(parse("--{__}_color"), Err(GrammarError::EmptyArbitrarySelector));
    assert_eq!(parse("--{}_color"), Err(GrammarError::UnresolvedPlaceholder));
  }

  #[test]
  fn rejects_non_tokens() {
    assert_eq!(parse("padding"), Err(GrammarError::NotAToken));
    assert_eq!(parse("--"), Err(GrammarError::NotAToken));
    assert_eq!(parse("---private"), Err(GrammarError::NotAToken));
  }

  #[test]
  fn round_trips_canonical_form() {
    for input in ["--padding", "--md_hover_color", "--{&;focus-within}_outline-color"] {
      let parsed = parse(input).unwrap();
      assert_eq!(parse(&parsed.serialize()), Ok(parsed));
    }
  }

  #[test]
  fn canonicalizes_variant_order() {
    let parsed = parse("--hover_md_color").unwrap();
    assert_eq!(parsed.serialize(), "--md_hover_color");
  }

  #[test]
  fn parses_token_values() {
    assert_eq!(
      parse_token_value("var(--color_sky-500)"),
      Ok(TokenValue::new("color", "sky-500"))
    );
    assert_eq!(
      parse_token_value("var(--color_sky-500)").unwrap().serialize(),
      "var(--color_sky-500)"
    );
    assert_eq!(
      parse_token_value("var(--color)"),
      Err(GrammarError::NotATokenValue)
    );
    assert_eq!(
      parse_token_value("--color_sky-500"),
      Err(GrammarError::NotATokenValue)
    );
  }

  #[test]
  fn detects_arbitrary_and_grid_values() {
    assert_eq!(parse_arbitrary_value("var(---,10px)"), Some("10px"));
    assert!(is_arbitrary_value("var(---,rgba(0,0,0,0.5))"));
    assert!(!is_arbitrary_value("var(--color_sky-500)"));
    assert!(is_grid_value("4"));
    assert!(is_grid_value("-1.5"));
    assert!(!is_grid_value("4px"));
  }
}
