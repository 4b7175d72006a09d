//! Round-trip recovery of compose blocks from a previously generated
//! stylesheet. Walks the sheet's reserved components layer structurally
//! instead of re-deriving from source, so `includes` can reference styles
//! compiled by a different package or build.

use std::collections::BTreeMap;

use lightningcss::printer::PrinterOptions;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::ParserOptions;
use lightningcss::stylesheet::StyleSheet;
use lightningcss::traits::ToCss;
use tokenlayer_config::Config;
use tokenlayer_core::grammar::parse_token_property;
use tokenlayer_core::value::CALC_SUFFIX;
use tokenlayer_core::StyleValue;

use crate::compose::ComposeBlock;
use crate::scanner::ScanResult;

/// The layer compose blocks are emitted into.
pub const COMPONENTS_LAYER: &str = "tkc";

/// Recovers compose blocks from `css_text`'s components layer. Tolerant:
/// anything that does not look like an emitted block is skipped, and an
/// unparseable sheet yields an empty result.
pub fn recover_stylesheet(config: &Config, css_text: &str) -> ScanResult {
  let options = ParserOptions {
    error_recovery: true,
    ..ParserOptions::default()
  };
  let stylesheet = match StyleSheet::parse(css_text, options) {
    Ok(stylesheet) => stylesheet,
    Err(error) => {
      tracing::warn!(%error, "could not parse stylesheet for compose recovery");
      return ScanResult::default();
    }
  };

  let mut result = ScanResult::default();
  for rule in &stylesheet.rules.0 {
    let CssRule::LayerBlock(layer) = rule else {
      continue;
    };
    let is_components = layer
      .name
      .as_ref()
      .and_then(|name| name.to_css_string(PrinterOptions::default()).ok())
      .is_some_and(|name| name == COMPONENTS_LAYER);
    if !is_components {
      continue;
    }
    for rule in &layer.rules.0 {
      let CssRule::Style(style) = rule else {
        continue;
      };
      let Some(class_name) = single_class_selector(style) else {
        continue;
      };
      let base = recover_base(config, style);
      if base.is_empty() {
        continue;
      }
      for key in base.keys() {
        if let Ok(property) = parse_token_property(key, config) {
          result.properties.push(property);
        }
      }
      let _ = result.compose_blocks.insert(
        class_name.clone(),
        ComposeBlock { class_name, base },
      );
    }
  }
  result
}

fn single_class_selector(style: &lightningcss::rules::style::StyleRule<'_>) -> Option<String> {
  let selector = style
    .selectors
    .to_css_string(PrinterOptions::default())
    .ok()?;
  let class = selector.strip_prefix('.')?;
  let simple = !class.contains([' ', ',', ':', '.', '[', '>']);
  simple.then(|| class.to_string())
}

/// Reads back the token custom properties an emitted block carries; the
/// derived longhand declarations and `__calc` sentinels are skipped.
fn recover_base(
  config: &Config,
  style: &lightningcss::rules::style::StyleRule<'_>,
) -> BTreeMap<String, StyleValue> {
  let mut base = BTreeMap::new();
  for declaration in style
    .declarations
    .declarations
    .iter()
    .chain(style.declarations.important_declarations.iter())
  {
    let Ok(text) = declaration.to_css_string(false, PrinterOptions::default()) else {
      continue;
    };
    let Some((name, value)) = text.split_once(':') else {
      continue;
    };
    let name = name.trim();
    let value = value.trim();
    if !name.starts_with("--") || name.ends_with(CALC_SUFFIX) {
      continue;
    }
    if parse_token_property(name, config).is_err() {
      continue;
    }
    let value = match value.parse::<f64>() {
      Ok(number) => StyleValue::Num(number),
      Err(_) => StyleValue::Str(value.to_string()),
    };
    let _ = base.insert(name.to_string(), value);
  }
  base
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use tokenlayer_core::StyleValue;

  use super::*;

  #[test]
  fn recovers_blocks_from_the_components_layer() {
    let config = Config::default();
    let css = r#"
      @layer tk2 {
        [style*="--padding:"] { padding-top: 1px; }
      }
      @layer tkc {
        .tk-1a2b3c4d {
          --display: flex;
          --padding: 4;
          --padding__calc: /**/;
          padding-top: 1rem;
        }
      }
    "#;

    let result = recover_stylesheet(&config, css);
    assert_eq!(result.compose_blocks.len(), 1);
    let block = result.compose_blocks.get("tk-1a2b3c4d").unwrap();
    assert_eq!(block.base.get("--display"), Some(&StyleValue::Str("flex".into())));
    assert_eq!(block.base.get("--padding"), Some(&StyleValue::Num(4.0)));
    assert_eq!(block.base.get("--padding__calc"), None);
    assert_eq!(result.properties.len(), 2);
  }

  #[test]
  fn unparseable_sheets_yield_nothing() {
    let config = Config::default();
    let result = recover_stylesheet(&config, "this is not css {{{");
    assert_eq!(result, ScanResult::default());
  }
}
