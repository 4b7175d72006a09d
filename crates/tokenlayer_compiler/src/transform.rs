//! Final minify/downlevel pass over the assembled stylesheet.

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::MinifyOptions;
use lightningcss::stylesheet::ParserOptions;
use lightningcss::stylesheet::StyleSheet;
use lightningcss::targets::Browsers;
use lightningcss::targets::Targets;
use thiserror::Error;

use crate::compiler::CompileOptions;

#[derive(Debug, Error)]
pub enum CompileError {
  #[error("invalid browser targets: {0}")]
  Targets(String),
  #[error("stylesheet transform failed: {0}")]
  Transform(String),
}

/// Emitted instead of a stylesheet when the transform fails: a broken
/// build must never silently produce no output.
pub const ERROR_BANNER: &str = r#":root::after {
  content: "Stylesheet generation failed. See the build output for details.";
  position: fixed;
  inset: 0;
  z-index: 2147483647;
  padding: 1rem;
  font-family: monospace;
  font-size: 1rem;
  background: #fff0f0;
  color: #b00020;
  border: 4px solid #b00020;
}
"#;

/// Runs the assembled text through lightningcss: parse, minify-transform
/// against the browser targets, and reprint. The parse also strips layer
/// blocks that ended up empty.
pub fn transform(css: &str, options: &CompileOptions) -> Result<String, CompileError> {
  let browsers = if options.targets.is_empty() {
    None
  } else {
    Browsers::from_browserslist(&options.targets)
      .map_err(|error| CompileError::Targets(error.to_string()))?
  };
  let targets = Targets {
    browsers,
    ..Targets::default()
  };

  let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
    .map_err(|error| CompileError::Transform(error.to_string()))?;
  stylesheet
    .minify(MinifyOptions {
      targets,
      ..MinifyOptions::default()
    })
    .map_err(|error| CompileError::Transform(error.to_string()))?;
  let output = stylesheet
    .to_css(PrinterOptions {
      minify: options.minify,
      targets,
      ..PrinterOptions::default()
    })
    .map_err(|error| CompileError::Transform(error.to_string()))?;
  Ok(output.code)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn options(targets: &[&str]) -> CompileOptions {
    CompileOptions {
      minify: false,
      targets: targets.iter().map(|t| (*t).to_string()).collect(),
    }
  }

  #[test]
  fn passes_valid_css_through() {
    let css = "@layer tkb {\n:root { --_tk-grid: 0.25rem; }\n}\n";
    let output = transform(css, &options(&[])).unwrap();
    assert!(output.contains("--_tk-grid"));
  }

  #[test]
  fn rejects_bad_browser_targets() {
    let result = transform(":root {}", &options(&["definitely not a browser"]));
    assert!(matches!(result, Err(CompileError::Targets(_))));
  }

  #[test]
  fn the_banner_is_itself_valid_css() {
    let output = transform(ERROR_BANNER, &options(&[])).unwrap();
    assert!(output.contains("Stylesheet generation failed"));
  }
}
