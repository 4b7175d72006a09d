use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Suffix of the sentinel property that switches a longhand into grid
/// (`calc`) scaling. Compiled selectors gate on its presence only.
pub const CALC_SUFFIX: &str = "__calc";

/// Marker written to a `__calc` sentinel when a numeric value turns grid
/// scaling on. Any non-`initial` value works; this one reads as intent.
pub const CALC_TOGGLE_ON: &str = "/*on*/";

/// A style literal: token-style objects are plain `key -> string | number`
/// maps, safe to spread into any inline-style mechanism. Numbers are grid
/// values (scaled by the configured base unit at compile time).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
  Str(String),
  Num(f64),
}

impl StyleValue {
  pub fn is_numeric(&self) -> bool {
    matches!(self, StyleValue::Num(_))
  }
}

impl fmt::Display for StyleValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StyleValue::Str(s) => f.write_str(s),
      // Whole numbers print without a trailing `.0` so hashes and CSS text
      // are stable across producers.
      StyleValue::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
      StyleValue::Num(n) => write!(f, "{}", n),
    }
  }
}

impl From<&str> for StyleValue {
  fn from(value: &str) -> Self {
    StyleValue::Str(value.to_string())
  }
}

impl From<String> for StyleValue {
  fn from(value: String) -> Self {
    StyleValue::Str(value)
  }
}

impl From<f64> for StyleValue {
  fn from(value: f64) -> Self {
    StyleValue::Num(value)
  }
}

impl From<i32> for StyleValue {
  fn from(value: i32) -> Self {
    StyleValue::Num(value.into())
  }
}
