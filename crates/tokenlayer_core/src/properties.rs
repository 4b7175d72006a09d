//! Static CSS property tables.
//!
//! The shorthand table drives recursive longhand expansion and, through
//! specificity depth, the numbered cascade-layer a rule lands in. The table
//! is intentionally not user-configurable; user aliases layer on top of it.

use std::collections::HashMap;
use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Shorthand -> direct longhands. Expansion is recursive: an entry's
/// longhand may itself appear as a key (`border` -> `border-top` ->
/// `border-top-color`).
pub static SHORTHANDS: &[(&str, &[&str])] = &[
  ("margin", &["margin-top", "margin-right", "margin-bottom", "margin-left"]),
  ("margin-inline", &["margin-inline-start", "margin-inline-end"]),
  ("margin-block", &["margin-block-start", "margin-block-end"]),
  ("padding", &["padding-top", "padding-right", "padding-bottom", "padding-left"]),
  ("padding-inline", &["padding-inline-start", "padding-inline-end"]),
  ("padding-block", &["padding-block-start", "padding-block-end"]),
  ("inset", &["top", "right", "bottom", "left"]),
  ("inset-inline", &["inset-inline-start", "inset-inline-end"]),
  ("inset-block", &["inset-block-start", "inset-block-end"]),
  ("border", &["border-top", "border-right", "border-bottom", "border-left"]),
  ("border-top", &["border-top-width", "border-top-style", "border-top-color"]),
  ("border-right", &["border-right-width", "border-right-style", "border-right-color"]),
  ("border-bottom", &["border-bottom-width", "border-bottom-style", "border-bottom-color"]),
  ("border-left", &["border-left-width", "border-left-style", "border-left-color"]),
  ("border-width", &["border-top-width", "border-right-width", "border-bottom-width", "border-left-width"]),
  ("border-style", &["border-top-style", "border-right-style", "border-bottom-style", "border-left-style"]),
  ("border-color", &["border-top-color", "border-right-color", "border-bottom-color", "border-left-color"]),
  ("border-inline", &["border-inline-start", "border-inline-end"]),
  ("border-inline-start", &["border-inline-start-width", "border-inline-start-style", "border-inline-start-color"]),
  ("border-inline-end", &["border-inline-end-width", "border-inline-end-style", "border-inline-end-color"]),
  ("border-block", &["border-block-start", "border-block-end"]),
  ("border-block-start", &["border-block-start-width", "border-block-start-style", "border-block-start-color"]),
  ("border-block-end", &["border-block-end-width", "border-block-end-style", "border-block-end-color"]),
  ("border-radius", &["border-top-left-radius", "border-top-right-radius", "border-bottom-right-radius", "border-bottom-left-radius"]),
  ("border-image", &["border-image-source", "border-image-slice", "border-image-width", "border-image-outset", "border-image-repeat"]),
  ("background", &["background-color", "background-image", "background-position", "background-size", "background-repeat", "background-origin", "background-clip", "background-attachment"]),
  ("background-position", &["background-position-x", "background-position-y"]),
  ("font", &["font-family", "font-size", "font-style", "font-variant", "font-weight", "font-stretch", "line-height"]),
  ("flex", &["flex-grow", "flex-shrink", "flex-basis"]),
  ("flex-flow", &["flex-direction", "flex-wrap"]),
  ("gap", &["row-gap", "column-gap"]),
  ("place-items", &["align-items", "justify-items"]),
  ("place-content", &["align-content", "justify-content"]),
  ("place-self", &["align-self", "justify-self"]),
  ("overflow", &["overflow-x", "overflow-y"]),
  ("outline", &["outline-width", "outline-style", "outline-color"]),
  ("text-decoration", &["text-decoration-line", "text-decoration-style", "text-decoration-color", "text-decoration-thickness"]),
  ("text-emphasis", &["text-emphasis-style", "text-emphasis-color"]),
  ("transition", &["transition-property", "transition-duration", "transition-timing-function", "transition-delay"]),
  ("animation", &["animation-name", "animation-duration", "animation-timing-function", "animation-delay", "animation-iteration-count", "animation-direction", "animation-fill-mode", "animation-play-state"]),
  ("grid-area", &["grid-row", "grid-column"]),
  ("grid-row", &["grid-row-start", "grid-row-end"]),
  ("grid-column", &["grid-column-start", "grid-column-end"]),
  ("grid-template", &["grid-template-rows", "grid-template-columns", "grid-template-areas"]),
  ("columns", &["column-width", "column-count"]),
  ("column-rule", &["column-rule-width", "column-rule-style", "column-rule-color"]),
  ("list-style", &["list-style-type", "list-style-position", "list-style-image"]),
  ("container", &["container-name", "container-type"]),
];

/// Writing-mode-relative properties. These never receive the
/// inheritance-reset applied to non-inherited physical properties, and
/// their rules land in the logical layer families.
static LOGICAL: &[&str] = &[
  "margin-inline", "margin-inline-start", "margin-inline-end",
  "margin-block", "margin-block-start", "margin-block-end",
  "padding-inline", "padding-inline-start", "padding-inline-end",
  "padding-block", "padding-block-start", "padding-block-end",
  "inset-inline", "inset-inline-start", "inset-inline-end",
  "inset-block", "inset-block-start", "inset-block-end",
  "border-inline", "border-inline-start", "border-inline-end",
  "border-inline-start-width", "border-inline-start-style", "border-inline-start-color",
  "border-inline-end-width", "border-inline-end-style", "border-inline-end-color",
  "border-block", "border-block-start", "border-block-end",
  "border-block-start-width", "border-block-start-style", "border-block-start-color",
  "border-block-end-width", "border-block-end-style", "border-block-end-color",
  "border-start-start-radius", "border-start-end-radius",
  "border-end-start-radius", "border-end-end-radius",
  "inline-size", "block-size",
  "min-inline-size", "min-block-size",
  "max-inline-size", "max-block-size",
];

/// Properties inherited by default; everything else physical gets the
/// `initial` reset on matched elements so unset tokens never leak.
static INHERITED: &[&str] = &[
  "color", "cursor", "direction", "font", "font-family", "font-size",
  "font-style", "font-variant", "font-weight", "font-stretch",
  "letter-spacing", "line-height", "list-style", "list-style-image",
  "list-style-position", "list-style-type", "quotes", "text-align",
  "text-indent", "text-transform", "visibility", "white-space",
  "word-break", "word-spacing", "overflow-wrap",
];

/// Leaf properties recognised beyond the shorthand table. An alias that is
/// neither configured nor recognised expands to nothing.
static LEAVES: &[&str] = &[
  "accent-color", "align-content", "align-items", "align-self",
  "appearance", "aspect-ratio", "backdrop-filter", "bottom", "box-shadow",
  "box-sizing", "caret-color", "clip-path", "color", "color-scheme",
  "content", "cursor", "direction", "display", "fill", "filter",
  "flex-direction", "flex-wrap", "float", "grid-auto-columns",
  "grid-auto-flow", "grid-auto-rows", "height", "isolation",
  "justify-content", "justify-items", "justify-self", "left",
  "letter-spacing", "line-height", "max-height", "max-width", "min-height",
  "min-width", "mix-blend-mode", "object-fit", "object-position",
  "opacity", "order", "pointer-events", "position", "quotes", "resize",
  "right", "rotate", "scale", "scroll-behavior", "scroll-margin",
  "scroll-padding", "stroke", "stroke-width", "text-align", "text-indent",
  "text-overflow", "text-transform", "text-wrap", "top", "transform",
  "transform-origin", "translate", "user-select", "vertical-align",
  "visibility", "white-space", "width", "will-change", "word-break",
  "word-spacing", "overflow-wrap", "z-index",
];

/// Properties that accept bare-number grid values (multiplied by the
/// configured base unit).
static SPACE_SCALE: &[&str] = &[
  "margin", "margin-top", "margin-right", "margin-bottom", "margin-left",
  "margin-inline", "margin-inline-start", "margin-inline-end",
  "margin-block", "margin-block-start", "margin-block-end",
  "padding", "padding-top", "padding-right", "padding-bottom", "padding-left",
  "padding-inline", "padding-inline-start", "padding-inline-end",
  "padding-block", "padding-block-start", "padding-block-end",
  "inset", "top", "right", "bottom", "left",
  "inset-inline", "inset-inline-start", "inset-inline-end",
  "inset-block", "inset-block-start", "inset-block-end",
  "gap", "row-gap", "column-gap",
  "width", "height", "min-width", "min-height", "max-width", "max-height",
  "inline-size", "block-size", "min-inline-size", "min-block-size",
  "max-inline-size", "max-block-size",
  "flex-basis", "text-indent", "border-radius",
  "border-top-left-radius", "border-top-right-radius",
  "border-bottom-right-radius", "border-bottom-left-radius",
  "scroll-margin", "scroll-padding", "translate",
];

static SHORTHAND_MAP: Lazy<HashMap<&'static str, &'static [&'static str]>> =
  Lazy::new(|| SHORTHANDS.iter().copied().collect());

/// Longhand -> shorthands that contain it directly.
static CONTAINING_SHORTHANDS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
  let mut map: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
  for (shorthand, longhands) in SHORTHANDS {
    for longhand in *longhands {
      map.entry(longhand).or_default().push(shorthand);
    }
  }
  map
});

static RECOGNIZED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  let mut set: HashSet<&'static str> = LEAVES.iter().copied().collect();
  for (shorthand, longhands) in SHORTHANDS {
    set.insert(shorthand);
    set.extend(longhands.iter().copied());
  }
  set.extend(LOGICAL.iter().copied());
  set
});

static LOGICAL_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| LOGICAL.iter().copied().collect());
static INHERITED_SET: Lazy<HashSet<&'static str>> =
  Lazy::new(|| INHERITED.iter().copied().collect());
static SPACE_SCALE_SET: Lazy<HashSet<&'static str>> =
  Lazy::new(|| SPACE_SCALE.iter().copied().collect());

pub fn direct_longhands(property: &str) -> Option<&'static [&'static str]> {
  SHORTHAND_MAP.get(property).copied()
}

pub fn containing_shorthands(property: &str) -> &[&'static str] {
  CONTAINING_SHORTHANDS
    .get(property)
    .map(Vec::as_slice)
    .unwrap_or(&[])
}

/// Recognised CSS property, or an authored custom property (`--x`).
pub fn is_recognized(property: &str) -> bool {
  RECOGNIZED.contains(property) || property.starts_with("--")
}

pub fn is_logical(property: &str) -> bool {
  LOGICAL_SET.contains(property)
}

pub fn is_inherited(property: &str) -> bool {
  INHERITED_SET.contains(property)
}

pub fn is_space_scale(property: &str) -> bool {
  SPACE_SCALE_SET.contains(property)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn expands_shorthands_one_level() {
    assert_eq!(
      direct_longhands("padding"),
      Some(&["padding-top", "padding-right", "padding-bottom", "padding-left"][..])
    );
    assert_eq!(direct_longhands("padding-left"), None);
  }

  #[test]
  fn tracks_containing_shorthands() {
    let mut shorthands = containing_shorthands("border-top-color").to_vec();
    shorthands.sort_unstable();
    assert_eq!(shorthands, vec!["border-color", "border-top"]);
    assert_eq!(containing_shorthands("border-top"), &["border"]);
  }

  #[test]
  fn classifies_properties() {
    assert!(is_recognized("padding-left"));
    assert!(is_recognized("--brand-accent"));
    assert!(is_recognized("padding"));
    assert!(!is_recognized("paddin"));
    assert!(is_logical("margin-inline-start"));
    assert!(!is_logical("margin-left"));
    assert!(is_inherited("color"));
    assert!(!is_inherited("padding-left"));
    assert!(is_space_scale("row-gap"));
    assert!(!is_space_scale("color"));
  }
}
