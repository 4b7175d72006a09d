use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use tokenlayer_core::VariantSet;

/// `themeKey -> token -> literal value`, e.g. `color -> sky-500 -> #0ea5e9`.
pub type ThemeValues = IndexMap<String, IndexMap<String, String>>;

/// A theme is either flat, or a root value set plus named modes that all
/// share the root's key shape.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Theme {
  Modes {
    root: ThemeValues,
    modes: IndexMap<String, ThemeValues>,
  },
  Flat(ThemeValues),
}

impl Default for Theme {
  fn default() -> Self {
    Theme::Flat(ThemeValues::default())
  }
}

impl Theme {
  pub fn root_values(&self) -> &ThemeValues {
    match self {
      Theme::Flat(values) => values,
      Theme::Modes { root, .. } => root,
    }
  }

  pub fn modes(&self) -> Option<&IndexMap<String, ThemeValues>> {
    match self {
      Theme::Flat(_) => None,
      Theme::Modes { modes, .. } => Some(modes),
    }
  }

  /// Whether any value set (root or mode) contains the entry. The scanner
  /// uses this to confirm a syntactic token value actually resolves.
  pub fn contains(&self, theme_key: &str, token: &str) -> bool {
    let in_values =
      |values: &ThemeValues| values.get(theme_key).is_some_and(|t| t.contains_key(token));
    if in_values(self.root_values()) {
      return true;
    }
    self
      .modes()
      .is_some_and(|modes| modes.values().any(in_values))
  }
}

/// A configured selector: one template or several, each containing `&` for
/// the matched element.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SelectorTemplate {
  One(String),
  Many(Vec<String>),
}

impl SelectorTemplate {
  pub fn templates(&self) -> &[String] {
    match self {
      SelectorTemplate::One(template) => std::slice::from_ref(template),
      SelectorTemplate::Many(templates) => templates,
    }
  }
}

/// The fully resolved configuration. Loaded once per build/session and
/// replaced wholesale on change.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
  pub include: Vec<String>,
  pub exclude: Vec<String>,
  /// The grid base unit bare numeric values are multiplied by.
  pub grid: String,
  /// Responsive variant name -> media query.
  pub responsive: IndexMap<String, String>,
  /// Selector variant name -> selector template(s).
  pub selectors: IndexMap<String, SelectorTemplate>,
  /// Animation name -> step -> declarations.
  pub keyframes: IndexMap<String, IndexMap<String, IndexMap<String, String>>>,
  pub theme: Theme,
  /// Alias -> CSS longhands it expands to (many-to-many).
  pub aliases: IndexMap<String, Vec<String>>,
  /// CSS property -> theme keys it accepts (`grid` enables numeric scaling).
  pub properties: IndexMap<String, Vec<String>>,
  /// Authored custom property -> theme keys it accepts.
  pub custom_properties: IndexMap<String, Vec<String>>,
  /// Selector the root theme values are declared on.
  pub root_selector: String,
  /// Template for mode value sets; `{mode}` is replaced by the mode name.
  pub theme_selector: String,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      include: Vec::new(),
      exclude: Vec::new(),
      grid: "0.25rem".into(),
      responsive: IndexMap::new(),
      selectors: default_selectors(),
      keyframes: IndexMap::new(),
      theme: Theme::default(),
      aliases: IndexMap::new(),
      properties: default_properties(),
      custom_properties: IndexMap::new(),
      root_selector: ":root".into(),
      theme_selector: ".theme-{mode}".into(),
    }
  }
}

impl Config {
  pub fn theme_mode_selector(&self, mode: &str) -> String {
    self.theme_selector.replace("{mode}", mode)
  }
}

impl VariantSet for Config {
  fn is_responsive(&self, name: &str) -> bool {
    self.responsive.contains_key(name)
  }

  fn is_selector(&self, name: &str) -> bool {
    self.selectors.contains_key(name)
  }
}

/// User configuration as authored. Every key is optional; `resolve` merges
/// it over the defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
  pub include: Option<Vec<String>>,
  pub exclude: Option<Vec<String>>,
  pub grid: Option<String>,
  pub responsive: Option<IndexMap<String, String>>,
  pub selectors: Option<IndexMap<String, SelectorTemplate>>,
  pub keyframes: Option<IndexMap<String, IndexMap<String, IndexMap<String, String>>>>,
  pub theme: Option<Theme>,
  pub aliases: Option<IndexMap<String, Vec<String>>>,
  pub properties: Option<IndexMap<String, Vec<String>>>,
  pub custom_properties: Option<IndexMap<String, Vec<String>>>,
  pub root_selector: Option<String>,
  pub theme_selector: Option<String>,
}

/// Shallow merge: a present user key replaces the default wholesale, there
/// is no recursive merging of nested maps.
pub fn resolve(user: UserConfig) -> Config {
  let defaults = Config::default();
  Config {
    include: user.include.unwrap_or(defaults.include),
    exclude: user.exclude.unwrap_or(defaults.exclude),
    grid: user.grid.unwrap_or(defaults.grid),
    responsive: user.responsive.unwrap_or(defaults.responsive),
    selectors: user.selectors.unwrap_or(defaults.selectors),
    keyframes: user.keyframes.unwrap_or(defaults.keyframes),
    theme: user.theme.unwrap_or(defaults.theme),
    aliases: user.aliases.unwrap_or(defaults.aliases),
    properties: user.properties.unwrap_or(defaults.properties),
    custom_properties: user.custom_properties.unwrap_or(defaults.custom_properties),
    root_selector: user.root_selector.unwrap_or(defaults.root_selector),
    theme_selector: user.theme_selector.unwrap_or(defaults.theme_selector),
  }
}

fn default_selectors() -> IndexMap<String, SelectorTemplate> {
  [
    ("hover", "&:hover"),
    ("focus", "&:focus"),
    ("focus-visible", "&:focus-visible"),
    ("focus-within", "&:focus-within"),
    ("active", "&:active"),
    ("visited", "&:visited"),
    ("disabled", "&[disabled]"),
    ("checked", "&:checked"),
    ("first-child", "&:first-child"),
    ("last-child", "&:last-child"),
    ("odd", "&:nth-child(odd)"),
    ("even", "&:nth-child(even)"),
    ("before", "&::before"),
    ("after", "&::after"),
    ("placeholder", "&::placeholder"),
    ("selection", "&::selection"),
    ("rtl", "[dir=\"rtl\"] &"),
    ("ltr", "[dir=\"ltr\"] &"),
    ("dark", ".theme-dark &"),
    ("light", ".theme-light &"),
  ]
  .into_iter()
  .map(|(name, template)| (name.to_string(), SelectorTemplate::One(template.to_string())))
  .collect()
}

fn default_properties() -> IndexMap<String, Vec<String>> {
  let grid_scaled: &[&str] = &[
    "margin", "margin-top", "margin-right", "margin-bottom", "margin-left",
    "margin-inline", "margin-block", "padding", "padding-top",
    "padding-right", "padding-bottom", "padding-left", "padding-inline",
    "padding-block", "inset", "top", "right", "bottom", "left", "gap",
    "row-gap", "column-gap", "width", "height", "min-width", "min-height",
    "max-width", "max-height", "inline-size", "block-size", "flex-basis",
  ];
  let colored: &[&str] = &[
    "color", "background-color", "border-color", "border-top-color",
    "border-right-color", "border-bottom-color", "border-left-color",
    "outline-color", "text-decoration-color", "fill", "stroke",
    "caret-color", "accent-color",
  ];

  let mut properties = IndexMap::new();
  for property in grid_scaled {
    let _ = properties.insert((*property).to_string(), vec!["grid".into(), "space".into()]);
  }
  for property in colored {
    let _ = properties.insert((*property).to_string(), vec!["color".into()]);
  }
  let _ = properties.insert("border-radius".into(), vec!["grid".into(), "radii".into()]);
  let _ = properties.insert("font-size".into(), vec!["font-size".into()]);
  let _ = properties.insert("font-family".into(), vec!["font".into()]);
  let _ = properties.insert("line-height".into(), vec!["leading".into()]);
  let _ = properties.insert("box-shadow".into(), vec!["shadow".into()]);
  let _ = properties.insert("animation".into(), vec!["anim".into()]);
  let _ = properties.insert("transition".into(), vec!["transition".into()]);
  let _ = properties.insert("z-index".into(), vec!["layer".into()]);
  properties
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn merge_is_shallow() {
    let user: UserConfig = serde_json::from_str(
      r#"{
        "grid": "0.5rem",
        "selectors": { "hover": "&:hover" }
      }"#,
    )
    .unwrap();
    let config = resolve(user);

    assert_eq!(config.grid, "0.5rem");
    // Present keys replace wholesale: only the user's selector survives.
    assert_eq!(config.selectors.len(), 1);
    // Absent keys fall back wholesale.
    assert_eq!(config.root_selector, ":root");
    assert!(config.properties.contains_key("padding-left"));
  }

  #[test]
  fn parses_flat_and_moded_themes() {
    let flat: Theme =
      serde_json::from_str(r##"{ "color": { "sky-500": "#0ea5e9" } }"##).unwrap();
    assert!(flat.contains("color", "sky-500"));
    assert!(!flat.contains("color", "mint-200"));

    let moded: Theme = serde_json::from_str(
      r##"{
        "root": { "color": { "surface": "#fff" } },
        "modes": { "dark": { "color": { "surface": "#000" } } }
      }"##,
    )
    .unwrap();
    assert!(moded.contains("color", "surface"));
    assert_eq!(moded.modes().unwrap().len(), 1);
  }

  #[test]
  fn formats_mode_selectors() {
    let config = Config::default();
    assert_eq!(config.theme_mode_selector("dark"), ".theme-dark");
  }
}
