mod config;
mod loader;
mod resolver;

pub use config::{resolve, Config, SelectorTemplate, Theme, ThemeValues, UserConfig};
pub use loader::{load_config, ConfigError};
pub use resolver::{
  max_specificity_depth, specificity_depth, ResolvedThemeValue, ThemeError, THEME_DEPTH_CEILING,
};
