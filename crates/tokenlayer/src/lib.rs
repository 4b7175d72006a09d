//! Token-driven atomic CSS build engine.
//!
//! Source files declare styles through CSS custom properties following a
//! small token grammar; the engine scans them incrementally, resolves them
//! against a themeable config, and compiles one cascade-layered stylesheet.
//! A runtime composer mirrors the same semantics for dynamic styles.

mod session;

pub use session::BuildSession;
pub use tokenlayer_compiler::{compile, CompileOptions, ERROR_BANNER, GRID_UNIT};
pub use tokenlayer_config::{
  load_config, resolve, Config, ConfigError, SelectorTemplate, Theme, ThemeValues, UserConfig,
};
pub use tokenlayer_core::{
  parse_arbitrary_value, parse_token_property, parse_token_value, GrammarError, Selector,
  StyleValue, TokenProperty, TokenValue, VariantSet,
};
pub use tokenlayer_filesystem::{
  FileSource, FileSourceRef, FileSystem, FileSystemRef, InMemoryFileSystem, OsFileSource,
  OsFileSystem,
};
pub use tokenlayer_runtime::{
  ComposeConfig, ComposedStyle, ComposerOptions, Style, StyleComposer,
};
pub use tokenlayer_scanner::{
  compose_class_name, recover_stylesheet, scan_file, ComposeBlock, ScanResult, TokenStore,
};
