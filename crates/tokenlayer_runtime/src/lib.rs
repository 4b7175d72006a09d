mod composer;
mod lru;

pub use composer::{ComposeConfig, ComposedStyle, ComposerOptions, Style, StyleComposer};
