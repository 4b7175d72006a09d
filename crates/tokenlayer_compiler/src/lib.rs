mod compiler;
mod property_config;
mod sheet;
mod transform;

pub use compiler::{compile, CompileOptions, GRID_UNIT};
pub use sheet::{Family, LayerSheet, COMPONENTS_LAYER, GLOBAL_LAYER, TOKENS_LAYER};
pub use transform::{transform, CompileError, ERROR_BANNER};
