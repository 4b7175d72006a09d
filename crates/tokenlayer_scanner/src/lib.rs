mod compose;
mod recovery;
mod scanner;
mod store;

pub use compose::{compose_class_name, ComposeBlock};
pub use recovery::recover_stylesheet;
pub use scanner::{scan_file, ScanResult};
pub use store::TokenStore;
