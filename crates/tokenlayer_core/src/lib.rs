pub mod grammar;
pub mod hash;
pub mod properties;
pub mod value;

pub use grammar::{
  is_arbitrary_value, is_grid_value, parse_arbitrary_value, parse_token_property,
  parse_token_value, GrammarError, Selector, TokenProperty, TokenValue, VariantSet,
};
pub use value::StyleValue;
