//! Cascade-layer bookkeeping.
//!
//! CSS layer precedence is fixed by declaration order, so every layer name
//! is declared once, up front, even when it ends up empty. Empty layer
//! blocks themselves are never emitted (a cosmetic pass; the declaration
//! statement is the contract).

use indexmap::IndexMap;

/// Reserved for host-authored globals; never filled by the compiler.
pub const GLOBAL_LAYER: &str = "global";
/// Theme tokens, resets and variant toggles.
pub const TOKENS_LAYER: &str = "tkb";
/// Compose-block component rules.
pub const COMPONENTS_LAYER: &str = "tkc";

/// The four numbered atomic families. A longhand's rules land in the layer
/// numbered by its specificity depth, so a deeper shorthand expansion is
/// layered after a shallower one regardless of source order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
  Base,
  Logical,
  Selector,
  LogicalSelector,
}

impl Family {
  pub fn atomic(is_logical: bool, has_variants: bool) -> Self {
    match (is_logical, has_variants) {
      (false, false) => Family::Base,
      (true, false) => Family::Logical,
      (false, true) => Family::Selector,
      (true, true) => Family::LogicalSelector,
    }
  }

  fn prefix(self) -> &'static str {
    match self {
      Family::Base => "tk",
      Family::Logical => "tkl",
      Family::Selector => "tks",
      Family::LogicalSelector => "tksl",
    }
  }

  pub fn layer(self, depth: usize) -> String {
    format!("{}{}", self.prefix(), depth)
  }
}

/// Assembles rules into named layers and renders them in the declared
/// order: `global, tkb, tk0.., tkl0.., tks0.., tksl0.., tkc`.
#[derive(Debug)]
pub struct LayerSheet {
  order: Vec<String>,
  blocks: IndexMap<String, String>,
}

impl LayerSheet {
  pub fn new(max_depth: usize) -> Self {
    let mut order = vec![GLOBAL_LAYER.to_string(), TOKENS_LAYER.to_string()];
    for family in [
      Family::Base,
      Family::Logical,
      Family::Selector,
      Family::LogicalSelector,
    ] {
      for depth in 0..=max_depth {
        order.push(family.layer(depth));
      }
    }
    order.push(COMPONENTS_LAYER.to_string());
    LayerSheet {
      order,
      blocks: IndexMap::new(),
    }
  }

  pub fn push(&mut self, layer: &str, rule: &str) {
    debug_assert!(self.order.iter().any(|name| name == layer));
    let block = self.blocks.entry(layer.to_string()).or_default();
    block.push_str(rule);
    if !rule.ends_with('\n') {
      block.push('\n');
    }
  }

  pub fn render(&self) -> String {
    let mut out = format!("@layer {};\n\n", self.order.join(", "));
    for name in &self.order {
      let Some(block) = self.blocks.get(name) else {
        continue;
      };
      if block.is_empty() {
        continue;
      }
      out.push_str(&format!("@layer {} {{\n{}}}\n\n", name, block));
    }
    out
  }
}

/// Selects elements that set `name` inline, e.g. `[style*="--px:"]`.
pub fn style_attr_selector(name: &str) -> String {
  format!("[style*=\"{}:\"]", name)
}
