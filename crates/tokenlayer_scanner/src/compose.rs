//! Static extraction of `compose({...})` blocks.
//!
//! Blocks are located with a balanced textual scan and parsed with a
//! tolerant expression parser that understands only object/array literals
//! of string and number literals. Any dynamic expression makes the whole
//! block unextractable and it is dropped silently; a companion lint tool is
//! responsible for surfacing that to the developer.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tokenlayer_core::hash::short_hash;
use tokenlayer_core::StyleValue;

/// A statically-extracted set of base token styles, keyed by a
/// content-hash class name so identical base styles in different files
/// collapse to one class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComposeBlock {
  pub class_name: String,
  pub base: BTreeMap<String, StyleValue>,
}

impl ComposeBlock {
  pub fn from_base(base: BTreeMap<String, StyleValue>) -> Self {
    let class_name = compose_class_name(&base);
    ComposeBlock { class_name, base }
  }
}

/// Deterministic class name: a short hash of the sorted base entries.
pub fn compose_class_name(base: &BTreeMap<String, StyleValue>) -> String {
  let mut input = String::new();
  for (key, value) in base {
    input.push_str(key);
    input.push(':');
    input.push_str(&value.to_string());
    input.push(';');
  }
  format!("tk-{}", short_hash(&input))
}

/// One compose call as authored, before variant derivation.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SourceComposeBlock {
  pub base: BTreeMap<String, StyleValue>,
  /// Style maps of every `variants` option.
  pub variants: Vec<BTreeMap<String, StyleValue>>,
  /// Style maps of every `responsiveVariants` option.
  pub responsive_variants: Vec<BTreeMap<String, StyleValue>>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("compose block contains a dynamic expression")]
pub(crate) struct Unextractable;

static COMPOSE_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcompose\s*\(").unwrap());

pub(crate) fn extract_compose_blocks(text: &str) -> Vec<SourceComposeBlock> {
  let mut blocks = Vec::new();
  for call in COMPOSE_CALL.find_iter(text) {
    let open = call.end() - 1;
    let Some(argument) = balanced_argument(&text[open..]) else {
      tracing::debug!("unterminated compose call skipped");
      continue;
    };
    match parse_block(argument) {
      Ok(block) => blocks.push(block),
      Err(Unextractable) => {
        tracing::debug!("dropping unextractable compose block");
      }
    }
  }
  blocks
}

/// Returns the text between the call's outer parentheses, tracking bracket
/// depth and string/template literals. Balanced-enough: escapes inside
/// strings are honored, nothing else is interpreted.
fn balanced_argument(text: &str) -> Option<&str> {
  let bytes = text.as_bytes();
  debug_assert_eq!(bytes.first(), Some(&b'('));
  let mut depth = 0usize;
  let mut string: Option<u8> = None;
  let mut escaped = false;
  for (i, &b) in bytes.iter().enumerate() {
    if let Some(quote) = string {
      if escaped {
        escaped = false;
      } else if b == b'\\' {
        escaped = true;
      } else if b == quote {
        string = None;
      }
      continue;
    }
    match b {
      b'\'' | b'"' | b'`' => string = Some(b),
      b'(' | b'{' | b'[' => depth += 1,
      b')' | b'}' | b']' => {
        depth = depth.checked_sub(1)?;
        if depth == 0 {
          return (b == b')').then(|| &text[1..i]);
        }
      }
      _ => {}
    }
  }
  None
}

fn parse_block(argument: &str) -> Result<SourceComposeBlock, Unextractable> {
  let mut parser = Parser::new(argument);
  let expr = parser.parse_expr()?;
  // A second argument or trailing comma is tolerated and ignored.
  let Expr::Object(entries) = expr else {
    return Err(Unextractable);
  };

  let mut block = SourceComposeBlock::default();
  for (key, value) in entries {
    if key.starts_with("--") {
      match value {
        Expr::Str(s) => {
          let _ = block.base.insert(key, StyleValue::Str(s));
        }
        Expr::Num(n) => {
          let _ = block.base.insert(key, StyleValue::Num(n));
        }
        _ => return Err(Unextractable),
      }
    } else if key == "variants" || key == "responsiveVariants" {
      let styles = variant_styles(value)?;
      if key == "variants" {
        block.variants.extend(styles);
      } else {
        block.responsive_variants.extend(styles);
      }
    } else if key == "includes" {
      // Static literal includes carry no styles of their own; anything
      // dynamic already failed the literal parse above.
    } else {
      return Err(Unextractable);
    }
  }
  Ok(block)
}

/// `variants: { name: { option: { '--token': literal } } }`.
fn variant_styles(expr: Expr) -> Result<Vec<BTreeMap<String, StyleValue>>, Unextractable> {
  let Expr::Object(variant_groups) = expr else {
    return Err(Unextractable);
  };
  let mut styles = Vec::new();
  for (_, options) in variant_groups {
    let Expr::Object(options) = options else {
      return Err(Unextractable);
    };
    for (_, style) in options {
      let Expr::Object(entries) = style else {
        return Err(Unextractable);
      };
      let mut map = BTreeMap::new();
      for (key, value) in entries {
        if !key.starts_with("--") {
          return Err(Unextractable);
        }
        match value {
          Expr::Str(s) => {
            let _ = map.insert(key, StyleValue::Str(s));
          }
          Expr::Num(n) => {
            let _ = map.insert(key, StyleValue::Num(n));
          }
          _ => return Err(Unextractable),
        }
      }
      styles.push(map);
    }
  }
  Ok(styles)
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
  Str(String),
  Num(f64),
  Object(Vec<(String, Expr)>),
  Array(Vec<Expr>),
}

struct Parser<'a> {
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> Parser<'a> {
  fn new(text: &'a str) -> Self {
    Parser {
      bytes: text.as_bytes(),
      pos: 0,
    }
  }

  fn peek(&self) -> Option<u8> {
    self.bytes.get(self.pos).copied()
  }

  fn bump(&mut self) -> Option<u8> {
    let b = self.peek()?;
    self.pos += 1;
    Some(b)
  }

  fn skip_trivia(&mut self) {
    loop {
      match self.peek() {
        Some(b) if b.is_ascii_whitespace() => {
          self.pos += 1;
        }
        Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
          while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
              break;
            }
          }
        }
        Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
          self.pos += 2;
          while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'*' && self.bytes.get(self.pos + 1) == Some(&b'/') {
              self.pos += 2;
              break;
            }
            self.pos += 1;
          }
        }
        _ => return,
      }
    }
  }

  fn parse_expr(&mut self) -> Result<Expr, Unextractable> {
    self.skip_trivia();
    match self.peek() {
      Some(b'{') => self.parse_object(),
      Some(b'[') => self.parse_array(),
      Some(b'\'') | Some(b'"') => self.parse_string().map(Expr::Str),
      Some(b'-') | Some(b'+') | Some(b'.') => self.parse_number(),
      Some(b) if b.is_ascii_digit() => self.parse_number(),
      _ => Err(Unextractable),
    }
  }

  fn parse_object(&mut self) -> Result<Expr, Unextractable> {
    let _ = self.bump(); // {
    let mut entries = Vec::new();
    loop {
      self.skip_trivia();
      match self.peek() {
        Some(b'}') => {
          let _ = self.bump();
          return Ok(Expr::Object(entries));
        }
        Some(b',') => {
          let _ = self.bump();
        }
        Some(_) => {
          let key = self.parse_key()?;
          self.skip_trivia();
          if self.bump() != Some(b':') {
            return Err(Unextractable);
          }
          let value = self.parse_expr()?;
          entries.push((key, value));
        }
        None => return Err(Unextractable),
      }
    }
  }

  fn parse_array(&mut self) -> Result<Expr, Unextractable> {
    let _ = self.bump(); // [
    let mut items = Vec::new();
    loop {
      self.skip_trivia();
      match self.peek() {
        Some(b']') => {
          let _ = self.bump();
          return Ok(Expr::Array(items));
        }
        Some(b',') => {
          let _ = self.bump();
        }
        Some(_) => items.push(self.parse_expr()?),
        None => return Err(Unextractable),
      }
    }
  }

  fn parse_key(&mut self) -> Result<String, Unextractable> {
    self.skip_trivia();
    match self.peek() {
      Some(b'\'') | Some(b'"') => self.parse_string(),
      Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => {
        let start = self.pos;
        while let Some(b) = self.peek() {
          if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
            self.pos += 1;
          } else {
            break;
          }
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
      }
      _ => Err(Unextractable),
    }
  }

  fn parse_string(&mut self) -> Result<String, Unextractable> {
    let quote = self.bump().ok_or(Unextractable)?;
    let mut out = Vec::new();
    loop {
      match self.bump() {
        Some(b'\\') => {
          let escaped = self.bump().ok_or(Unextractable)?;
          out.push(escaped);
        }
        Some(b) if b == quote => {
          return Ok(String::from_utf8_lossy(&out).into_owned());
        }
        Some(b) => out.push(b),
        None => return Err(Unextractable),
      }
    }
  }

  fn parse_number(&mut self) -> Result<Expr, Unextractable> {
    let start = self.pos;
    if matches!(self.peek(), Some(b'-') | Some(b'+')) {
      let _ = self.bump();
    }
    while let Some(b) = self.peek() {
      if b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E') {
        self.pos += 1;
      } else if matches!(b, b'-' | b'+')
        && matches!(self.bytes.get(self.pos - 1), Some(b'e') | Some(b'E'))
      {
        self.pos += 1;
      } else {
        break;
      }
    }
    let text = std::str::from_utf8(&self.bytes[start..self.pos]).map_err(|_| Unextractable)?;
    text.parse::<f64>().map(Expr::Num).map_err(|_| Unextractable)
  }
}
