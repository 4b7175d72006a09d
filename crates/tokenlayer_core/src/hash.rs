use xxhash_rust::xxh3::xxh3_64;
use xxhash_rust::xxh3::Xxh3;

/// Hasher used for generated identifiers (class names, variant toggles).
///
/// The hashes don't need to be fast, but they must be stable across runs,
/// machines, platforms and versions because they end up written into
/// stylesheets and inline styles that may be produced by separate builds.
pub type IdentifierHasher = Xxh3;

pub fn hash_string(s: &str) -> String {
  hash_bytes(s.as_bytes())
}

pub fn hash_bytes(s: &[u8]) -> String {
  let res = xxh3_64(s);
  format!("{:016x}", res)
}

/// Truncated hash for identifiers that appear many times in output text.
pub fn short_hash(s: &str) -> String {
  let res = xxh3_64(s.as_bytes());
  format!("{:08x}", res as u32)
}
