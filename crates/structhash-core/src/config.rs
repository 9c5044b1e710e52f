//! Digest configuration that callers can serialize/deserialize.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How map entries are ordered before they reach the sink.
///
/// Changing this changes digests of every value containing a map, so it is
/// chosen once per traversal and never mixed within one digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapOrder {
    /// v1: pairs sorted by encoded key bytes, then encoded value bytes.
    /// Map digests are independent of insertion and iteration order.
    /// Only `Value::Map` is reordered: sequences keep their order, so a
    /// hash-ordered set that reaches the traversal as a `List` still
    /// digests in its iteration order. Use an ordered set (`BTreeSet`)
    /// for stable digests.
    #[default]
    Sorted,
    /// v0: pairs fed in the map's native iteration order. Byte-compatible
    /// with the reflection-based reference, and non-deterministic for
    /// hash-ordered maps.
    Iteration,
}

impl MapOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            MapOrder::Sorted => "sorted",
            MapOrder::Iteration => "iteration",
        }
    }
}

impl fmt::Display for MapOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted" | "v1" => Ok(MapOrder::Sorted),
            "iteration" | "v0" => Ok(MapOrder::Iteration),
            other => Err(Error::Config(format!(
                "unknown map order '{other}' (expected 'sorted' or 'iteration')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub map_order: MapOrder,

    /// Fail instead of silently skipping unsupported values and
    /// depth-truncated subtrees.
    pub strict: bool,

    /// Maximum nesting depth; the root value sits at depth 0.
    /// `None` means unbounded.
    pub max_depth: Option<usize>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            map_order: MapOrder::Sorted,
            strict: false,
            max_depth: None,
        }
    }
}

impl DigestConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `STRUCTHASH_MAP_ORDER`: `sorted` or `iteration`
    /// - `STRUCTHASH_STRICT`: `1`, `true` or `yes` to enable strict mode
    /// - `STRUCTHASH_MAX_DEPTH`: maximum nesting depth
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("STRUCTHASH_MAP_ORDER") {
            if let Ok(v) = s.parse::<MapOrder>() {
                cfg.map_order = v;
            }
        }

        if let Ok(s) = std::env::var("STRUCTHASH_STRICT") {
            cfg.strict = matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        if let Ok(s) = std::env::var("STRUCTHASH_MAX_DEPTH") {
            if let Ok(v) = s.trim().parse::<usize>() {
                cfg.max_depth = Some(v);
            }
        }

        cfg
    }

    pub fn with_map_order(mut self, map_order: MapOrder) -> Self {
        self.map_order = map_order;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_order_parses_names_and_versions() {
        assert_eq!("sorted".parse::<MapOrder>().unwrap(), MapOrder::Sorted);
        assert_eq!(" Iteration ".parse::<MapOrder>().unwrap(), MapOrder::Iteration);
        assert_eq!("v0".parse::<MapOrder>().unwrap(), MapOrder::Iteration);
        assert!(matches!(
            "random".parse::<MapOrder>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: DigestConfig = serde_json::from_str(r#"{"map_order":"iteration"}"#).unwrap();
        assert_eq!(cfg.map_order, MapOrder::Iteration);
        assert!(!cfg.strict);
        assert_eq!(cfg.max_depth, None);
    }

    #[test]
    fn builder_methods_override_fields() {
        let cfg = DigestConfig::default()
            .with_map_order(MapOrder::Iteration)
            .strict(true)
            .with_max_depth(8);
        assert_eq!(cfg.map_order, MapOrder::Iteration);
        assert!(cfg.strict);
        assert_eq!(cfg.max_depth, Some(8));
    }
}
