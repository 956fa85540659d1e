//! Binary artifact kinds the cache can produce.

use std::fmt;

/// The kind of binary artifact being keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CacheOutputType {
    /// A single-platform framework.
    #[default]
    Framework,
    /// A multi-platform bundle of frameworks.
    Xcframework,
}

impl CacheOutputType {
    /// Maps the `--xcframeworks` flag onto an output type.
    pub fn from_xcframeworks(xcframeworks: bool) -> Self {
        if xcframeworks {
            Self::Xcframework
        } else {
            Self::Framework
        }
    }

    /// Stable name folded into cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Framework => "framework",
            Self::Xcframework => "xcframework",
        }
    }
}

impl fmt::Display for CacheOutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_selects_output_type() {
        assert_eq!(CacheOutputType::from_xcframeworks(true), CacheOutputType::Xcframework);
        assert_eq!(CacheOutputType::from_xcframeworks(false), CacheOutputType::Framework);
        assert_eq!(CacheOutputType::default(), CacheOutputType::Framework);
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(CacheOutputType::Framework.to_string(), "framework");
        assert_eq!(CacheOutputType::Xcframework.to_string(), "xcframework");
    }
}
