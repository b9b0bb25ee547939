//! Namespaced cache keys for geocoding data

use std::fmt;

/// Logical namespaces sharing one physical cache store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    /// Successful resolutions
    Success,
    /// Names that failed to resolve
    Failure,
    /// Raw name to normalized name synonyms
    Normalized,
}

impl CacheNamespace {
    pub const ALL: [CacheNamespace; 3] = [Self::Success, Self::Failure, Self::Normalized];

    /// Key prefix, including the trailing separator
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Success => "geocoding:",
            Self::Failure => "geocoding:failed:",
            Self::Normalized => "geocoding:normalized:",
        }
    }

    /// Full cache key for an already simply-normalized name
    pub fn key(&self, simple_name: &str) -> String {
        format!("{}{}", self.prefix(), simple_name)
    }

    /// Determines which namespace a raw cache key belongs to.
    ///
    /// The success prefix is a prefix of the other two, so the more
    /// specific namespaces are checked first.
    pub fn classify(key: &str) -> Option<Self> {
        if key.starts_with(Self::Failure.prefix()) {
            Some(Self::Failure)
        } else if key.starts_with(Self::Normalized.prefix()) {
            Some(Self::Normalized)
        } else if key.starts_with(Self::Success.prefix()) {
            Some(Self::Success)
        } else {
            None
        }
    }
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failed"),
            Self::Normalized => write!(f, "normalized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(CacheNamespace::Success.key("malmö"), "geocoding:malmö");
        assert_eq!(CacheNamespace::Failure.key("malmö"), "geocoding:failed:malmö");
        assert_eq!(
            CacheNamespace::Normalized.key("malmö"),
            "geocoding:normalized:malmö"
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            CacheNamespace::classify("geocoding:umeå"),
            Some(CacheNamespace::Success)
        );
        assert_eq!(
            CacheNamespace::classify("geocoding:failed:umeå"),
            Some(CacheNamespace::Failure)
        );
        assert_eq!(
            CacheNamespace::classify("geocoding:normalized:umeå"),
            Some(CacheNamespace::Normalized)
        );
        assert_eq!(CacheNamespace::classify("rss:feed"), None);
    }

    #[test]
    fn test_classify_roundtrips_every_namespace() {
        for namespace in CacheNamespace::ALL {
            assert_eq!(CacheNamespace::classify(&namespace.key("x")), Some(namespace));
        }
    }
}
