//! Configuration for the response cache

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single route-prefix TTL rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicyRule {
    /// Path prefix this rule applies to
    pub prefix: String,

    /// TTL for matching routes; zero means "never cache"
    pub ttl: Duration,
}

/// Configuration for the response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied when no policy rule matches the path
    pub default_ttl: Duration,

    /// Maximum number of entries before LRU eviction kicks in
    pub max_entries: usize,

    /// Route policy table, kept sorted by descending prefix length so
    /// the most specific rule wins
    pub rules: Vec<CachePolicyRule>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            // 5 minute default TTL
            default_ttl: Duration::from_secs(300),
            max_entries: 100,
            rules: Vec::new(),
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Resolve the TTL for a request path
    ///
    /// The most specific (longest) matching prefix wins; the default TTL
    /// applies when nothing matches.
    pub fn resolve_ttl(&self, path: &str) -> Duration {
        self.rules
            .iter()
            .find(|rule| path.starts_with(&rule.prefix))
            .map(|rule| rule.ttl)
            .unwrap_or(self.default_ttl)
    }

    fn sort_rules(&mut self) {
        // Longest prefix first; equal lengths keep insertion order.
        self.rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    default_ttl: Option<Duration>,
    max_entries: Option<usize>,
    rules: Vec<CachePolicyRule>,
}

impl CacheConfigBuilder {
    /// Set the fallback TTL for unmatched routes
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set the maximum number of cache entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Add a route-prefix TTL rule
    pub fn rule(mut self, prefix: impl Into<String>, ttl: Duration) -> Self {
        self.rules.push(CachePolicyRule {
            prefix: prefix.into(),
            ttl,
        });
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        let mut config = CacheConfig {
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            rules: self.rules,
        };
        config.sort_rules();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.max_entries, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = CacheConfig::default();
        config.max_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_ttl_longest_prefix_wins() {
        let config = CacheConfig::builder()
            .default_ttl(Duration::from_secs(300))
            .rule("/mobile/exercise", Duration::from_secs(120))
            .rule("/mobile/exercise/templates", Duration::from_secs(3600))
            .build();

        assert_eq!(
            config.resolve_ttl("/mobile/exercise/templates"),
            Duration::from_secs(3600)
        );
        assert_eq!(
            config.resolve_ttl("/mobile/exercise/stats"),
            Duration::from_secs(120)
        );
        assert_eq!(
            config.resolve_ttl("/mobile/social/feed"),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn test_zero_ttl_rule() {
        let config = CacheConfig::builder()
            .rule("/mobile/auth", Duration::ZERO)
            .build();

        assert_eq!(config.resolve_ttl("/mobile/auth/login"), Duration::ZERO);
    }
}
