//! Model cache configuration

use std::time::Duration;

use crate::config::CacheConfig;
use crate::domain::DomainError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Runtime settings for [`super::ModelCache`]
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCacheConfig {
    /// Hard ceiling on entry age, counted from load time
    pub ttl: Duration,
    /// Entry-count budget
    pub max_entries: usize,
    /// Optional memory budget in megabytes
    pub max_memory_mb: Option<u64>,
    /// Smoke-test a handle on every hit
    pub verify_on_hit: bool,
}

impl Default for ModelCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_entries: 10,
            max_memory_mb: None,
            verify_on_hit: true,
        }
    }
}

impl ModelCacheConfig {
    /// Sets the TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the entry-count budget
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Sets the memory budget
    pub fn with_max_memory_mb(mut self, mb: u64) -> Self {
        self.max_memory_mb = Some(mb);
        self
    }

    /// Enables or disables verification on every hit
    pub fn with_verify_on_hit(mut self, verify: bool) -> Self {
        self.verify_on_hit = verify;
        self
    }

    /// Memory budget in bytes, if one is set
    pub fn max_memory_bytes(&self) -> Option<u64> {
        self.max_memory_mb.map(|mb| mb.saturating_mul(BYTES_PER_MB))
    }

    /// Rejects settings that can never hold a model
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.ttl.is_zero() {
            return Err(DomainError::configuration("Cache TTL must be positive"));
        }

        if self.max_entries == 0 {
            return Err(DomainError::configuration(
                "Cache max_entries must be at least 1",
            ));
        }

        if self.max_memory_mb == Some(0) {
            return Err(DomainError::configuration(
                "Cache max_memory_mb must be positive when set",
            ));
        }

        Ok(())
    }
}

impl TryFrom<&CacheConfig> for ModelCacheConfig {
    type Error = DomainError;

    fn try_from(config: &CacheConfig) -> Result<Self, Self::Error> {
        let cache_config = Self {
            ttl: Duration::from_secs(config.ttl_secs),
            max_entries: config.max_entries,
            max_memory_mb: config.max_memory_mb,
            verify_on_hit: config.verify_on_hit,
        };

        cache_config.validate()?;
        Ok(cache_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ModelCacheConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert!(config.max_memory_bytes().is_none());
    }

    #[test]
    fn test_builders() {
        let config = ModelCacheConfig::default()
            .with_ttl(Duration::from_secs(30))
            .with_max_entries(3)
            .with_max_memory_mb(2)
            .with_verify_on_hit(false);

        assert_eq!(config.max_entries, 3);
        assert_eq!(config.max_memory_bytes(), Some(2 * 1024 * 1024));
        assert!(!config.verify_on_hit);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let zero_ttl = ModelCacheConfig::default().with_ttl(Duration::ZERO);
        assert!(matches!(
            zero_ttl.validate(),
            Err(DomainError::Configuration { .. })
        ));

        let zero_entries = ModelCacheConfig::default().with_max_entries(0);
        assert!(zero_entries.validate().is_err());

        let zero_memory = ModelCacheConfig::default().with_max_memory_mb(0);
        assert!(zero_memory.validate().is_err());
    }

    #[test]
    fn test_from_app_config() {
        let app = CacheConfig {
            ttl_secs: 120,
            max_entries: 4,
            max_memory_mb: Some(256),
            verify_on_hit: false,
            maintenance_interval_secs: 0,
        };

        let config = ModelCacheConfig::try_from(&app).unwrap();

        assert_eq!(config.ttl, Duration::from_secs(120));
        assert_eq!(config.max_entries, 4);
        assert_eq!(config.max_memory_mb, Some(256));

        let invalid = CacheConfig {
            ttl_secs: 0,
            ..app
        };
        assert!(ModelCacheConfig::try_from(&invalid).is_err());
    }
}
