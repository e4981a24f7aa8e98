use chrono::Duration;
use serde::Deserialize;

use crate::services::ConsentError;

/// Core configuration, loaded from `CONSENT_*` environment variables with
/// defaults matching the reference behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsentConfig {
    /// Fixed consent validity window; `expires_at = created_at + window`.
    pub consent_validity_hours: i64,
    /// Upper bound on credential-cache staleness. A just-deactivated
    /// partner can authenticate against a stale cache entry for at most
    /// this long, and only if deactivation bypassed the caching store.
    pub credential_cache_ttl_seconds: i64,
    pub log_level: String,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            consent_validity_hours: 24,
            credential_cache_ttl_seconds: 30,
            log_level: "info".to_string(),
        }
    }
}

impl ConsentConfig {
    /// Load from the environment (`CONSENT_CONSENT_VALIDITY_HOURS`, ...),
    /// falling back to defaults. A `.env` file is honored when present.
    pub fn load() -> Result<Self, ConsentError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("consent_validity_hours", 24)?
            .set_default("credential_cache_ttl_seconds", 30)?
            .set_default("log_level", "info")?
            .add_source(config::Environment::with_prefix("CONSENT"))
            .build()?;

        let config: ConsentConfig = settings.try_deserialize()?;
        if config.consent_validity_hours <= 0 {
            return Err(ConsentError::Validation(
                "consent_validity_hours must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn validity_window(&self) -> Duration {
        Duration::hours(self.consent_validity_hours)
    }

    pub fn credential_cache_ttl(&self) -> Duration {
        Duration::seconds(self.credential_cache_ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_24_hours() {
        let config = ConsentConfig::default();
        assert_eq!(config.validity_window(), Duration::hours(24));
    }
}
