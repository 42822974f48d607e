use std::env;

use crate::domain::FinePolicy;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    pub fine_policy: FinePolicy,
    /// Symbol prefixed to human-readable fines
    pub currency: String,
}

impl Config {
    /// Read the process environment. A profile passed on the command line
    /// wins over `PROFILE`.
    pub fn from_env(profile: Option<String>) -> Self {
        Self::from_lookup(|key| match key {
            "PROFILE" if profile.is_some() => profile.clone(),
            _ => env::var(key).ok(),
        })
    }

    /// Build the configuration from an arbitrary key lookup. `from_env`
    /// passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = lookup("PROFILE").unwrap_or_else(|| "default".to_string());

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| {
            if profile == "default" {
                "sqlite://school_library.db?mode=rwc".to_string()
            } else {
                format!("sqlite://school_library_{}.db?mode=rwc", profile)
            }
        });

        let defaults = FinePolicy::default();
        let grace_period_days = lookup("LIBRARY_GRACE_PERIOD_DAYS")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|days| *days >= 0)
            .unwrap_or(defaults.grace_period_days);
        let fine_per_day = lookup("LIBRARY_FINE_PER_DAY")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|rate| rate.is_finite() && *rate >= 0.0)
            .unwrap_or(defaults.fine_per_day);

        Self {
            database_url,
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            profile,
            fine_policy: FinePolicy {
                grace_period_days,
                fine_per_day,
            },
            currency: lookup("LIBRARY_CURRENCY").unwrap_or_else(|| "$".to_string()),
        }
    }
}
