use crate::error::ConfigError;
use std::str::FromStr;

/// Runtime configuration for one agent instance, read from the
/// environment with defaults matching the platform's expectations.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub agent_id: String,
    pub agent_name: String,
    pub database_url: String,
    pub platform_base_url: String,
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    /// Jittered cadence for the "generate new post" activity, in minutes.
    pub post_interval_min: u64,
    pub post_interval_max: u64,
    /// Jittered cadence for the timeline sweep activity, in minutes.
    pub timeline_interval_min: u64,
    pub timeline_interval_max: u64,
    pub timeline_fetch_limit: usize,
    pub max_thread_depth: usize,
    pub max_post_chars: usize,
    /// Jittered pause between consecutive platform writes, in milliseconds.
    pub write_gap_min_ms: u64,
    pub write_gap_max_ms: u64,
    pub write_timeout_secs: u64,
    pub post_immediately: bool,
    pub dry_run: bool,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            agent_id: required_var("MURMUR_AGENT_ID")?,
            agent_name: optional_var("MURMUR_AGENT_NAME")
                .unwrap_or_else(|| "murmur".to_string()),
            database_url: optional_var("MURMUR_DATABASE_URL")
                .unwrap_or_else(|| "sqlite://murmur.db?mode=rwc".to_string()),
            platform_base_url: required_var("MURMUR_PLATFORM_URL")?,
            llm_base_url: optional_var("MURMUR_LLM_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            llm_api_key: optional_var("MURMUR_LLM_API_KEY"),
            llm_model: optional_var("MURMUR_LLM_MODEL")
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            post_interval_min: parsed_var("MURMUR_POST_INTERVAL_MIN", 90)?,
            post_interval_max: parsed_var("MURMUR_POST_INTERVAL_MAX", 180)?,
            timeline_interval_min: parsed_var("MURMUR_TIMELINE_INTERVAL_MIN", 5)?,
            timeline_interval_max: parsed_var("MURMUR_TIMELINE_INTERVAL_MAX", 30)?,
            timeline_fetch_limit: parsed_var("MURMUR_TIMELINE_FETCH_LIMIT", 15)?,
            max_thread_depth: parsed_var("MURMUR_MAX_THREAD_DEPTH", 10)?,
            max_post_chars: parsed_var("MURMUR_MAX_POST_CHARS", 280)?,
            write_gap_min_ms: parsed_var("MURMUR_WRITE_GAP_MIN_MS", 1000)?,
            write_gap_max_ms: parsed_var("MURMUR_WRITE_GAP_MAX_MS", 3000)?,
            write_timeout_secs: parsed_var("MURMUR_WRITE_TIMEOUT_SECS", 30)?,
            post_immediately: parsed_var("MURMUR_POST_IMMEDIATELY", false)?,
            dry_run: parsed_var("MURMUR_DRY_RUN", false)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.post_interval_min > self.post_interval_max {
            return Err(ConfigError::ValidationFailed {
                reason: "post interval min exceeds max".to_string(),
            });
        }
        if self.timeline_interval_min > self.timeline_interval_max {
            return Err(ConfigError::ValidationFailed {
                reason: "timeline interval min exceeds max".to_string(),
            });
        }
        if self.write_gap_min_ms > self.write_gap_max_ms {
            return Err(ConfigError::ValidationFailed {
                reason: "write gap min exceeds max".to_string(),
            });
        }
        if self.max_post_chars == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "max post length must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    optional_var(name).ok_or_else(|| ConfigError::MissingEnvironmentVariable {
        var_name: name.to_string(),
    })
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            field: name.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}
