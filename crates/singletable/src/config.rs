use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the single table (default: "singletable")
    pub table_name: String,
    /// Endpoint override for a local DynamoDB.
    /// Note: Only used when the `dynamodb` feature is enabled.
    #[allow(dead_code)]
    pub dynamodb_endpoint_url: Option<String>,
    /// Downstream job processor. Jobs are queued in memory when unset.
    pub job_queue_url: Option<String>,
    /// Timeout for job queue calls in seconds (default: 10)
    pub job_queue_timeout_seconds: u64,
    /// Per-request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNAMODB_TABLE_NAME` - Table name (default: "singletable")
    /// - `DYNAMODB_ENDPOINT_URL` - Optional endpoint override
    /// - `JOB_QUEUE_URL` - Optional job processor URL
    /// - `JOB_QUEUE_TIMEOUT_SECONDS` - Job queue timeout (default: 10)
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout (default: 30)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            table_name: non_empty("DYNAMODB_TABLE_NAME")
                .unwrap_or_else(|| "singletable".to_string()),
            dynamodb_endpoint_url: non_empty("DYNAMODB_ENDPOINT_URL"),
            job_queue_url: non_empty("JOB_QUEUE_URL"),
            job_queue_timeout_seconds: lookup("JOB_QUEUE_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            request_timeout_seconds: lookup("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn job_queue_timeout(&self) -> Duration {
        Duration::from_secs(self.job_queue_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.table_name, "singletable");
        assert_eq!(config.dynamodb_endpoint_url, None);
        assert_eq!(config.job_queue_url, None);
        assert_eq!(config.job_queue_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_values_from_lookup() {
        let vars = HashMap::from([
            ("DYNAMODB_TABLE_NAME", "media"),
            ("DYNAMODB_ENDPOINT_URL", "http://localhost:8000"),
            ("JOB_QUEUE_URL", "http://batch.internal/jobs"),
            ("JOB_QUEUE_TIMEOUT_SECONDS", "3"),
            ("REQUEST_TIMEOUT_SECONDS", "5"),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.table_name, "media");
        assert_eq!(
            config.dynamodb_endpoint_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(
            config.job_queue_url.as_deref(),
            Some("http://batch.internal/jobs")
        );
        assert_eq!(config.job_queue_timeout_seconds, 3);
        assert_eq!(config.request_timeout_seconds, 5);
    }

    #[test]
    fn test_unparseable_and_blank_values_fall_back() {
        let vars = HashMap::from([
            ("DYNAMODB_TABLE_NAME", "  "),
            ("JOB_QUEUE_URL", ""),
            ("REQUEST_TIMEOUT_SECONDS", "soon"),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.table_name, "singletable");
        assert_eq!(config.job_queue_url, None);
        assert_eq!(config.request_timeout_seconds, 30);
    }
}
