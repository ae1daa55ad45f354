use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub sessions: SessionSettings,
    pub store: StoreSettings,
}

/// Settings for the session engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Prefix inbound text must start with to be treated as a command.
    pub command_prefix: String,

    /// Owner identity for privileged builtins. A bare phone number or a
    /// full chat address; comparison uses the bare user part.
    pub owner: String,

    /// Maximum reconnect attempts before a session is stopped.
    pub max_reconnect_attempts: u32,

    /// Base reconnect delay in ms; the delay grows linearly with the
    /// attempt count.
    pub reconnect_base_ms: u64,

    /// Upper bound on the reconnect delay in ms.
    pub reconnect_cap_ms: u64,

    /// Dial timeout in ms.
    pub connect_timeout_ms: u64,

    /// Outbound request timeout in ms.
    pub request_timeout_ms: u64,

    /// Keep-alive interval in ms.
    pub keepalive_interval_ms: u64,

    /// React to inbound messages from others with a random emoji.
    pub auto_react: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            command_prefix: ".".into(),
            owner: String::new(),
            max_reconnect_attempts: 5,
            reconnect_base_ms: 2_000,
            reconnect_cap_ms: 30_000,
            connect_timeout_ms: 20_000,
            request_timeout_ms: 60_000,
            keepalive_interval_ms: 30_000,
            auto_react: false,
        }
    }
}

/// Settings for the credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite database URL.
    pub database_url: String,

    /// Maximum automatic store reconnect attempts before an external
    /// retrigger is required.
    pub max_connect_attempts: u32,

    /// Base delay between store reconnect attempts in ms; grows with each
    /// failed attempt.
    pub retry_base_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://flock.db?mode=rwc".into(),
            max_connect_attempts: 5,
            retry_base_ms: 5_000,
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = FlockConfig::default();
        assert_eq!(cfg.sessions.command_prefix, ".");
        assert_eq!(cfg.sessions.max_reconnect_attempts, 5);
        assert_eq!(cfg.sessions.reconnect_base_ms, 2_000);
        assert_eq!(cfg.sessions.reconnect_cap_ms, 30_000);
        assert!(!cfg.sessions.auto_react);
        assert_eq!(cfg.store.max_connect_attempts, 5);
    }

    #[test]
    fn deserialize_partial_toml_fills_defaults() {
        let cfg: FlockConfig = toml::from_str(
            r#"
            [sessions]
            command_prefix = "!"
            owner = "15551234567"
            auto_react = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.sessions.command_prefix, "!");
        assert_eq!(cfg.sessions.owner, "15551234567");
        assert!(cfg.sessions.auto_react);
        // defaults for unspecified fields
        assert_eq!(cfg.sessions.max_reconnect_attempts, 5);
        assert_eq!(cfg.store.database_url, "sqlite://flock.db?mode=rwc");
    }

    #[test]
    fn serialize_roundtrip() {
        let mut cfg = FlockConfig::default();
        cfg.sessions.owner = "15559990000".into();
        let toml_str = toml::to_string(&cfg).unwrap();
        let cfg2: FlockConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(cfg, cfg2);
    }
}
