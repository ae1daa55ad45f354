use crate::schema::FlockConfig;

/// Validate required settings, failing fast at startup.
///
/// Collects every problem before reporting so a misconfigured deployment
/// is fixed in one pass.
pub fn validate(config: &FlockConfig) -> anyhow::Result<()> {
    let mut problems = Vec::new();

    if config.sessions.command_prefix.is_empty() {
        problems.push("sessions.command_prefix must not be empty".to_string());
    }
    if config.sessions.max_reconnect_attempts == 0 {
        problems.push("sessions.max_reconnect_attempts must be at least 1".to_string());
    }
    if config.sessions.reconnect_base_ms == 0 {
        problems.push("sessions.reconnect_base_ms must be at least 1".to_string());
    }
    if config.sessions.reconnect_cap_ms < config.sessions.reconnect_base_ms {
        problems.push(format!(
            "sessions.reconnect_cap_ms ({}) must not be below reconnect_base_ms ({})",
            config.sessions.reconnect_cap_ms, config.sessions.reconnect_base_ms
        ));
    }
    if config.store.database_url.is_empty() {
        problems.push("store.database_url must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("invalid configuration:\n  {}", problems.join("\n  "))
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        validate(&FlockConfig::default()).unwrap();
    }

    #[test]
    fn empty_prefix_rejected() {
        let mut cfg = FlockConfig::default();
        cfg.sessions.command_prefix.clear();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn cap_below_base_rejected() {
        let mut cfg = FlockConfig::default();
        cfg.sessions.reconnect_base_ms = 10_000;
        cfg.sessions.reconnect_cap_ms = 1_000;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn all_problems_reported_at_once() {
        let mut cfg = FlockConfig::default();
        cfg.sessions.command_prefix.clear();
        cfg.store.database_url.clear();
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("command_prefix"));
        assert!(err.contains("database_url"));
    }
}
