use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.shutdown_grace_secs == 0 {
        errors.push("general.shutdown_grace_secs must be > 0".to_string());
    }

    if cfg.database.path.trim().is_empty() {
        errors.push("database.path must not be empty".to_string());
    }

    if !cfg.cors.allows_any() && cfg.cors.origins().is_empty() {
        errors.push("cors.allowed_origin must be '*' or a list of origins".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::config::AppConfig;

    #[test]
    fn collects_every_problem() {
        let mut cfg = AppConfig::default();
        cfg.general.host = " ".to_string();
        cfg.database.path = String::new();

        let err = validate(&cfg).expect_err("invalid config").to_string();

        assert!(err.contains("general.host"));
        assert!(err.contains("database.path"));
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(&AppConfig::default()).is_ok());
    }
}
