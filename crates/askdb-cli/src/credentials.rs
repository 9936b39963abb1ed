//! API key resolution
//!
//! The key is looked up in order: the `OPENAI_API_KEY` environment
//! variable, the config file, and finally an interactive masked prompt
//! when stdin is a terminal. The resolved key is passed explicitly to
//! the client rather than published back into the environment.

use std::io::IsTerminal;

use crate::config::Config;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Resolve the OpenAI API key, prompting interactively as a last resort.
///
/// Returns `None` when no key can be obtained, in which case the caller
/// halts before any session setup.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV).ok();
    resolve_from_sources(env_key.as_deref(), config, std::io::stdin().is_terminal())
}

/// The resolution order, separated from process state: environment
/// value first, then config, then the prompt (only when interactive).
fn resolve_from_sources(
    env_key: Option<&str>,
    config: &Config,
    interactive: bool,
) -> Option<String> {
    if let Some(key) = env_key.and_then(normalize) {
        tracing::debug!("using API key from environment");
        return Some(key);
    }

    if let Some(key) = config.api_keys.openai.as_deref().and_then(normalize) {
        tracing::debug!("using API key from config file");
        return Some(key);
    }

    if interactive {
        return prompt_for_key();
    }

    None
}

fn prompt_for_key() -> Option<String> {
    let entered = dialoguer::Password::new()
        .with_prompt("Enter your OpenAI API key")
        .allow_empty_password(true)
        .interact()
        .ok()?;
    normalize(&entered)
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: &str) -> Config {
        let mut cfg = Config::default();
        cfg.api_keys.openai = Some(key.to_string());
        cfg
    }

    #[test]
    fn test_absent_credential_resolves_to_none() {
        // No env value, empty config, non-interactive stdin: nothing to
        // resolve, so the caller halts without building a session.
        let cfg = Config::default();
        assert!(resolve_from_sources(None, &cfg, false).is_none());
        assert!(resolve_from_sources(Some("   "), &cfg, false).is_none());
    }

    #[test]
    fn test_env_takes_precedence_over_config() {
        let cfg = config_with_key("sk-config");
        assert_eq!(
            resolve_from_sources(Some("sk-env"), &cfg, false).as_deref(),
            Some("sk-env")
        );
    }

    #[test]
    fn test_config_used_when_env_absent() {
        let cfg = config_with_key("sk-config");
        assert_eq!(
            resolve_from_sources(None, &cfg, false).as_deref(),
            Some("sk-config")
        );
    }

    #[test]
    fn test_blank_config_key_is_ignored() {
        let cfg = config_with_key("   ");
        assert!(resolve_from_sources(None, &cfg, false).is_none());
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  sk-abc  ").as_deref(), Some("sk-abc"));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize("").is_none());
        assert!(normalize("   ").is_none());
    }
}
