//! API key resolution for the generation backend

use solgen_core::{Result, SolgenError};
use std::env;

/// Read the generation API key from the configured environment variable
pub fn api_key(var: &str) -> Result<String> {
    match env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(SolgenError::Auth(format!(
            "no API key found: set {} to a valid chat-completions API key",
            var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to prevent concurrent env var modifications
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_key_present() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("SOLGEN_TEST_KEY", "sk-test");
        assert_eq!(api_key("SOLGEN_TEST_KEY").unwrap(), "sk-test");
        env::remove_var("SOLGEN_TEST_KEY");
    }

    #[test]
    fn test_key_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("SOLGEN_TEST_KEY_MISSING");
        let result = api_key("SOLGEN_TEST_KEY_MISSING");
        assert!(result.is_err());
    }

    #[test]
    fn test_key_blank_is_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("SOLGEN_TEST_KEY_BLANK", "  ");
        assert!(api_key("SOLGEN_TEST_KEY_BLANK").is_err());
        env::remove_var("SOLGEN_TEST_KEY_BLANK");
    }
}
