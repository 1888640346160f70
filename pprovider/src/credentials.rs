//! Secret handling and environment-based credential lookup.

use std::env;

use crate::LlmError;

/// An in-memory secret that never appears in `Debug` output and is zeroed on
/// drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// API key and endpoint for one provider namespace.
///
/// A namespace prefix such as `QWEN` resolves `QWEN_API_KEY` and
/// `QWEN_BASE_URL` from the environment.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub api_key: SecretString,
    pub base_url: String,
}

impl ProviderCredentials {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            base_url: base_url.into(),
        }
    }

    pub fn from_env(prefix: &str) -> Result<Self, LlmError> {
        let key_var = format!("{prefix}_API_KEY");
        let url_var = format!("{prefix}_BASE_URL");

        let api_key = env::var(&key_var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                LlmError::authentication(format!("missing API key: set {key_var}"))
            })?;

        let base_url = env::var(&url_var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                LlmError::authentication(format!("missing base URL: set {url_var}"))
            })?;

        Ok(Self::new(api_key, base_url))
    }
}
