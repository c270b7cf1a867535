use secrecy::SecretString;

/// Development-only signing secret used when none is configured.
pub const DEV_FALLBACK_TOKEN_SECRET: &str = "dummy-token-secret-for-development-only";

/// Process-wide configuration, built once at startup and passed to
/// constructors. Never read from ambient globals.
#[derive(Debug, Clone)]
pub struct Config {
    token_secret: SecretString,
    fallback_secret: bool,
}

impl Config {
    /// Build the configuration from an optional operator-supplied signing
    /// secret. A missing secret falls back to a development-only key; callers
    /// must surface that to the operator.
    #[must_use]
    pub fn new(token_secret: Option<String>) -> Self {
        match token_secret {
            Some(secret) if !secret.is_empty() => Self {
                token_secret: SecretString::from(secret),
                fallback_secret: false,
            },
            _ => Self {
                token_secret: SecretString::from(DEV_FALLBACK_TOKEN_SECRET.to_string()),
                fallback_secret: true,
            },
        }
    }

    #[must_use]
    pub fn token_secret(&self) -> &SecretString {
        &self.token_secret
    }

    #[must_use]
    pub fn is_fallback_secret(&self) -> bool {
        self.fallback_secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_config_with_secret() {
        let config = Config::new(Some("super-secret".to_string()));
        assert_eq!(config.token_secret().expose_secret(), "super-secret");
        assert!(!config.is_fallback_secret());
    }

    #[test]
    fn test_config_without_secret() {
        let config = Config::new(None);
        assert_eq!(
            config.token_secret().expose_secret(),
            DEV_FALLBACK_TOKEN_SECRET
        );
        assert!(config.is_fallback_secret());
    }

    #[test]
    fn test_config_with_empty_secret() {
        let config = Config::new(Some(String::new()));
        assert!(config.is_fallback_secret());
    }
}
