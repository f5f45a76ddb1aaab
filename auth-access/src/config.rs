use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Process-wide security policy. Mutable at runtime through
/// [`crate::AuthService::update_config`]; every field has a defined default
/// so an invalid or missing persisted configuration falls back cleanly
/// instead of failing startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub session_timeout_minutes: i64,
    pub max_login_attempts: u32,
    pub lockout_duration_minutes: i64,
    pub password_min_length: usize,
    pub password_require_uppercase: bool,
    pub password_require_lowercase: bool,
    pub password_require_numbers: bool,
    pub password_require_special_chars: bool,
    pub audit_log_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 30,
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_lowercase: true,
            password_require_numbers: true,
            password_require_special_chars: true,
            audit_log_enabled: true,
        }
    }
}

impl SecurityConfig {
    /// Validate field ranges. A config that fails here must never be
    /// applied; callers keep the previous configuration.
    pub fn validate(&self) -> Result<()> {
        if self.session_timeout_minutes < 1 {
            return Err(AuthError::ConfigInvalid(
                "session_timeout_minutes must be at least 1".to_string(),
            ));
        }
        if self.max_login_attempts < 1 {
            return Err(AuthError::ConfigInvalid(
                "max_login_attempts must be at least 1".to_string(),
            ));
        }
        if self.lockout_duration_minutes < 1 {
            return Err(AuthError::ConfigInvalid(
                "lockout_duration_minutes must be at least 1".to_string(),
            ));
        }
        if self.password_min_length < 4 {
            return Err(AuthError::ConfigInvalid(
                "password_min_length must be at least 4".to_string(),
            ));
        }
        Ok(())
    }

    /// Deserialize a persisted configuration, falling back to defaults when
    /// the payload is malformed or out of range.
    pub fn from_json_or_default(raw: &str) -> Self {
        match serde_json::from_str::<Self>(raw) {
            Ok(config) => {
                if let Err(err) = config.validate() {
                    warn!(%err, "persisted security config out of range, using defaults");
                    Self::default()
                } else {
                    config
                }
            }
            Err(err) => {
                warn!(%err, "persisted security config unreadable, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = SecurityConfig::default();
        assert_eq!(config.session_timeout_minutes, 30);
        assert_eq!(config.max_login_attempts, 5);
        assert_eq!(config.lockout_duration_minutes, 15);
        assert_eq!(config.password_min_length, 8);
        assert!(config.password_require_uppercase);
        assert!(config.password_require_lowercase);
        assert!(config.password_require_numbers);
        assert!(config.password_require_special_chars);
        assert!(config.audit_log_enabled);
    }

    #[test]
    fn malformed_payload_falls_back_to_defaults() {
        let config = SecurityConfig::from_json_or_default("not json at all");
        assert_eq!(config, SecurityConfig::default());
    }

    #[test]
    fn out_of_range_payload_falls_back_to_defaults() {
        let config = SecurityConfig::from_json_or_default(r#"{"max_login_attempts": 0}"#);
        assert_eq!(config, SecurityConfig::default());
    }

    #[test]
    fn partial_payload_fills_missing_fields_from_defaults() {
        let config = SecurityConfig::from_json_or_default(r#"{"session_timeout_minutes": 45}"#);
        assert_eq!(config.session_timeout_minutes, 45);
        assert_eq!(config.max_login_attempts, 5);
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let config = SecurityConfig {
            max_login_attempts: 0,
            ..SecurityConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
