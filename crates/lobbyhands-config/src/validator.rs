//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_lobby(config, &mut result);
        Self::validate_infinite(config, &mut result);
        Self::validate_death_frame(config, &mut result);
        Self::validate_notify(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_lobby(config: &Config, result: &mut ValidationResult) {
        let lobby = &config.lobby;
        if lobby.timeout_secs == 0 {
            result.add_error(ValidationError::new("lobby.timeout_secs", "must be greater than 0"));
        }
        if lobby.tick_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "lobby.tick_interval_ms",
                "must be greater than 0",
            ));
        }
        if lobby.death_check_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "lobby.death_check_interval_secs",
                "must be greater than 0",
            ));
        }
        if lobby.gold_check_every_ticks == 0 {
            result.add_error(ValidationError::new(
                "lobby.gold_check_every_ticks",
                "must be greater than 0",
            ));
        }
        if lobby.gold_pattern.trim().is_empty() {
            result.add_error(ValidationError::new("lobby.gold_pattern", "must not be empty"));
        }
        if lobby.status_interval_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "lobby.status_interval_secs",
                "0 logs status on every tick",
            ));
        }
        if lobby.wait_for_accept {
            if lobby.accept_timeout_secs == 0 {
                result.add_error(ValidationError::new(
                    "lobby.accept_timeout_secs",
                    "must be greater than 0",
                ));
            }
            if lobby.accept_pattern.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "lobby.accept_pattern",
                    "must not be empty",
                ));
            }
            if lobby.accept_poll_ms == 0 {
                result.add_error(ValidationError::new(
                    "lobby.accept_poll_ms",
                    "must be greater than 0",
                ));
            }
        }
        let region = &lobby.chat_region;
        if region.left + region.width > 100.0 || region.top + region.height > 100.0 {
            result.add_error(ValidationError::new(
                "lobby.chat_region",
                "region extends past the screen",
            ));
        }
    }

    fn validate_infinite(config: &Config, result: &mut ValidationResult) {
        let infinite = &config.infinite;
        if !infinite.enabled {
            return;
        }
        if infinite.attempt_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "infinite.attempt_interval_secs",
                "must be greater than 0",
            ));
        }
        if infinite.camera_key.trim().is_empty() {
            result.add_error(ValidationError::new("infinite.camera_key", "must not be empty"));
        }
        if infinite.confirm_key.trim().is_empty() {
            result.add_error(ValidationError::new("infinite.confirm_key", "must not be empty"));
        }
        if infinite.reposition_tolerance_px < 0 {
            result.add_error(ValidationError::new(
                "infinite.reposition_tolerance_px",
                "must not be negative",
            ));
        }
        let insets = &infinite.search_region;
        if insets.top + insets.bottom >= 100.0 || insets.left + insets.right >= 100.0 {
            result.add_error(ValidationError::new(
                "infinite.search_region",
                "insets leave no area to search",
            ));
        }
        if config.lobby.tick_interval_ms > infinite.attempt_interval_secs * 1000 {
            result.add_warning(ValidationWarning::new(
                "infinite.attempt_interval_secs",
                "shorter than the lobby tick; attempts run once per tick",
            ));
        }
    }

    fn validate_death_frame(config: &Config, result: &mut ValidationResult) {
        let frame = &config.death_frame;
        if frame.region.is_empty() {
            result.add_error(ValidationError::new("death_frame.region", "must not be empty"));
        }
        if frame.min_pixels == 0 {
            result.add_warning(ValidationWarning::new(
                "death_frame.min_pixels",
                "0 reports a death frame on every check",
            ));
        }
    }

    fn validate_notify(config: &Config, result: &mut ValidationResult) {
        let notify = &config.notify;
        let has_token = notify
            .telegram_bot_token
            .as_deref()
            .is_some_and(|t| !t.is_empty());
        let has_chat = notify
            .telegram_chat_id
            .as_deref()
            .is_some_and(|c| !c.is_empty());
        if has_token != has_chat {
            result.add_warning(ValidationWarning::new(
                "notify",
                "telegram needs both telegram_bot_token and telegram_chat_id; disabled",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if !crate::LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!("unknown level '{}', using info", config.logging.level),
            ));
        }
        if config.logging.max_files == 0 {
            result.add_error(ValidationError::new("logging.max_files", "must be greater than 0"));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
