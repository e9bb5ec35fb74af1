//! Environment variable parsing with warn-level logging for invalid values.

use std::time::Duration;

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Whole-second duration from the environment. Zero is treated as invalid.
pub fn env_duration_secs(var: &str, default_secs: u64) -> Duration {
    let secs = env_parse_with_default(var, default_secs);
    if secs == 0 {
        tracing::warn!(var, default = default_secs, "zero timeout rejected, using default");
        return Duration::from_secs(default_secs);
    }
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(var: &str, value: &str) {
        // SAFETY: every test uses a unique variable name.
        unsafe { std::env::set_var(var, value) };
    }

    fn unset(var: &str) {
        // SAFETY: every test uses a unique variable name.
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "DOCQA_TEST_ENV_PARSE_VALID_41827";
        set(var_name, "1500");
        let result: usize = env_parse_with_default(var_name, 1000);
        assert_eq!(result, 1500);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_trims_whitespace() {
        let var_name = "DOCQA_TEST_ENV_PARSE_TRIM_41828";
        set(var_name, " 7 ");
        let result: u32 = env_parse_with_default(var_name, 3);
        assert_eq!(result, 7);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "DOCQA_TEST_ENV_PARSE_INVALID_41829";
        set(var_name, "lots");
        let result: usize = env_parse_with_default(var_name, 4);
        assert_eq!(result, 4);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_missing_var() {
        let var_name = "DOCQA_TEST_ENV_PARSE_MISSING_41830";
        unset(var_name);
        let result: f32 = env_parse_with_default(var_name, 0.3);
        assert!((result - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_env_duration_rejects_zero() {
        let var_name = "DOCQA_TEST_ENV_DURATION_ZERO_41831";
        set(var_name, "0");
        assert_eq!(env_duration_secs(var_name, 90), Duration::from_secs(90));
        unset(var_name);
    }

    #[test]
    fn test_env_duration_valid() {
        let var_name = "DOCQA_TEST_ENV_DURATION_VALID_41832";
        set(var_name, "15");
        assert_eq!(env_duration_secs(var_name, 90), Duration::from_secs(15));
        unset(var_name);
    }
}
