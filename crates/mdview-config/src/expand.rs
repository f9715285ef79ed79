//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - a leading `~` in paths, expanded to the home directory

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Expand environment variables, then a leading `~`.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(shellexpand::tilde(&expanded).into_owned())
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDVIEW_TEST_SIMPLE", "hello");
        }
        let result = expand_env("${MDVIEW_TEST_SIMPLE}", "test.field").unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("MDVIEW_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDVIEW_TEST_UNSET");
        }
        let result = expand_env("${MDVIEW_TEST_UNSET:-serif}", "test.field").unwrap();
        assert_eq!(result, "serif");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDVIEW_TEST_MISSING");
        }
        let err = expand_env("${MDVIEW_TEST_MISSING}", "images.directory").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MDVIEW_TEST_MISSING"));
        assert!(err.to_string().contains("images.directory"));
    }

    #[test]
    fn test_expand_literal_unchanged() {
        assert_eq!(expand_env("$HOME/x", "f").unwrap(), "$HOME/x");
        assert_eq!(expand_env("plain", "f").unwrap(), "plain");
    }

    #[test]
    fn test_expand_path_tilde() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        let expanded = expand_path("~/images", "images.directory").unwrap();
        assert_eq!(expanded, format!("{}/images", home.to_string_lossy()));
    }

    #[test]
    fn test_expand_path_relative_unchanged() {
        assert_eq!(expand_path("assets/img", "f").unwrap(), "assets/img");
    }
}
