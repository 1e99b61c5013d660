//! Project and application name validation.
//!
//! Names end up in stack names and DNS labels, so both kinds follow the
//! same lowercase-hyphen rule.
//!
//! Valid: `acme`, `api`, `front-end2`
//! Invalid: `Acme`, `-api`, `api-`, `api--v2`, `2api`, `api_v2`

use thiserror::Error;

/// Longest name accepted (one DNS label).
pub const MAX_NAME_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Not yet provided. Callers that run before prompting treat this as
    /// "ask later" rather than a failure.
    #[error("value must not be empty")]
    Empty,
    #[error("value must be at most {max} characters")]
    TooLong { max: usize },
    #[error(
        "value must start with a lowercase letter and contain only lowercase letters, \
         digits and single hyphens"
    )]
    BadFormat,
    /// Environment names join the project name with a hyphen to form the
    /// stack name, so they cannot contain one themselves.
    #[error("environment name must not contain hyphens")]
    Hyphenated,
}

fn is_well_formed(value: &str) -> bool {
    let mut chars = value.chars();

    // Must start with lowercase letter
    if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
        return false;
    }

    let mut prev_hyphen = false;
    for c in chars {
        if c == '-' {
            if prev_hyphen {
                return false;
            }
            prev_hyphen = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            prev_hyphen = false;
        } else {
            return false;
        }
    }

    // Can't end with hyphen
    !prev_hyphen
}

fn validate_name(value: &str) -> Result<(), NameError> {
    if value.is_empty() {
        return Err(NameError::Empty);
    }
    if value.len() > MAX_NAME_LEN {
        return Err(NameError::TooLong { max: MAX_NAME_LEN });
    }
    if !is_well_formed(value) {
        return Err(NameError::BadFormat);
    }
    Ok(())
}

/// Validate a project name.
pub fn validate_project_name(value: &str) -> Result<(), NameError> {
    validate_name(value)
}

/// Validate an application name.
pub fn validate_application_name(value: &str) -> Result<(), NameError> {
    validate_name(value)
}

/// Validate an environment name.
///
/// Same rule as project names, without hyphens: `acme-b` + `c` and
/// `acme` + `b-c` would otherwise share the stack `acme-b-c`.
pub fn validate_environment_name(value: &str) -> Result<(), NameError> {
    validate_name(value)?;
    if value.contains('-') {
        return Err(NameError::Hyphenated);
    }
    Ok(())
}
