use serde::{Deserialize, Deserializer};

use crate::DomainError;

/// Maximum number of bytes of a response body that end up in the logs.
const LOG_BODY_LIMIT: usize = 256;

/// Checks that the given zone name parses and has a registrable root.
///
/// A trailing dot is accepted.
pub(crate) fn validate_zone_name(name: &str) -> Result<(), DomainError> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    let parsed = addr::parse_domain_name(trimmed)
        .map_err(|e| DomainError::Invalid(name.to_string(), e.to_string()))?;
    parsed
        .root()
        .ok_or_else(|| DomainError::MissingRoot(name.to_string()))?;

    Ok(())
}

/// Deserializes a value, turning an explicit `null` into its default.
pub(crate) fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Shortens a response body for logging.
pub(crate) fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_BODY_LIMIT {
        return s.to_string();
    }
    let mut end = LOG_BODY_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, total {} bytes]", &s[..end], s.len())
}
