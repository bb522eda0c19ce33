/// Interpret an optional environment-variable value as a boolean switch, falling back to
/// `default` when the variable is absent or unrecognised. Drives the `QMP_` on/off flags such as
/// `QMP_SQUARE_HMAC_CHECKS`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
