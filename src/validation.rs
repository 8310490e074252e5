//! Format checks for registration numbers.

/// NIS numbers are nine alphanumeric characters once separators are
/// removed.
pub fn validate_nis_number(nis: &str) -> bool {
    nis.chars().filter(|c| c.is_ascii_alphanumeric()).count() == 9
}

/// TINs are nine digits once separators are removed.
pub fn validate_tin_number(tin: &str) -> bool {
    tin.chars().filter(|c| c.is_ascii_digit()).count() == 9
}
