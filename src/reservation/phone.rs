use super::error::ReservationError;

/// Network prefixes accepted for mobile-money payments.
pub const MOBILE_MONEY_PREFIXES: [&str; 2] = ["077", "078"];
const NUMBER_LENGTH: usize = 10;

/// Validates a mobile-money number and returns it without the leading zero.
///
/// Separators and other non-digits are ignored: `"077 123 4567"` becomes `"771234567"`.
pub fn normalize_mobile_number(raw: &str) -> Result<String, ReservationError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != NUMBER_LENGTH {
        return Err(ReservationError::ValidationError(
            "Please enter a valid 10-digit phone number".to_string(),
        ));
    }
    if !MOBILE_MONEY_PREFIXES.iter().any(|prefix| digits.starts_with(prefix)) {
        return Err(ReservationError::ValidationError(format!(
            "Phone number must start with {}",
            MOBILE_MONEY_PREFIXES.join(" or ")
        )));
    }
    Ok(digits[1..].to_string())
}
