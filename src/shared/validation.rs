use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating username fields
    /// Letters, digits and the characters @ . + - _ only
    /// - Valid: "john_doe", "user123", "alice@home", "first.last", "a+b-c"
    /// - Invalid: "user name", "user/name", "", "us#er"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();

    /// Regex for validating phone numbers (optional leading +, digits, spaces, dashes)
    /// Blank is allowed; the phone number is optional
    /// - Valid: "+255123456789", "0712 345 678", "0712-345-678", ""
    /// - Invalid: "phone", "12ab34", "++255"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^(?:\+?[0-9][0-9 \-]*)?$").unwrap();
}

/// Trim an optional text field; blank becomes `None`
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
