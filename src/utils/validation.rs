use regex::Regex;

pub fn is_valid_email(email: &str) -> bool {
    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    re.is_match(email)
}

/// Collect every violation for a registration input. Independent checks
/// accumulate so the client sees all of them in one response.
pub fn validate_user_input(email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push("Email is invalid".to_string());
    }
    if password.is_empty() || password.chars().count() < 5 {
        errors.push("Password must be at least 5 characters".to_string());
    }
    errors
}

/// Collect every violation for a post input, used on create and update alike.
pub fn validate_post_input(title: &str, content: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if title.is_empty() || title.chars().count() < 6 {
        errors.push("Title must be at least 6 characters in length".to_string());
    }
    if content.is_empty() || content.chars().count() < 6 {
        errors.push("Content must be at least 6 characters in length".to_string());
    }
    errors
}
