use regex::Regex;

/// Accepts addresses on exactly one domain.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    pattern: Regex,
}

impl EmailValidator {
    pub fn new(domain: &str) -> Result<Self, String> {
        if domain.is_empty() {
            return Err("Allowed email domain must not be empty".to_string());
        }

        let pattern = Regex::new(&format!(r"^[a-zA-Z0-9._%+\-]+@{}$", regex::escape(domain)))
            .map_err(|e| format!("Invalid email domain pattern: {}", e))?;

        Ok(Self { pattern })
    }

    pub fn is_valid_email(&self, email: &str) -> bool {
        !email.is_empty() && self.pattern.is_match(email)
    }
}
