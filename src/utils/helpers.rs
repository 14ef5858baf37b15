use rand::Rng;

/// Lowest and highest code that can be issued (both inclusive).
pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// OTP expiration time in minutes
pub const OTP_EXPIRATION_MINUTES: i64 = 5;

/// Generate a 6-digit OTP code
pub fn generate_otp_code() -> u32 {
    let mut rng = rand::rng();
    rng.random_range(OTP_MIN..=OTP_MAX)
}

/// Service name echoed in every response envelope
pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}
