use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpEntry {
    pub code: u32,
    pub expires_at: DateTime<Utc>,
}

/// Result of checking a submitted code against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Success,
    NotFound,
    Expired,
    Mismatch,
}

#[derive(Deserialize)]
pub struct RequestOtpRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    /// Any JSON value; only a leading integer can ever match.
    #[serde(default)]
    pub otp: Option<Value>,
}

impl VerifyOtpRequest {
    pub fn otp_code(&self) -> Option<u32> {
        match self.otp.as_ref()? {
            Value::Number(n) => match n.as_u64() {
                Some(n) => u32::try_from(n).ok(),
                None => n.as_f64().and_then(truncate_to_code),
            },
            Value::String(s) => leading_integer(s),
            _ => None,
        }
    }
}

fn truncate_to_code(f: f64) -> Option<u32> {
    if f.is_finite() && f >= 0.0 && f < u32::MAX as f64 + 1.0 {
        Some(f.trunc() as u32)
    } else {
        None
    }
}

/// Reads the integer prefix of `s` after leading whitespace and an
/// optional `+`, so `"470257abc"` gives `470257`.
fn leading_integer(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}
