use std::env;
use std::time::Duration;

/// Server and OTP settings loaded from environment variables
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origin: String,
    pub allowed_email_domain: String,
    pub delivery_timeout: Duration,
    pub sweep_interval: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let delivery_timeout_secs: u64 = env::var("DELIVERY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| "DELIVERY_TIMEOUT_SECS must be a valid number")?;

        let sweep_interval = match env::var("OTP_SWEEP_INTERVAL_SECS") {
            Ok(value) => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| "OTP_SWEEP_INTERVAL_SECS must be a valid number")?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| "PORT must be a valid number")?,
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://127.0.0.1:5500".to_string()),
            allowed_email_domain: env::var("ALLOWED_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "jyotirgamay.online".to_string()),
            delivery_timeout: Duration::from_secs(delivery_timeout_secs),
            sweep_interval,
        })
    }
}
