use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;

use crate::utils::helpers::OTP_EXPIRATION_MINUTES;

/// Outbound mail capability used to deliver codes
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, to_email: &str, subject: &str, body: &str) -> Result<(), String>;
}

/// SMTP Configuration
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_tls: bool,
    pub from_email: String,
    pub from_name: Option<String>,
}

impl EmailConfig {
    /// Load email configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let smtp_username = env::var("SMTP_USERNAME").map_err(|_| "SMTP_USERNAME is required")?;

        Ok(Self {
            smtp_host: env::var("SMTP_HOST")
                .unwrap_or_else(|_| "webmail.jyotirgamay.online".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .map_err(|_| "SMTP_PORT must be a valid number")?,
            smtp_password: env::var("SMTP_PASSWORD").map_err(|_| "SMTP_PASSWORD is required")?,
            smtp_tls: env::var("SMTP_TLS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| "SMTP_TLS must be true or false")?,
            from_email: env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| smtp_username.clone()),
            from_name: env::var("SMTP_FROM_NAME").ok(),
            smtp_username,
        })
    }

    fn from_address(&self) -> String {
        match &self.from_name {
            Some(name) => format!("{} <{}>", name, self.from_email),
            None => self.from_email.clone(),
        }
    }
}

/// Email service for sending emails over SMTP
pub struct EmailService {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailService {
    /// Create a new EmailService instance
    pub fn new() -> Result<Self, String> {
        let config = EmailConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new EmailService with custom config
    pub fn with_config(config: EmailConfig) -> Result<Self, String> {
        let transport = Self::build_transport(&config)?;
        Ok(Self { config, transport })
    }

    /// Build the SMTP transport
    fn build_transport(config: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
        } else {
            // Plain SMTP, no TLS
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };

        Ok(builder.credentials(creds).port(config.smtp_port).build())
    }
}

#[async_trait]
impl Mailer for EmailService {
    /// Send a plain text email
    async fn send_email(&self, to_email: &str, subject: &str, body: &str) -> Result<(), String> {
        let email = Message::builder()
            .from(
                self.config
                    .from_address()
                    .parse()
                    .map_err(|e| format!("Invalid from address: {}", e))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| format!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| format!("Failed to build email: {}", e))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| format!("Failed to send email: {}", e))?;

        Ok(())
    }
}

pub const OTP_EMAIL_SUBJECT: &str = "Your OTP Code";

/// Body of the message carrying a login code
pub fn otp_email_body(otp_code: u32) -> String {
    format!(
        "Your OTP code is {}. It is valid for {} minutes.",
        otp_code, OTP_EXPIRATION_MINUTES
    )
}
