use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use super::model::VerifyOutcome;
use super::store::OtpStore;
use crate::utils::email::{Mailer, OTP_EMAIL_SUBJECT, otp_email_body};
use crate::utils::email_validation::EmailValidator;
use crate::utils::error::CustomError;

pub struct OtpService {
    store: Arc<dyn OtpStore>,
    mailer: Arc<dyn Mailer>,
    validator: EmailValidator,
    delivery_timeout: Duration,
}

impl OtpService {
    pub fn new(
        store: Arc<dyn OtpStore>,
        mailer: Arc<dyn Mailer>,
        validator: EmailValidator,
        delivery_timeout: Duration,
    ) -> Self {
        OtpService {
            store,
            mailer,
            validator,
            delivery_timeout,
        }
    }

    /// Issue a code for `email` and mail it.
    ///
    /// The code is stored before delivery is attempted, so a failed or timed
    /// out delivery still leaves it pending until it expires or is replaced.
    pub async fn request_otp(&self, email: &str) -> Result<(), CustomError> {
        if !self.validator.is_valid_email(email) {
            debug!("Rejected OTP request for an address outside the allowed domain");
            return Err(CustomError::InvalidEmailError);
        }

        let code = self.store.issue(email);
        info!("Issued OTP for {}", email);

        self.send_otp_email(email, code).await
    }

    async fn send_otp_email(&self, email: &str, code: u32) -> Result<(), CustomError> {
        let body = otp_email_body(code);
        let delivery = self.mailer.send_email(email, OTP_EMAIL_SUBJECT, &body);

        match tokio::time::timeout(self.delivery_timeout, delivery).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!("OTP Send Error for {}: {}", email, e);
                Err(CustomError::DeliveryError(e))
            }
            Err(_) => {
                error!(
                    "OTP Send Error for {}: timed out after {:?}",
                    email, self.delivery_timeout
                );
                Err(CustomError::DeliveryError("delivery timed out".to_string()))
            }
        }
    }

    /// Check a submitted code. `None` stands for a missing or non-numeric
    /// code, which can never match.
    pub fn verify_otp(&self, email: &str, code: Option<u32>) -> Result<(), CustomError> {
        // 0 is outside the issued range so it can only mismatch
        let outcome = self.store.verify(email, code.unwrap_or(0));

        match outcome {
            VerifyOutcome::Success => {
                info!("OTP verified for {}", email);
                Ok(())
            }
            VerifyOutcome::NotFound => Err(CustomError::OtpNotFoundError),
            VerifyOutcome::Expired => {
                info!("Expired OTP discarded for {}", email);
                Err(CustomError::OtpExpiredError)
            }
            VerifyOutcome::Mismatch => {
                warn!("OTP mismatch for {}", email);
                Err(CustomError::InvalidOtpError)
            }
        }
    }
}
