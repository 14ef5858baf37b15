use crate::utils::helpers::service_name;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Invalid email domain")]
    InvalidEmailError,

    #[error("OTP expired or invalid")]
    OtpNotFoundError,

    #[error("OTP expired")]
    OtpExpiredError,

    #[error("Invalid OTP")]
    InvalidOtpError,

    /// The detail is for the logs only; clients see the generic message.
    #[error("Error sending OTP")]
    DeliveryError(String),

    #[error("Bad Request: {0}")]
    BadRequestError(String),
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::InvalidEmailError => StatusCode::BAD_REQUEST,
            CustomError::OtpNotFoundError => StatusCode::BAD_REQUEST,
            CustomError::OtpExpiredError => StatusCode::BAD_REQUEST,
            CustomError::InvalidOtpError => StatusCode::BAD_REQUEST,
            CustomError::DeliveryError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": match *self {
                CustomError::InvalidEmailError => "INVALID_EMAIL_ERROR",
                CustomError::OtpNotFoundError => "OTP_NOT_FOUND_ERROR",
                CustomError::OtpExpiredError => "OTP_EXPIRED_ERROR",
                CustomError::InvalidOtpError => "INVALID_OTP_ERROR",
                CustomError::DeliveryError(..) => "DELIVERY_ERROR",
                CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            },
            "service": service_name(),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}
