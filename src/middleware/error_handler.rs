use actix_web::error::{JsonPayloadError, UrlencodedError};
use actix_web::{Error, HttpRequest};
use log::debug;

use crate::utils::error::CustomError;

/// Malformed JSON bodies get the same envelope as every other error
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("Rejected JSON body on {}: {}", req.path(), err);
    CustomError::BadRequestError(err.to_string()).into()
}

pub fn form_error_handler(err: UrlencodedError, req: &HttpRequest) -> Error {
    debug!("Rejected form body on {}: {}", req.path(), err);
    CustomError::BadRequestError(err.to_string()).into()
}
