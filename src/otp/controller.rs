use actix_web::{HttpResponse, http::StatusCode, web};
use serde_json::json;

use crate::otp::model::{RequestOtpRequest, VerifyOtpRequest};
use crate::otp::service::OtpService;
use crate::utils::error::CustomError;
use crate::utils::helpers::service_name;

fn ok_response(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

pub async fn request_otp(
    otp_service: web::Data<OtpService>,
    body: web::Either<web::Json<RequestOtpRequest>, web::Form<RequestOtpRequest>>,
) -> Result<HttpResponse, CustomError> {
    let request = body.into_inner();
    otp_service.request_otp(&request.email).await?;

    Ok(ok_response("OTP sent successfully"))
}

pub async fn verify_otp(
    otp_service: web::Data<OtpService>,
    body: web::Either<web::Json<VerifyOtpRequest>, web::Form<VerifyOtpRequest>>,
) -> Result<HttpResponse, CustomError> {
    let request = body.into_inner();
    let code = request.otp_code();
    otp_service.verify_otp(&request.email, code)?;

    Ok(ok_response("OTP verified successfully"))
}
