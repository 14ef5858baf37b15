use super::controller::{request_otp, verify_otp};
use actix_web::web;

pub fn otp_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/request-otp", web::post().to(request_otp))
        .route("/verify-otp", web::post().to(verify_otp));
}
