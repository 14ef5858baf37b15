pub mod config;
pub mod email;
pub mod email_validation;
pub mod error;
pub mod helpers;
