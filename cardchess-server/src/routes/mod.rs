//! HTTP route handlers

pub mod error;
pub mod games;
pub mod status;
