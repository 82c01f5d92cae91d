//! REST API client module for the micro-blogging backend.
//!
//! This module provides the `ApiClient` for talking to the backend over
//! HTTP/JSON with bearer token authentication, and the `ApiError` taxonomy
//! for everything that can go wrong doing so.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthSuccess, LoginResponse, OtpStatus, RegisterResponse};
pub use error::ApiError;
