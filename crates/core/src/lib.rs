//! Core business logic for minitwit.

pub mod services;

pub use services::*;
