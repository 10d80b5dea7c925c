//! Common utilities and shared types for minitwit.
//!
//! This crate provides foundational components used across all minitwit crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Token generation**: Opaque bearer tokens via [`TokenGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use minitwit_common::{AppResult, Config, TokenGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let token_gen = TokenGenerator::new();
//!     let token = token_gen.generate();
//!     println!("Issued token: {token}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod token;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use token::TokenGenerator;
