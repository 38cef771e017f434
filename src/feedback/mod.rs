//! Per-widget feedback capture and remote submission.

mod token_store;

pub mod config;
pub mod controller;
pub mod gateway;
pub mod state;

pub use token_store::{TOKEN_ENV, TokenStore, TokenStoreError, resolve_token};
