// src/lib.rs

pub mod auth;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod mutation;
pub mod service;
pub mod store;
pub mod transfer;
pub mod two_factor;
pub mod vault_db;
pub mod web;

pub use error::VaultError;
pub use service::VaultService;
