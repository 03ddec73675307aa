// tests/integration/main.rs

mod common;
mod transfer;
mod web;
