//! # Photos Module
//!
//! Content-addressed photo uploads: a file is identified by the SHA-256 of
//! its bytes, and uploading the same bytes again returns the existing record.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use routes::photos_routes;
