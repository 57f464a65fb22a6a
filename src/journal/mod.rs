//! # Journal Module
//!
//! Lifebooster journal entries: listing and creation.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


pub use routes::journal_routes;
