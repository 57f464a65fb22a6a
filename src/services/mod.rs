// src/services/mod.rs
//
// Collaborators shared by the domain modules: the identity provider client
// and the session token issuer

pub mod google;
pub mod tokens;

pub use google::GoogleService;
pub use tokens::TokenService;
