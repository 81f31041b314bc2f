//! # Coachline Core
//!
//! Domain types and pure policy shared by the remote client and the HTTP
//! service: entity models, the error type, relation normalization, role
//! derivation, route access rules, form validation and view keys.

pub mod access;
pub mod errors;
pub mod models;
pub mod query;
pub mod relation;
pub mod roles;
pub mod validation;
