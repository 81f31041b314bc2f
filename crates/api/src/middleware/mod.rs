//! Request middleware: route access, session transport and error mapping.

pub mod access;
pub mod error_handling;
pub mod session;
