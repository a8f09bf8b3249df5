//! Core domain concepts shared across all subdomains.
//!
//! - [`backend::BackendId`] — identity of an analysis backend
//! - [`error::DomainError`] — domain-level errors

pub mod backend;
pub mod error;
