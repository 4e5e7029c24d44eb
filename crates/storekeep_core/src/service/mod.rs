//! Use-case services over entity repositories.
//!
//! # Responsibility
//! - Offer list/save/delete entry points shaped for UI callers (raw sort and
//!   filter strings, paged results).
//! - Keep callers decoupled from storage details.

pub mod entity_service;
pub mod seed;

pub use entity_service::{EntityService, PagedResult, ServiceError, ServiceResult};
pub use seed::{default_movies, seed_if_empty};
