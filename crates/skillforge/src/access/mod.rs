//! Access control — role membership and the grantor hierarchy.
//!
//! The access module provides:
//! - Opaque role identifiers with the well-known `ADMIN` and `QUIZMASTER`
//! - A membership registry consulted by every privileged operation
//! - Per-role admin roles (who may grant and revoke a role)
//! - The last-admin guard that keeps administrative control reachable

pub mod registry;
pub mod role;

pub use registry::RoleRegistry;
pub use role::Role;
