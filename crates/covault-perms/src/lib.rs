//! # Covault Perms
//!
//! The permission model for Covault: the totally ordered capability scale,
//! the stored grant record, and the pure access evaluator.
//!
//! ## Key Types
//!
//! - [`PermissionLevel`] - None < View < Manage < Admin < Owner
//! - [`PermissionGrant`] - One stored grant per (entity, document, user)
//! - [`access::meets`] - The single authorization check every operation uses
//!
//! ## Design Notes
//!
//! - **Owner bypass is dynamic**: the entity owner holds full access to
//!   every document under the entity without a stored grant. The rule lives
//!   in the evaluator, nowhere else.
//! - **At-least semantics**: authorization is always `held >= required`,
//!   never an exact match.
//! - **Absence means None**: revoking deletes the grant row; a None-level
//!   grant is never stored.

pub mod access;
pub mod grant;
pub mod level;

pub use grant::PermissionGrant;
pub use level::PermissionLevel;
