//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request/response types exchanged with API clients.

/// API key credential model
pub mod api_key;
/// Voice-call log model and inbound webhook event types
pub mod call_log;
/// Captured lead (email gate submission) model
pub mod capture;
/// Email gate policy and evaluation
pub mod email_gate;
/// AI generation record model
pub mod generation;
/// Tenant organization model
pub mod organization;
/// Landing page model
pub mod page;
/// AI prompt template model
pub mod prompt;
