//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle credential hashing, signature verification, database
//! transactions and calls to the hosted LLM API.

pub mod anthropic;
pub mod api_key_service;
pub mod generation_service;
pub mod organization_service;
pub mod webhook_service;
