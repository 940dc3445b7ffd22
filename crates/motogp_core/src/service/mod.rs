//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate gateway calls into form-level use cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod form_controller;
pub mod intent;
