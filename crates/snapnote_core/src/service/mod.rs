//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate backend capability calls into screen-level actions.
//! - Keep UI/FFI layers decoupled from backend details.

pub mod auth_service;
pub mod note_controller;
