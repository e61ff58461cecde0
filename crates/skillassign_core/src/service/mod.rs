//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP/CLI layers decoupled from storage details.

pub mod assessment_service;
pub mod assignment_service;
pub mod project_locks;
pub mod task_service;
