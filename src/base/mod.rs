//! Core components and types for the triage form client.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Resolution of the triage service endpoint.
//! - Common types, wire shapes, and result handling.

pub mod config;
pub mod endpoint;
pub mod types;
