//! Service integrations for external APIs and clients.
//!
//! This module contains the client for the remote triage service. The service
//! module defines both a generic trait and a concrete HTTP implementation,
//! allowing for extensibility and easy testing.

pub mod triage;
