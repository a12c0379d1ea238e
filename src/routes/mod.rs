//! Router Module Index
//!
//! Splits the routing table by access level. Access control is attached per module
//! (route layers or handler extractors), so a new route inherits the guard of the
//! module it is added to.

/// Routes accessible to anyone: health check and the authentication flow.
pub mod public;

/// Routes behind the `LoginRequired` route layer.
pub mod authenticated;

/// Routes whose handlers require the superuser role.
pub mod admin;

/// The JSON sample resource.
pub mod api;
