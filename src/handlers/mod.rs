//! Request handlers, grouped by the surface they serve.

/// Login, logout and dashboard views (HTML).
pub mod views;

/// Superuser-only record list and soft delete.
pub mod records;

/// The stubbed `/sample` REST resource.
pub mod sample;
