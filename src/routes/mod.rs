//! Router module index.
//!
//! Organizes the routing logic into security-segregated modules so access
//! control is applied explicitly at the module level, preventing accidental
//! exposure of protected endpoints.

/// Routes accessible without a credential: health probe and self-registration.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated user session.
pub mod authenticated;
