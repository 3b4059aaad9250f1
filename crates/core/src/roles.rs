//! User role name constants.
//!
//! Roles are stored by name in the `users` table; handlers compare
//! against these constants instead of string literals.

/// Full administrative access: user management, logs, settings, sends.
pub const ROLE_ADMIN: &str = "admin";

/// Day-to-day operator: inbox, bookings, contact requests, invoices.
pub const ROLE_STAFF: &str = "staff";
