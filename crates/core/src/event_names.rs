//! Platform event type constants.
//!
//! Dot-separated names published on the event bus and pushed to the
//! global notification stream. Handlers and tests use these constants
//! instead of string literals.

/// A new email row was stored (manual import or reply copy).
pub const EMAIL_RECEIVED: &str = "email.received";

/// An operator took the advisory edit lock on an email.
pub const EMAIL_LOCKED: &str = "email.locked";

/// An operator released the advisory edit lock on an email.
pub const EMAIL_UNLOCKED: &str = "email.unlocked";

/// An email was moved to another mailbox.
pub const EMAIL_MOVED: &str = "email.moved";

/// An AI analysis batch started.
pub const BATCH_STARTED: &str = "batch.started";

/// An AI analysis batch reached its terminal success state.
pub const BATCH_COMPLETED: &str = "batch.completed";

/// An AI analysis batch aborted with a fatal error.
pub const BATCH_FAILED: &str = "batch.failed";

/// A contact request was submitted through the public form.
pub const CONTACT_CREATED: &str = "contact.created";

/// A booking was created for a free slot.
pub const BOOKING_CREATED: &str = "booking.created";

/// Maintenance mode was switched on or off.
pub const SYSTEM_MAINTENANCE: &str = "system.maintenance";
