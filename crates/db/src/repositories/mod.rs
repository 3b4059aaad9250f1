//! Stateless repository structs, one per entity.
//!
//! Repositories expose associated functions taking a `&PgPool`; they
//! never hold state themselves. Paging inputs are clamped here so
//! handlers cannot request unbounded result sets.

pub mod ai_usage_repo;
pub mod batch_repo;
pub mod booking_repo;
pub mod contact_request_repo;
pub mod email_repo;
pub mod faq_repo;
pub mod invoice_repo;
pub mod log_repo;
pub mod mailbox_repo;
pub mod newsletter_repo;
pub mod service_repo;
pub mod session_repo;
pub mod setting_repo;
pub mod slot_repo;
pub mod user_repo;

pub use ai_usage_repo::AiUsageRepo;
pub use batch_repo::BatchRepo;
pub use booking_repo::BookingRepo;
pub use contact_request_repo::ContactRequestRepo;
pub use email_repo::EmailRepo;
pub use faq_repo::FaqRepo;
pub use invoice_repo::InvoiceRepo;
pub use log_repo::LogRepo;
pub use mailbox_repo::MailboxRepo;
pub use newsletter_repo::NewsletterRepo;
pub use service_repo::ServiceRepo;
pub use session_repo::SessionRepo;
pub use setting_repo::SettingRepo;
pub use slot_repo::SlotRepo;
pub use user_repo::UserRepo;

/// Default page size for list queries.
pub(crate) const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for list queries.
pub(crate) const MAX_LIMIT: i64 = 100;

/// Clamp a requested limit to `1..=MAX_LIMIT`, defaulting to
/// [`DEFAULT_LIMIT`].
pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub(crate) fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(100_000)), MAX_LIMIT);
    }

    #[test]
    fn offset_never_negative() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-5)), 0);
        assert_eq!(clamp_offset(Some(200)), 200);
    }
}
