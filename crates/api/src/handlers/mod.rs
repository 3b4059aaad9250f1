//! HTTP handlers, one module per resource family.

pub mod ai_config;
pub mod ai_usage;
pub mod analysis;
pub mod auth;
pub mod bookings;
pub mod contact_requests;
pub mod emails;
pub mod events;
pub mod faq;
pub mod invoices;
pub mod logs;
pub mod mailboxes;
pub mod newsletter;
pub mod services;
pub mod settings;
pub mod slots;
pub mod system;
pub mod users;
