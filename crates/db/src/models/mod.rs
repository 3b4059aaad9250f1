//! Row structs and request/response DTOs, one module per entity.
//!
//! Row structs derive `FromRow + Serialize`; mutating DTOs derive
//! `Deserialize` plus `validator::Validate` where the payload carries
//! field-level constraints.

pub mod ai_usage;
pub mod app_log;
pub mod batch;
pub mod booking;
pub mod contact_request;
pub mod email;
pub mod faq;
pub mod invoice;
pub mod mailbox;
pub mod newsletter;
pub mod service;
pub mod session;
pub mod setting;
pub mod slot;
pub mod status;
pub mod user;
