//! Background tasks spawned by the API process.

pub mod batch;
