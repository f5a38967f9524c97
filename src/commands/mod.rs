//! Command handlers.

pub mod compare;
