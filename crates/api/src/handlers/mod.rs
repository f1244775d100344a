//! Request handlers.

pub mod views;
