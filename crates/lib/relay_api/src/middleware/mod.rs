//! Request middleware.

pub mod panic;
