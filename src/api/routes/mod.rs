//! Route handlers

pub mod health;
pub mod stats;
pub mod status;
pub mod tokens;
