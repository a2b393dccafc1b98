//! Probing and health classification of the messenger server

pub mod health;
pub mod probe;
