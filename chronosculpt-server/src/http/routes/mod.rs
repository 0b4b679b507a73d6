//! Route handlers organized by resource

pub mod entries;
pub mod habits;
pub mod health;
pub mod records;
