//! Domain helpers shared by the repositories and handlers

pub mod day;
pub mod validation;

pub use day::DayBoundary;
pub use validation::ValidationError;
