pub mod reporting;
pub mod sampling;
