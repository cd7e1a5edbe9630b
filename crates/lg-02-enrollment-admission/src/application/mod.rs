//! Application layer: the admission table and the enrollment flow it guards.

pub mod admission;
pub mod enrollment;
