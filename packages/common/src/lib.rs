pub mod attendance;
pub mod grading;
pub mod import;

pub use grading::{Composite, GradeWeights, Remarks};
