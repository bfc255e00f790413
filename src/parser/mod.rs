pub mod fields;
pub mod sections;

pub use fields::{Field, Submission};
