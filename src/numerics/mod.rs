//! Numeric building blocks: Gaussian arithmetic, truncation corrections,
//! count ranges and a small dense matrix.

pub mod gaussian;
pub mod matrix;
pub mod range;
pub mod truncated;

pub use gaussian::GaussianDistribution;
pub use matrix::Matrix;
pub use range::{PlayersRange, Range, TeamsRange};
