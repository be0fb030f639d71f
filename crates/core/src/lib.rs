//! # Poremark Core
//!
//! Core types and traits for the poremark peak-extraction library.
//!
//! This crate provides:
//! - `Error` / `Result`: shared error handling
//! - `Footprint`: structuring-element shapes for windowed filters
//! - Algorithm trait for consistent API

pub mod error;
pub mod footprint;

pub use error::{Error, Result};
pub use footprint::Footprint;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::footprint::Footprint;
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in poremark.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
