//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod directory;
pub mod repositories;

pub use directory::{GroupDirectory, SocialGraph, UserDirectory};
pub use repositories::{DailyStepsRepository, StepLedger, StepSampleRepository};
