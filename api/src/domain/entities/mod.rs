//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod daily_steps;
pub mod group;
pub mod step_sample;
pub mod user;

pub use daily_steps::{DailySteps, LeaderboardEntry};
pub use group::GroupId;
pub use step_sample::{
    DatedSample, InsertOutcome, NewStepSample, Provider, SampleInput, StepSample, StepSampleId,
};
pub use user::{User, UserId};
