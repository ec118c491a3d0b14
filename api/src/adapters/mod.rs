//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod postgres;

pub use postgres::{
    PostgresDailyStepsRepository, PostgresGroupDirectory, PostgresSocialGraph, PostgresStepLedger,
    PostgresStepSampleRepository, PostgresUserDirectory,
};
