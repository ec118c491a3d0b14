//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod daily_steps_repo;
pub mod group_directory;
pub mod social_graph;
pub mod step_ledger;
pub mod step_sample_repo;
pub mod user_directory;


pub use daily_steps_repo::PostgresDailyStepsRepository;
pub use group_directory::PostgresGroupDirectory;
pub use social_graph::PostgresSocialGraph;
pub use step_ledger::PostgresStepLedger;
pub use step_sample_repo::PostgresStepSampleRepository;
pub use user_directory::PostgresUserDirectory;
