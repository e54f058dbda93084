pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod generate;
pub mod row;
pub mod schema;
pub mod seeder;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::SeedOptions;
pub use error::SeedError;
pub use seeder::{seed, seed_database, SeedReport, TableReport};
pub use ui::{ConsoleUi, SilentUi, Ui};
