//! `s5` command-line front-end over `s5-core`.

pub mod cli;

pub use cli::{CliError, init_logging, run, run_from_env};
