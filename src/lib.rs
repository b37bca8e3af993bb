pub mod cli;
pub mod config;
pub mod error;
pub mod expand;
pub mod logging;
pub mod pipeline;
pub mod resolve;
pub mod templates;
pub mod tokenize;

pub use config::{Config, Environment, VarMap};
pub use error::{Error, Result, Stage};
pub use pipeline::{generate, run};
pub use resolve::resolve_vars;
