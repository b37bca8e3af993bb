use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

const EXAMPLES: &str = "\
Examples:
  gostwriter --env=production
  gostwriter --env=staging --config=/path/to/config.yml
  gost $(gostwriter --env=production)";

#[derive(Parser, Debug)]
#[command(
    name = "gostwriter",
    version,
    about = "gostwriter - A ghostwriter for your gost commands",
    disable_version_flag = true,
    after_help = EXAMPLES
)]
pub struct Args {
    /// Environment name (required)
    #[arg(long)]
    pub env: Option<String>,

    /// Configuration file
    #[arg(long, env = "GOSTWRITER_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print the resolved variables (YAML) to stderr before the command
    #[arg(long, default_value_t = false)]
    pub dump_vars: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    _version: Option<bool>,
}

impl Args {
    pub fn usage() -> String {
        use clap::CommandFactory;
        Self::command().render_help().to_string()
    }
}
