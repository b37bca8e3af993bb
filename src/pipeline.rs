use std::path::Path;
use tracing::debug;

use crate::{
    config::Config,
    error::{Error, Result},
    expand::{expand_env, join_lines},
    resolve::resolve_vars,
    templates::render,
    tokenize::split_args,
};

/// Load `config_path` and generate the argument list for `env_name`.
pub fn run<P: AsRef<Path>>(config_path: P, env_name: &str) -> Result<Vec<String>> {
    let cfg = Config::load_from_path(config_path)?;
    generate(&cfg, env_name)
}

/// Resolve, render, expand and tokenize the command for `env_name`.
pub fn generate(cfg: &Config, env_name: &str) -> Result<Vec<String>> {
    let (env, vars) = resolve_vars(cfg, env_name)?;

    let template = env.command();
    if template.is_empty() {
        return Err(Error::EmptyCommand {
            name: env_name.to_string(),
        });
    }

    let rendered = render(template, &vars)?;
    let line = expand_env(&join_lines(&rendered));
    debug!(env = env_name, command = %line, "expanded command");

    let args = split_args(&line);
    if args.is_empty() {
        return Err(Error::NoArgumentsGenerated);
    }
    Ok(args)
}
