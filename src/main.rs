use anyhow::{Context as _, Result};
use clap::Parser;
use std::process::ExitCode;

use gostwriter::{cli::Args, logging, resolve_vars, Config};

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let Some(env) = args.env.as_deref().filter(|e| !e.is_empty()) else {
        eprintln!("Error: --env is required\n");
        eprint!("{}", Args::usage());
        return ExitCode::FAILURE;
    };

    match run(&args, env) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, env: &str) -> Result<String> {
    let cfg = Config::load_from_path(&args.config)?;

    if args.dump_vars {
        let (_, vars) = resolve_vars(&cfg, env)?;
        let yaml = serde_yaml::to_string(&vars).context("serializing resolved variables")?;
        eprint!("{yaml}");
    }

    let argv = gostwriter::generate(&cfg, env)?;
    Ok(argv.join(" "))
}
