use anyhow::{Context, Result};
use clap::Parser;
use kiln_core::cli::{Cli, Command};
use kiln_core::{config, package, PipelineContext};
use kiln_workflow::{Runner, StepList};

pub fn run() -> Result<u8> {
    let cli = Cli::parse();
    kiln_core::logging::init_with(Some(&cli.log_path()));
    execute(&cli)
}

/// Assemble the step list the CLI asks for.
pub fn load_steps(cli: &Cli) -> Result<StepList> {
    let root = std::fs::canonicalize(&cli.root)
        .with_context(|| format!("working root not found: {}", cli.root.display()))?;
    let ctx = PipelineContext::new(root, cli.revision.clone());
    match &cli.pipeline {
        Some(path) => config::load_pipeline(&ctx.root.join(path), &ctx),
        None => package::package_pipeline(&ctx),
    }
}

/// Run the selected command and return the process exit status.
pub fn execute(cli: &Cli) -> Result<u8> {
    let steps = load_steps(cli)?;
    match cli.command() {
        Command::Plan => {
            for line in steps.summary_lines() {
                println!("{}", line);
            }
            Ok(0)
        }
        Command::Build => {
            // Aborts are reported by the log sink.
            let result = Runner::new().run(steps);
            Ok(result.exit_code())
        }
    }
}
