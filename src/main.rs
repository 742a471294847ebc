use anyhow::Result;
use clap::{CommandFactory, Parser};
use reportship::{cli, commands, config::UploadConfig, ui};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() == 1 {
        let mut cmd = cli::Cli::command();
        cmd.print_help().expect("failed to print help");
        println!();
        return Ok(());
    }

    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{e}");
                    std::process::exit(0);
                }
                _ => {
                    ui::error(&e.to_string());
                    std::process::exit(1);
                }
            }
        }
    };

    let result = match cli.command {
        cli::Commands::Upload {
            paths,
            service,
            env,
            tags,
            max_concurrency,
            dry_run,
        } => {
            let config = UploadConfig {
                service,
                env,
                dry_run,
                tags,
                max_concurrency,
            };
            commands::upload::execute(paths, config, cli.verbose).await
        }
    };

    handle_result(result)
}

/// Success and skips-only batches exit 0; a fatal abort (or any setup
/// failure) exits 1.
fn handle_result(result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            ui::error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}
