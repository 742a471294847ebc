use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_MAX_CONCURRENCY;

#[derive(Parser)]
#[command(
    name = "reportship",
    version,
    about = "Uploads JUnit XML test reports to an ingestion endpoint",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    Upload {
        #[arg(
            required = true,
            help = "Report files, or directories containing .xml reports (non-recursive)"
        )]
        paths: Vec<PathBuf>,

        #[arg(short, long, help = "Logical service the reports belong to")]
        service: String,

        #[arg(long, help = "Environment tag, highest precedence among tag sources")]
        env: Option<String>,

        #[arg(
            long,
            help = "key:value tags attached to every payload (comma-separated, repeatable)",
            value_delimiter = ','
        )]
        tags: Vec<String>,

        #[arg(
            long,
            default_value_t = DEFAULT_MAX_CONCURRENCY,
            help = "Maximum simultaneous uploads"
        )]
        max_concurrency: usize,

        #[arg(long, help = "Validate and count reports without uploading")]
        dry_run: bool,
    },
}
