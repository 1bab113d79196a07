use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "airquality-pl")]
#[command(about = "Retrieve and enrich CAMS air-quality observations for Poland")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file [default: airquality.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage 1: retrieve one year of observations and write the raw dataset
    Extract {
        #[arg(
            short,
            long,
            help = "Output file path [default: air_quality_{country}_{year}.csv]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Year to retrieve [default: from settings]")]
        year: Option<i32>,

        #[arg(long, help = "Directory for temporary bundles [default: next to output]")]
        work_dir: Option<PathBuf>,

        #[arg(long, help = "Do not write the provider credentials file")]
        skip_credentials_file: bool,
    },

    /// Stage 2: clean, decode regions and derive calendar fields
    Preprocess {
        #[arg(short, long, help = "Stage-1 file [default: from settings]")]
        input: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output file path [default: input name with _processed suffix]"
        )]
        output: Option<PathBuf>,
    },

    /// List the tabular entries of a downloaded bundle
    Inspect {
        #[arg(short, long, help = "Zip bundle to inspect")]
        bundle: PathBuf,
    },
}
