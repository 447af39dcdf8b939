mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sg")]
#[command(about = "A small static site generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Render markdown to HTML, copy everything else and write atom.xml
    Build {
        /// Input directory
        #[arg(short = 'i', long, default_value = "content")]
        input_dir: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = "build")]
        output_dir: PathBuf,
    },
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Build {
            input_dir,
            output_dir,
        } => commands::build_site(&input_dir, &output_dir),
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
