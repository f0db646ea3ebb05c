use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod output;

use commands::{build, docker, terraform, test, StepArgs};
use output::OutputFormat;
use stagehand::ops::Envelope;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version = VERSION)]
#[command(about = "Uniform CI/CD pipeline step execution")]
struct Cli {
    /// Output format for the result envelope
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Text => OutputFormat::Text,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a project with its build tool
    Build(StepArgs),
    /// Run a test suite and parse its metrics
    Test(StepArgs),
    /// Build and push container images
    Docker(StepArgs),
    /// Run infrastructure provisioning operations
    Terraform(StepArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let format = cli.format.into();

    let result = match cli.command {
        Commands::Build(args) => build::run(args),
        Commands::Test(args) => test::run(args),
        Commands::Docker(args) => docker::run(args),
        Commands::Terraform(args) => terraform::run(args),
    };

    let envelope = match result {
        Ok(envelope) => envelope,
        Err(err) => Envelope::from_error(&err),
    };

    if let Err(err) = output::print_envelope(&envelope, format) {
        eprintln!("Error: {}", err.description());
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(output::exit_code_for(&envelope))
}
