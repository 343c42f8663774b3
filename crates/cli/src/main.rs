mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "vex", version, about = "Dump and inspect exported runtime variables")]
struct Cli {
    /// Diagnostic log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Register sample process variables and dump their namespace
    Demo(DemoArgs),

    /// List namespaces known to this process
    Namespaces,
}

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Lines)]
    pub output: OutputFormat,

    /// Include documentation comment lines (lines output only)
    #[arg(long)]
    pub doc: bool,

    /// Namespace to register the sample variables into
    #[arg(long, default_value = "demo")]
    pub namespace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Property lines, `name=value`
    Lines,
    /// The compact `{name='value', ...}` object form
    Object,
    /// Strict JSON
    Json,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::Demo(args) => cmd::demo::run(&args),
        Commands::Namespaces => cmd::namespaces::run(),
    }
    Ok(())
}
