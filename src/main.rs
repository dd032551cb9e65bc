use apexprobe::cli::{run, Cli};
use apexprobe::{init_logging, LogFormat};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logging(cli.log_level(), format)?;

    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}
