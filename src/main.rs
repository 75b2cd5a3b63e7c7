use clap::Parser;
use simtrader::cli::{run, Cli};
use simtrader::logging::{init_logging, level_for_verbosity};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(level_for_verbosity(cli.verbose));
    run(cli)
}
