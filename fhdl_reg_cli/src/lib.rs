use clap::Parser;
use commands::Commands;

mod commands;
mod logger;

pub use logger::Color;

#[derive(Parser)]
#[command(name = "fhdl-reg")]
#[command(bin_name = "fhdl-reg")]
#[command(version, about, long_about = None)]
struct RegCli {
    /// Use colors in log output
    #[arg(long, global = true, value_enum, default_value_t = Color::Auto)]
    color: Color,
    #[command(subcommand)]
    command: Commands,
}

pub fn run_cli() -> anyhow::Result<()> {
    let args = RegCli::parse();
    logger::init_logger(args.color)?;

    args.command.run()
}
