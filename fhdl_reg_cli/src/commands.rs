use clap::Subcommand;

use self::sim::SimArgs;

mod sim;

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate a register driven by a stimulus file
    Sim(SimArgs),
}

pub trait Run {
    fn run(&self) -> anyhow::Result<()>;
}

impl Commands {
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Self::Sim(args) => args.run(),
        }
    }
}
