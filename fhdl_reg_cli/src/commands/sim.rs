use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Args;
use ferrum_reg::prelude::*;
use tracing::debug;

use super::Run;

#[derive(Debug, Args)]
pub struct SimArgs {
    /// Stimulus file (JSON)
    stimulus: PathBuf,
    /// Override the register width from the stimulus file
    #[arg(short, long)]
    width: Option<u32>,
    /// Dump waveforms into a VCD file
    #[arg(long)]
    vcd: Option<PathBuf>,
    /// Log the register value every cycle (dec, hex, HEX, bin, debug)
    #[arg(long)]
    watch: Option<WatchFmt>,
}

impl SimArgs {
    fn load_config(&self) -> anyhow::Result<SimConfig> {
        let mut config = SimConfig::from_path(&self.stimulus)
            .with_context(|| format!("failed to load '{}'", self.stimulus.display()))?;

        if let Some(width) = self.width {
            config.width = Width::new(width)?;
        }
        debug!(?config, "loaded stimulus");

        Ok(config)
    }
}

impl Run for SimArgs {
    fn run(&self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        let bench = Testbench::from_config(&config).context("invalid register configuration")?;

        let opts = RunOpts {
            vcd: self.vcd.clone(),
            watch: self.watch,
        };
        let outputs = bench
            .run(&config.cycles, &opts)
            .context("simulation failed")?;

        let mut stdout = io::stdout().lock();
        for (cycle, q) in outputs.iter().enumerate() {
            writeln!(stdout, "cycle {}: q = {q:#x}", cycle + 1)?;
        }

        Ok(())
    }
}
