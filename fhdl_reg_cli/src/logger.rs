use std::{
    env,
    io::{self, IsTerminal},
};

use clap::ValueEnum;
use tracing::Subscriber;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

const LOG_ENV_VAR: &str = "FHDL_LOG";

/// Warnings everywhere, plus values requested with `--watch`.
const DEFAULT_FILTER: &str = "warn,watch=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Color {
    Never,
    Auto,
    Always,
}

impl Color {
    pub fn use_colors(&self) -> bool {
        match self {
            Self::Never => false,
            Self::Auto => io::stderr().is_terminal(),
            Self::Always => true,
        }
    }
}

fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn subscriber<W>(filter: EnvFilter, ansi: bool, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true),
    )
}

pub(crate) fn init_logger(color: Color) -> anyhow::Result<()> {
    let filter = env_filter(env::var(LOG_ENV_VAR).ok().as_deref());
    let subscriber = subscriber(filter, color.use_colors(), io::stderr);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use ferrum_reg::prelude::*;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn watched_run(directives: Option<&str>) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = subscriber(env_filter(directives), false, move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            let width = Width::new(8).unwrap();
            let bench = Testbench::new(ClockDomain::default(), width, width).unwrap();
            let opts = RunOpts {
                vcd: None,
                watch: Some(WatchFmt::Hex),
            };
            bench.run(&[CycleInput::data(0xAB)], &opts).unwrap();
        });

        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn watch_shown_by_default() {
        let logs = watched_run(None);

        assert!(logs.contains("reg: ab"), "{logs}");
        assert!(!logs.contains("simulation finished"), "{logs}");
    }

    #[test]
    fn watch_hidden_by_env_filter() {
        let logs = watched_run(Some("error"));

        assert!(!logs.contains("reg: ab"), "{logs}");
    }

    #[test]
    fn invalid_env_filter_falls_back() {
        let logs = watched_run(Some("watch=loud"));

        assert!(logs.contains("reg: ab"), "{logs}");
    }
}
