use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing::level_filters::LevelFilter;

use crate::{
    merge::{default_output_path, format_report, run_merge},
    recorder::{
        sampler::{SamplerConfig, DEFAULT_PERIOD, DEFAULT_PROBE_TIMEOUT},
        start_recorder,
    },
    utils::{
        dir::{create_application_dir, default_record_dir},
        logging::enable_logging,
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "wasted-time", version, long_about = None)]
#[command(about = "Records all time which was spent on different windows/apps with titles")]
pub struct Args {
    #[arg(short, long, help = "Merge all records of --input into one file")]
    merge: bool,
    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Input directory where to take files for merging"
    )]
    input: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        requires = "merge",
        help = "Where to save merged results. By default wasted_time_merged.csv in the temp directory"
    )]
    output: Option<PathBuf>,
    #[arg(
        long,
        value_name = "DIR",
        conflicts_with = "merge",
        help = "Directory for day records. By default $HOME/wasted_time"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long = "period-ms",
        default_value_t = DEFAULT_PERIOD.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..),
        conflicts_with = "merge",
        help = "Time between two samples in milliseconds"
    )]
    period_ms: u64,
    #[arg(
        long = "probe-timeout-ms",
        default_value_t = DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..),
        conflicts_with = "merge",
        help = "How long to wait for the active window before skipping a sample"
    )]
    probe_timeout_ms: u64,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    log_console: bool,
    #[arg(long = "log-filter")]
    log: Option<LevelFilter>,
}

#[derive(Debug, PartialEq)]
pub enum Mode {
    Record {
        dir: Option<PathBuf>,
        config: SamplerConfig,
    },
    Merge {
        input: PathBuf,
        output: PathBuf,
    },
}

impl Args {
    /// Resolves which mode was asked for. `--merge` needs `--input`, recording takes neither.
    pub fn mode(&self) -> Result<Mode, clap::Error> {
        match (self.merge, &self.input) {
            (true, Some(input)) => Ok(Mode::Merge {
                input: input.clone(),
                output: self.output.clone().unwrap_or_else(default_output_path),
            }),
            (false, None) => Ok(Mode::Record {
                dir: self.dir.clone(),
                config: SamplerConfig {
                    period: Duration::from_millis(self.period_ms),
                    probe_timeout: Duration::from_millis(self.probe_timeout_ms),
                },
            }),
            _ => Err(Args::command().error(
                ErrorKind::ArgumentConflict,
                "Please specify both --merge and --input or nothing",
            )),
        }
    }
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();
    let mode = args.mode().unwrap_or_else(|e| e.exit());

    match mode {
        Mode::Record { dir, config } => {
            let dir = create_application_dir(dir.map_or_else(default_record_dir, Ok)?)?;
            enable_logging(Some(&dir.join("logs")), args.log, args.log_console)?;
            single_thread_runtime()?.block_on(start_recorder(dir, config))
        }
        Mode::Merge { input, output } => {
            enable_logging(None, args.log, args.log_console)?;
            let merged = single_thread_runtime()?.block_on(run_merge(&input, &output))?;
            println!("Saving merged results to '{}'", output.display());
            print!("{}", format_report(&merged));
            Ok(())
        }
    }
}
