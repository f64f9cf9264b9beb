pub mod cli;
pub mod cnpj;
pub mod input;
pub mod io_utils;
pub mod pipeline;
pub mod registry;
pub mod report;

use std::{env, io::Write, sync::OnceLock, time::Duration};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::{
    cli::Cli,
    pipeline::{ExitOutcome, INPUT_FILE_NAME, OUTPUT_FILE_NAME, RunConfig},
    report::ReportFormat,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("cnpj_report", LevelFilter::Info);
        }
        let _ = builder
            .target(env_logger::Target::Stdout)
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .try_init();
    });
}

pub fn run() -> Result<ExitOutcome> {
    init_logging();
    let cli = Cli::parse();
    let config = build_config(cli)?;
    debug!("Run configuration: {config:?}");
    pipeline::run(&config)
}

fn build_config(cli: Cli) -> Result<RunConfig> {
    let (input, output) = match (cli.input, cli.output) {
        (Some(input), Some(output)) => (input, output),
        (input, output) => {
            let dir = pipeline::executable_dir()?;
            (
                input.unwrap_or_else(|| dir.join(INPUT_FILE_NAME)),
                output.unwrap_or_else(|| dir.join(OUTPUT_FILE_NAME)),
            )
        }
    };
    Ok(RunConfig {
        input,
        output,
        endpoint: cli.endpoint,
        timeout: cli.timeout.map(Duration::from_secs),
        input_encoding: io_utils::resolve_encoding(
            cli.input_encoding.as_deref(),
            io_utils::DEFAULT_INPUT_ENCODING,
        )?,
        report: ReportFormat {
            delimiter: cli.delimiter,
            encoding: io_utils::resolve_encoding(
                cli.output_encoding.as_deref(),
                io_utils::DEFAULT_OUTPUT_ENCODING,
            )?,
        },
    })
}
