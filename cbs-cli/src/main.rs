//! calc-cbs-params - Command-line interface
//!
//! Computes Credit-Based Shaper parameters for SR classes A and B from a
//! description of the AVB streams sharing a link.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use cbs_core::tracing_setup::{CliLogLevel, init_tracing};
use cbs_core::{LinkConfig, StreamDescriptor};
use clap::Parser;

/// Command-line options.
///
/// Link options fall back to `CBS_LINK_SPEED` / `CBS_FRAME_NON_SR` and then
/// to the built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "calc-cbs-params")]
#[command(version)]
#[command(
    about = "Calculate CBS parameters based on AVB stream features such as AVTP format, payload size, and frame rate"
)]
#[command(
    after_help = "More than one --stream option can be passed to calculate CBS parameters based on multiple streams"
)]
struct Cli {
    /// Stream parameters: SR class, transport protocol, packet rate, payload size
    #[arg(
        long = "stream",
        value_name = "class=[a,b],transport=[avtp-aaf,avtp-cvf-h264],rate=RATE,psize=SIZE",
        required = true
    )]
    streams: Vec<StreamDescriptor>,

    /// Link speed in kbps [default: 1000000]
    #[arg(short = 'S', long)]
    link_speed: Option<u64>,

    /// Maximum frame size from non-SR traffic in bytes [default: 1542]
    #[arg(short = 's', long)]
    frame_non_sr: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = commands::OutputFormat::Text)]
    format: commands::OutputFormat,

    /// Console log level (written to stderr)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// Write full trace logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Link configuration with command-line values taking precedence.
    fn link_config(&self) -> LinkConfig {
        let mut config = LinkConfig::from_env();
        if let Some(link_speed) = self.link_speed {
            config.link_speed = link_speed;
        }
        if let Some(frame_non_sr) = self.frame_non_sr {
            config.frame_non_sr = frame_non_sr;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), cli.log_file.as_deref())
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging")?;

    let stdout = std::io::stdout();
    commands::run(&cli, &mut stdout.lock())
}
