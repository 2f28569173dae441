//! CLI command implementation

use std::io::Write;

use anyhow::Context;
use cbs_core::{CbsParameters, calculate};

use crate::Cli;

/// How the computed parameters are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `Class <A|B>: idleslope .. sendslope .. hicredit .. locredit ..` line per class
    #[default]
    Text,
    /// A single JSON object keyed by class
    Json,
}

/// Compute the parameters for `cli` and write them to `out`.
///
/// Nothing is written unless the whole calculation succeeds.
///
/// # Errors
/// - Descriptor coercion, link validation or credit equation failures
/// - Failure to write to `out`
pub(crate) fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let link = cli.link_config();
    tracing::debug!(?link, streams = cli.streams.len(), "Starting calculation");

    let parameters = calculate(&cli.streams, &link).context("Cannot compute CBS parameters")?;

    render(&parameters, cli.format, out).context("Failed to write results")
}

/// Render `parameters` in the requested format.
///
/// # Errors
/// - I/O or serialization failure on `out`
pub(crate) fn render(
    parameters: &CbsParameters,
    format: OutputFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => write!(out, "{parameters}")?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, parameters)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
