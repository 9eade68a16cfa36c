use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use onenote_tana::{ConvertOptions, PageEntry, PageFilter, read_manifest};

/// Convert exported OneNote pages into a Tana Intermediate Format file.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Page files (.mht, .mhtml or .html), converted after any manifest pages
    files: Vec<PathBuf>,

    /// JSON manifest listing pages with their notebook/section metadata
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Write to file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only pages from this notebook (case sensitive)
    #[arg(short, long)]
    notebook: Option<String>,

    /// Only pages from this section (case sensitive)
    #[arg(short, long)]
    section: Option<String>,

    /// Only pages whose name contains one of these (case sensitive)
    #[arg(short, long, num_args = 1..)]
    page: Vec<String>,

    /// UTC offset of the page header dates, in minutes
    #[arg(long, default_value_t = onenote_tana::tif::DEFAULT_UTC_OFFSET_MINUTES, allow_hyphen_values = true)]
    utc_offset: i32,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.files.is_empty() && cli.manifest.is_none() {
        log::error!("Nothing to convert: pass page files or --manifest");
        return ExitCode::FAILURE;
    }

    let mut entries = match cli.manifest.as_deref().map(read_manifest).transpose() {
        Ok(entries) => entries.unwrap_or_default(),
        Err(e) => {
            log::error!("Could not read manifest: {e}");
            return ExitCode::FAILURE;
        }
    };
    entries.extend(cli.files.iter().map(|f| PageEntry::from_file(f)));

    let filter = PageFilter {
        notebook: cli.notebook,
        section: cli.section,
        pages: cli.page,
    };
    let entries = filter.apply(entries);
    if entries.is_empty() {
        log::error!("No pages matched the selection");
        return ExitCode::FAILURE;
    }
    log::info!("] {} pages", entries.len());

    let options = ConvertOptions {
        utc_offset_minutes: cli.utc_offset,
        ..Default::default()
    };
    match onenote_tana::convert_entries_to_tif(&entries, options, cli.output.as_deref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Could not write output: {e}");
            ExitCode::FAILURE
        }
    }
}
