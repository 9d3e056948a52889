use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use nscan::cli::Args;
use nscan::config::AppSettings;
use nscan::error::CliResult;
use nscan::output::{self, RenderOptions};
use nscan::scanner::{self, PortState};
use nscan::types::ScanTarget;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let target = args.target.clone();
    run(args)
        .await
        .with_context(|| format!("scan of {target} failed"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "nscan=debug" } else { "nscan=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> CliResult<()> {
    let settings = match &args.config {
        Some(path) => AppSettings::load_from(path)?,
        None => AppSettings::load()?,
    };

    let ports = args.port_spec()?.to_ports();
    let target = ScanTarget::new(&args.target, ports)?;
    let options = args.scan_options(&settings);

    let progress = args.verbose.then(|| progress_bar(target.ports().len() as u64));
    let report = scanner::scan_with_progress(&target, &options, |result| {
        if let Some(pb) = &progress {
            pb.inc(1);
            if result.state() == PortState::Open {
                pb.set_message(format!("found open port {}", result.port()));
            }
        }
    })
    .await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let render = RenderOptions {
        show_closed: args.show_closed,
        banners: options.grab_banners,
    };
    output::print_report(&report, args.output_format(&settings), render)?;
    Ok(())
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
