/*!
 * Command-line interface for lmpack
 */

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use rayon::ThreadPoolBuilder;

use lmpack::config::{Args, Config};
use lmpack::packer::Packer;
use lmpack::report::{PackReport, Reporter};
use lmpack::utils::count_files;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "lmpack", &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::from_args(args);

    env_logger::Builder::new()
        .filter_level(if config.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    config.validate()?;
    config.resolve_paths()?;
    log::debug!("Index path: {}", config.index_path.display());

    // Configure thread pool
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        log::warn!("Failed to set thread pool size: {}", e);
    }

    let git_root = config.git_root();
    let output_file = config.output_file(git_root.as_deref())?;
    log::debug!("Output file path: {}", output_file.display());

    let progress = ProgressBar::new(count_files(&config.index_path));
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%)")
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("📦 Packing");

    let packer = Packer::from_config(&config, git_root.as_deref(), Arc::new(progress.clone()))?;

    let start_time = Instant::now();

    let mut writer = BufWriter::new(File::create(&output_file)?);
    let counters = packer.pack(&mut writer)?;
    drop(writer);

    let duration = start_time.elapsed();
    progress.finish_and_clear();

    let report = PackReport {
        output_file: output_file.display().to_string(),
        duration,
        output_bytes: fs::metadata(&output_file)?.len(),
        counters,
    };

    Reporter::new(config.report_format).print_report(&report)?;

    Ok(())
}
