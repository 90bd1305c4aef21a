use clap::{Parser, Subcommand};
use overlay_frame::config::{self, ConfigOverrides};
use overlay_frame::{output, process};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "overlay-frame")]
#[command(about = "Batch-composite photographs onto a decorative frame overlay")]
#[command(long_about = "\
Batch-composite photographs onto a decorative frame overlay

Every .jpg, .jpeg, .png, .bmp, .tiff and .webp file in the input directory is
scaled, centered under an overlay PNG, and written to the output directory
under the same file name. Output is always PNG-encoded and exactly the size of
the overlay.

Landscape photos (wider than tall after EXIF rotation) use the horizontal
overlay; portrait and square photos use the vertical one.

Settings are read from overlay-frame.toml if present; flags override it.
Run 'overlay-frame gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = "overlay-frame.toml", global = true)]
    config: PathBuf,

    /// Input directory
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Overlay PNG for landscape photos
    #[arg(long, global = true)]
    horizontal_overlay: Option<PathBuf>,

    /// Overlay PNG for portrait and square photos
    #[arg(long, global = true)]
    vertical_overlay: Option<PathBuf>,

    /// Landscape photo width as a percentage of the overlay width
    #[arg(long, global = true)]
    horizontal_width: Option<f64>,

    /// Portrait photo width as a percentage of the overlay width
    #[arg(long, global = true)]
    vertical_width: Option<f64>,

    /// Maximum parallel workers (clamped to CPU cores)
    #[arg(long, short = 'j', global = true)]
    jobs: Option<usize>,

    /// Show per-image diagnostics
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Composite every photo in the input directory
    Process {
        /// Write a JSON report of the run to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Validate setup and show what would be done, without writing anything
    Check,
    /// Print a stock overlay-frame.toml with all options documented
    GenConfig,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
            horizontal_overlay: self.horizontal_overlay.clone(),
            vertical_overlay: self.vertical_overlay.clone(),
            horizontal_width_percent: self.horizontal_width,
            vertical_width_percent: self.vertical_width,
            max_processes: self.jobs,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Process { report } => {
            let config = config::load_config(&cli.config, &cli.overrides())?;
            output::print_config(&config);
            init_thread_pool(&config.workers);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process(&config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let batch = result?;

            output::print_summary(&batch);
            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&batch)?;
                std::fs::write(path, json)?;
                println!("Report: {}", path.display());
            }
        }
        Command::Check => {
            let config = config::load_config(&cli.config, &cli.overrides())?;
            output::print_config(&config);
            let planned = process::check(&config)?;
            output::print_check_output(&planned);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so they never mix with the progress lines.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on worker config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(workers: &config::WorkersConfig) {
    let threads = config::effective_threads(workers);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
