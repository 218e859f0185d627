use clap::{Parser, Subcommand};
use justified_gal::config::{self, RunMode};
use justified_gal::process::{self, BuildOptions, Order, ProcessConfig};
use justified_gal::types::{DEFAULT_FAVICON_EMOJI, DEFAULT_TITLE, PageSettings};
use justified_gal::{logging, output, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "justified-gal")]
#[command(about = "Prepare photo trees for a justified-grid web gallery")]
#[command(long_about = "\
Prepare photo trees for a justified-grid web gallery

Every supported image below INPUT (jpg, jpeg, png, gif, webp, bmp, tif, tiff)
is decoded once, turned upright according to its EXIF orientation, and encoded
to two AVIF tiers:

  site/
  ├── manifest.json                # Page settings + ordered image records
  ├── gallery/trips/IMG_1.avif     # Height-capped grid image (480px by default)
  ├── lightbox/trips/IMG_1.avif    # Longer edge capped (3000px by default)
  └── original/trips/IMG_1.jpg     # Untouched copy, only with --download

Images keep their sorted relative-path order unless --shuffle is given.
Any failure aborts the run and no manifest is written.

Run 'justified-gal gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Directory to read photos from (searched recursively)
    input: PathBuf,

    /// Directory to write tiers and manifest.json into
    output: PathBuf,

    /// Fast iteration: lowest-effort encoding for both tiers
    #[arg(long)]
    dev: bool,

    /// Only process the first N images (requires --dev)
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Randomize image order
    #[arg(long)]
    shuffle: bool,

    /// Seed for --shuffle, for a reproducible order
    #[arg(long, value_name = "N", requires = "shuffle")]
    seed: Option<u64>,

    /// Copy originals into the output and offer them for download
    #[arg(long)]
    download: bool,

    /// Replace the contents of an existing output directory
    #[arg(long)]
    overwrite: bool,

    /// Page header, also used as the page title
    #[arg(long)]
    header: Option<String>,

    /// Page footer
    #[arg(long)]
    footer: Option<String>,

    /// Gap between photos in pixels
    #[arg(long, default_value_t = 4)]
    margin: u32,

    /// Emoji used as the page favicon
    #[arg(long, default_value = DEFAULT_FAVICON_EMOJI)]
    favicon_emoji: String,

    /// Config file (defaults to INPUT/config.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Encode gallery and lightbox tiers and write manifest.json
    Build(BuildArgs),
    /// List the images a build would process, in order
    Scan {
        /// Directory to read photos from
        input: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Build(args) => build(args)?,
        Command::Scan { input } => {
            let images = scan::discover_images(&input, None)?;
            output::print_scan_output(&images);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mode = RunMode::from_flags(args.dev, args.limit)?;
    let input = args
        .input
        .canonicalize()
        .map_err(|_| scan::ScanError::SourceNotFound(args.input.clone()))?;
    let output_dir = resolve_output_dir(&args.output)?;

    let gallery_config = match &args.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&input)?,
    };
    init_thread_pool(&gallery_config.processing);

    let mut process_config = ProcessConfig::from_config(&gallery_config, &mode);
    process_config.include_originals = args.download;
    if args.shuffle {
        process_config.order = Order::Shuffled { seed: args.seed };
    }

    let options = BuildOptions {
        process: process_config,
        overwrite: args.overwrite,
        page: PageSettings {
            title: args
                .header
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            header: args.header,
            footer: args.footer,
            margin: args.margin,
            favicon_emoji: args.favicon_emoji,
            download: args.download,
        },
        target_row_height: gallery_config.gallery.target_row_height,
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event);
        }
    });
    let result = process::build(&input, &output_dir, &options, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let manifest = result?;

    output::print_build_summary(&manifest, &output_dir.join(process::MANIFEST_FILE));
    Ok(())
}

/// Absolute output path, resolved through symlinks when it already exists,
/// so it compares correctly against the canonical input path.
fn resolve_output_dir(path: &Path) -> std::io::Result<PathBuf> {
    if path.exists() {
        path.canonicalize()
    } else {
        std::path::absolute(path)
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
