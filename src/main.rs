use clap::{Parser, Subcommand};
use gallery_core::imaging::RustCodec;
use gallery_core::index::GalleryIndex;
use gallery_core::resolve::{ImageLoadError, ImageResolver};
use gallery_core::settings::SettingsStore;
use gallery_core::types::{GalleryItem, GalleryViewType};
use gallery_core::{config, output, scan};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gallery")]
#[command(about = "Browse photo folders and timelines, and manage the thumbnail cache")]
#[command(long_about = "\
Browse photo folders and timelines, and manage the thumbnail cache

Two views of a photo library:

  folder     Immediate children of a directory: subfolders and images
  timeline   Every image under a root, newest first, grouped by month

Images: jpg, jpeg, png, bmp, webp, ico, gif (any case).

Thumbnails are cached in the per-user data directory and reused across runs.
Run 'gallery warm <root>' to fill the cache ahead of time.

Run 'gallery gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (default: per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log cache and index activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a directory as the folder view shows it
    Folder {
        /// Directory to list (default: the last one used)
        dir: Option<PathBuf>,
    },
    /// List every photo under a root by month, with grid rows
    Timeline {
        /// Library root (default: the last one used)
        root: Option<PathBuf>,
        /// Viewport width used to compute the column count
        #[arg(long, default_value_t = 800.0)]
        width: f32,
    },
    /// Generate thumbnails for every photo under a root
    Warm {
        /// Library root (default: the last one used)
        root: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let load_config = || config::load_config_or_default(cli.config.as_deref());

    match cli.command {
        Command::Folder { dir } => {
            let mut settings = load_settings();
            let dir = resolve_dir(dir, settings.as_ref())?;
            let items = scan::build_folder_view(&dir)?;
            remember(&mut settings, &dir, GalleryViewType::Folders);
            output::print_folder_view(&dir, &items);
        }
        Command::Timeline { root, width } => {
            let config = load_config()?;
            let mut settings = load_settings();
            let root = resolve_dir(root, settings.as_ref())?;
            let items = scan::load_view(
                GalleryViewType::All,
                &root,
                &root,
                config.scan.timestamp,
            )?;
            remember(&mut settings, &root, GalleryViewType::All);

            let mut gallery = GalleryIndex::new(config.grid.cell_size);
            gallery.set_width(width);
            let snapshot = gallery.set_items(items);
            output::print_timeline(
                &root,
                &snapshot.items,
                &snapshot.dividers,
                snapshot.columns,
                snapshot.mapper().total_rows(),
            );
        }
        Command::Warm { root } => {
            let config = load_config()?;
            let settings = load_settings();
            let root = resolve_dir(root, settings.as_ref())?;
            init_thread_pool(&config.processing);
            let items = scan::build_date_view(&root, config.scan.timestamp)?;
            let resolver = ImageResolver::from_config(Arc::new(RustCodec::new()), &config.cache)?;
            if resolver.disk().is_none() {
                tracing::warn!("disk cache disabled; thumbnails will not persist");
            }

            let photos: Vec<&Path> = items
                .iter()
                .filter(|item| item.is_photo())
                .filter_map(GalleryItem::path)
                .collect();
            let failures: Vec<ImageLoadError> = photos
                .par_iter()
                .filter_map(|path| resolver.resolve_preview(path).err())
                .collect();
            output::print_warm_summary(&root, &resolver.stats(), &failures);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn load_settings() -> Option<SettingsStore> {
    match SettingsStore::load_default() {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::warn!(error = %err, "settings unavailable");
            None
        }
    }
}

/// Explicit argument, else the last directory used.
fn resolve_dir(
    arg: Option<PathBuf>,
    settings: Option<&SettingsStore>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    arg.or_else(|| settings.and_then(|s| s.directory()).map(Path::to_path_buf))
        .ok_or_else(|| "no directory given and none remembered from a previous run".into())
}

fn remember(settings: &mut Option<SettingsStore>, dir: &Path, view_type: GalleryViewType) {
    let Some(store) = settings.as_mut() else {
        return;
    };
    let result = store
        .set_directory(Some(dir))
        .and_then(|_| store.set_view_type(view_type));
    if let Err(err) = result {
        tracing::warn!(error = %err, "could not save settings");
    }
}
