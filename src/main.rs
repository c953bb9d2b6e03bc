use clap::Parser;
use gdal::version::VersionInfo;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use s52chart::config::DEFAULT_SCHEME;
use s52chart::export::{self, ChartExport, ChartSummary};
use s52chart::s57::{self, S57Source};
use s52chart::{Catalog, DisplaySettings, S52Chart, util};

/// Initialize GDAL with S-57 specific options
fn init_gdal() -> Result<(), gdal::errors::GdalError> {
    // ADD_SOUNDG_DEPTH=ON - automatically adds depth from Z coordinates as DEPTH field
    // SPLIT_MULTIPOINT=ON - splits multipoint soundings into individual points
    // See: https://gdal.org/drivers/vector/s57.html
    gdal::config::set_config_option(
        "OGR_S57_OPTIONS",
        "RETURN_PRIMITIVES=OFF,RETURN_LINKAGES=OFF,LNAM_REFS=ON,UPDATES=APPLY,SPLIT_MULTIPOINT=ON,RECODE_BY_DSSI=ON,ADD_SOUNDG_DEPTH=ON",
    )?;

    // ONLY_CCW: clockwise = outer ring, counter-clockwise = holes. S-57 rings
    // follow this orientation, and full organisation is slow on large cells.
    gdal::config::set_config_option("OGR_ORGANIZE_POLYGONS", "ONLY_CCW")
}

#[derive(Parser, Debug)]
struct Args {
    /// Root directory holding one subdirectory per ENC cell
    #[arg(long)]
    input_dir: PathBuf,

    /// Presentation library JSON; falls back to S52_CATALOG
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory for the per-cell JSON output
    #[arg(long, default_value = "layers")]
    output_dir: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, default_value_t = 2.0)]
    shallow_depth: f64,

    #[arg(long, default_value_t = 30.0)]
    safety_depth: f64,

    #[arg(long, default_value_t = 30.0)]
    deep_depth: f64,

    /// Color scheme to export the palette for
    #[arg(long, default_value = DEFAULT_SCHEME)]
    scheme: String,

    #[arg(long, default_value_t = false)]
    two_shades: bool,

    #[arg(long, default_value_t = false)]
    shallow_pattern: bool,

    /// Use plain instead of symbolized area boundaries
    #[arg(long, default_value_t = false)]
    plain_boundaries: bool,

    /// Use simplified instead of paper chart point symbols
    #[arg(long, default_value_t = false)]
    simplified_points: bool,

    #[arg(long, default_value_t = false)]
    full_light_sectors: bool,

    #[arg(long, default_value_t = false)]
    isolated_dangers_in_shallow: bool,

    #[arg(long, default_value_t = false)]
    no_light_descriptions: bool,

    /// Write the full layer buffers, not only the summary
    #[arg(long, default_value_t = false)]
    full: bool,

    /// Number of ENC cells to process in parallel
    #[arg(long, default_value_t = 4)]
    parallel_charts: usize,
}

impl Args {
    fn settings(&self) -> DisplaySettings {
        DisplaySettings {
            shallow_depth: self.shallow_depth,
            safety_depth: self.safety_depth,
            deep_depth: self.deep_depth,
            color_scheme: self.scheme.clone(),
            two_shades: self.two_shades,
            shallow_pattern: self.shallow_pattern,
            symbolized_boundaries: !self.plain_boundaries,
            simplified_points: self.simplified_points,
            full_light_sectors: self.full_light_sectors,
            isolated_dangers_in_shallow: self.isolated_dangers_in_shallow,
            light_descriptions: !self.no_light_descriptions,
        }
    }
}

/// Output options shared by every cell task.
struct Output {
    dir: PathBuf,
    full: bool,
    palette: Vec<[u8; 3]>,
}

/// Build and export the layers of a single S-57 file
fn process_s57_file(
    s57_path: &Path,
    catalog: &Catalog,
    settings: &DisplaySettings,
    output: &Output,
) -> Result<usize, Box<dyn std::error::Error>> {
    let enc_name = util::enc_name_from_path(s57_path);
    info!(
        "Processing S-57 file: {} ({})",
        s57_path.display(),
        enc_name
    );

    let mut source = S57Source::open(s57_path)?;
    let metadata = source.metadata();
    debug!(
        "S-57 metadata: edition={:?}, update={}, compilation_scale={}",
        metadata.edition, metadata.update_number, metadata.compilation_scale
    );
    let mut chart = S52Chart::new(catalog, settings.clone());
    let layers = chart.load(&mut source)?;

    let summary = ChartSummary::new(&enc_name, layers);
    export::write_json(&output.dir, &enc_name, "summary", &summary)?;
    if output.full {
        let full = ChartExport::new(&enc_name, layers, &output.palette);
        export::write_json(&output.dir, &enc_name, "layers", &full)?;
    }

    let total = summary.feature_total();
    info!(
        "Completed {}: {} groups, {} features",
        enc_name,
        summary.groups.len(),
        total
    );
    Ok(total)
}

/// Process an ENC directory containing S-57 base file and updates
fn process_enc_directory(
    enc_dir: &Path,
    catalog: &Catalog,
    settings: &DisplaySettings,
    output: &Output,
) {
    debug!("Scanning ENC directory: {:?}", enc_dir);

    let s57_files = s57::find_s57_files(enc_dir);
    if s57_files.is_empty() {
        warn!("No S-57 files found in {:?}", enc_dir);
        return;
    }

    for s57_path in s57_files {
        match process_s57_file(&s57_path, catalog, settings, output) {
            Ok(count) => {
                debug!("Processed {} with {} features", s57_path.display(), count);
            }
            Err(e) => {
                error!("Failed to process {:?}: {}", s57_path, e);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    if let Err(e) = init_gdal() {
        error!("Failed to configure GDAL S-57 driver: {}", e);
        std::process::exit(1);
    }

    let Some(catalog_path) = args
        .catalog
        .clone()
        .or_else(|| env::var("S52_CATALOG").ok().map(PathBuf::from))
    else {
        error!("No presentation library given: pass --catalog or set S52_CATALOG");
        std::process::exit(2);
    };

    info!("GDAL version: {}", VersionInfo::version_summary());
    info!("Input directory: {:?}", args.input_dir);

    let catalog = match Catalog::load(&catalog_path) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            error!("Failed to load presentation library {:?}: {}", catalog_path, e);
            std::process::exit(1);
        }
    };

    let settings = args.settings();
    if let Err(e) = settings.validate(&catalog) {
        error!("Invalid display settings: {}", e);
        std::process::exit(2);
    }
    let palette = match catalog.palette(&settings.color_scheme) {
        Ok(palette) => palette,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    let output = Arc::new(Output {
        dir: args.output_dir.clone(),
        full: args.full,
        palette,
    });
    let settings = Arc::new(settings);

    let enc_paths = s57::find_enc_directories(&args.input_dir);
    info!("Found {} ENC directories", enc_paths.len());

    let pb = Arc::new(ProgressBar::new(enc_paths.len() as u64));
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb.set_message("Processing ENCs");

    info!("Processing ENCs with parallelism={}", args.parallel_charts);
    let semaphore = Arc::new(Semaphore::new(args.parallel_charts.max(1)));
    let mut tasks = Vec::new();

    for enc_dir in enc_paths {
        // Acquire before spawning so at most `parallel_charts` blocking
        // threads hold a GDAL dataset at once.
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("Semaphore closed: {}", e);
                break;
            }
        };
        let catalog = Arc::clone(&catalog);
        let settings = Arc::clone(&settings);
        let output = Arc::clone(&output);
        let pb = Arc::clone(&pb);

        // Use spawn_blocking since GDAL Dataset is not Send
        tasks.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            process_enc_directory(&enc_dir, &catalog, &settings, &output);
            pb.inc(1);
        }));
    }

    for task in tasks {
        if let Err(e) = task.await {
            error!("ENC task panicked: {}", e);
        }
    }

    pb.finish_with_message("Done processing ENCs");
}
