//! CLI for virtual try-on frame placement.
//!
//! Usage:
//!   vto-fit place capture.json --container 320x240 --natural 640x480 --dimensions 52-18-145
//!   vto-fit place capture.json --container 320x240 --photo face.png \
//!       --frame sku.png --render out.png
//!   vto-fit match catalog.json --face-width 136
//!   vto-fit session --store .vto show

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vto_fit::{
    composite::BACKGROUND, frames_for_face_width, parse_dimensions, place_frame, CaptureSession,
    CapturedData, FileStore, FrameAssetResolver, FrameDimensions, Placement, Product, Size,
    VtoCalibration, DEFAULT_FRAME_ASSET_BASE,
};

#[derive(Parser, Debug)]
#[command(name = "vto-fit")]
#[command(author, version, about = "Virtual try-on frame placement", long_about = None)]
struct Args {
    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute frame placement for a captured face
    Place(PlaceArgs),

    /// List catalog frames whose width suits a face width
    Match(MatchArgs),

    /// Inspect or modify a file-backed capture session
    Session(SessionArgs),
}

#[derive(clap::Args, Debug)]
struct PlaceArgs {
    /// Capture record (JSON)
    #[arg(required = true)]
    capture: PathBuf,

    /// Display container size, WIDTHxHEIGHT
    #[arg(long)]
    container: Size,

    /// Intrinsic photo size, WIDTHxHEIGHT (read from --photo if omitted)
    #[arg(long)]
    natural: Option<Size>,

    /// Captured photo file
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Product dimension string, e.g. 52-18-145
    #[arg(long)]
    dimensions: Option<String>,

    /// Product SKU, used to print the frame asset URL
    #[arg(long)]
    sku: Option<String>,

    /// Frame asset URL base
    #[arg(long, default_value = DEFAULT_FRAME_ASSET_BASE)]
    asset_base: String,

    /// Calibration overrides (JSON)
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Write the composited image here (needs --photo)
    #[arg(long, requires = "photo")]
    render: Option<PathBuf>,

    /// Frame overlay asset to composite
    #[arg(long, requires = "render")]
    frame: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct MatchArgs {
    /// Catalog products (JSON array)
    #[arg(required = true)]
    catalog: PathBuf,

    /// Face width in millimeters
    #[arg(long)]
    face_width: f32,

    /// Allowed difference between frame and face width (mm)
    #[arg(long, default_value = "8")]
    tolerance: f32,

    /// Maximum number of frames to list
    #[arg(long, default_value = "6")]
    limit: usize,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct SessionArgs {
    /// Session store directory
    #[arg(long, default_value = ".vto-session")]
    store: PathBuf,

    #[command(subcommand)]
    action: SessionAction,
}

#[derive(Subcommand, Debug)]
enum SessionAction {
    /// Print the stored capture
    Show,
    /// Store a capture record (JSON file)
    Save { capture: PathBuf },
    /// Remove the stored capture
    Clear,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct PlaceOutput {
    container: Size,
    natural: Size,
    frame: FrameDimensions,
    left: String,
    top: String,
    transform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_url: Option<String>,
    placement: Placement,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    match &args.command {
        Command::Place(place) => run_place(place),
        Command::Match(m) => run_match(m),
        Command::Session(session) => run_session(session),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<T, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&text)?)
}

fn run_place(args: &PlaceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let calibration = match &args.calibration {
        Some(path) => VtoCalibration::load(path)?,
        None => VtoCalibration::default(),
    };
    let capture: CapturedData = read_json(&args.capture)?;

    let photo = match &args.photo {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading photo");
            Some(image::open(path)?.to_rgba8())
        }
        None => None,
    };
    let natural = args
        .natural
        .or_else(|| photo.as_ref().map(|p| Size::from(p.dimensions())))
        .ok_or("Either --natural or --photo is required")?;

    let placement = place_frame(
        &capture,
        args.dimensions.as_deref(),
        natural,
        args.container,
        &calibration,
    );
    let frame_url = args
        .sku
        .as_deref()
        .map(|sku| FrameAssetResolver::new(args.asset_base.as_str()).frame_url(sku));

    let output = PlaceOutput {
        container: args.container,
        natural,
        frame: parse_dimensions(args.dimensions.as_deref()),
        left: placement.left(),
        top: placement.top(),
        transform: placement.transform(),
        frame_url,
        placement,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_placement(&output));
    }

    if let (Some(out), Some(photo)) = (&args.render, &photo) {
        let frame = match &args.frame {
            Some(path) => match image::open(path) {
                Ok(img) => Some(img.to_rgba8()),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "frame asset failed to load, rendering photo only"
                    );
                    None
                }
            },
            None => None,
        };
        let rendered = vto_fit::composite(
            photo,
            frame.as_ref(),
            args.container,
            &placement,
            BACKGROUND,
        )?;
        rendered.save(out)?;
        tracing::info!(path = %out.display(), "composite written");
    }

    Ok(())
}

fn format_placement(output: &PlaceOutput) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Photo {}x{} in container {}x{}\n",
        output.natural.width,
        output.natural.height,
        output.container.width,
        output.container.height
    ));
    s.push_str(&format!(
        "Frame: {}mm wide (bridge {}mm, temple {}mm)\n",
        output.frame.width, output.frame.bridge, output.frame.temple
    ));
    if let Some(url) = &output.frame_url {
        s.push_str(&format!("Asset: {}\n", url));
    }

    s.push_str("\nPlacement:\n");
    s.push_str(&format!("  left:      {}\n", output.left));
    s.push_str(&format!("  top:       {}\n", output.top));
    s.push_str(&format!("  transform: {}\n", output.transform));

    match &output.placement.estimate {
        Some(est) => {
            s.push_str("\nScale:\n");
            s.push_str(&format!(
                "  Face width:   {:.1}px / {:.1}mm\n",
                est.face_width_px, est.face_width_mm
            ));
            s.push_str(&format!("  mm per pixel: {:.4}\n", est.mm_per_pixel));
            s.push_str(&format!("  Frame width:  {:.1}px\n", est.desired_frame_width_px));
            let note = if est.scale != est.raw_scale { " (clamped)" } else { "" };
            s.push_str(&format!("  Scale:        {:.3}{}\n", est.scale, note));
        }
        None => s.push_str("\nDefault placement (landmarks or sizes unavailable)\n"),
    }

    s
}

#[derive(Serialize)]
struct MatchOutput<'a> {
    skuid: Option<&'a str>,
    name: &'a str,
    width_mm: f32,
}

fn run_match(args: &MatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let products: Vec<Product> = read_json(&args.catalog)?;
    let found = frames_for_face_width(&products, args.face_width, args.tolerance, args.limit);

    let rows: Vec<MatchOutput> = found
        .iter()
        .filter_map(|p| {
            Some(MatchOutput {
                skuid: p.frame_key(),
                name: &p.name,
                width_mm: p.frame_dimensions()?.width,
            })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} of {} frames within {}mm of {}mm:",
        rows.len(),
        products.len(),
        args.tolerance,
        args.face_width
    );
    for row in &rows {
        println!(
            "  {:<12} {:>6.1}mm  {}",
            row.skuid.unwrap_or("-"),
            row.width_mm,
            row.name
        );
    }
    Ok(())
}

fn run_session(args: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = CaptureSession::new(FileStore::open(&args.store)?);

    match &args.action {
        SessionAction::Show => match session.get() {
            Some(capture) => println!("{}", serde_json::to_string_pretty(&capture)?),
            None => println!("No capture session stored."),
        },
        SessionAction::Save { capture } => {
            let data: CapturedData = read_json(capture)?;
            if !session.save(&data) {
                return Err("Failed to save capture session".into());
            }
            println!("Capture session saved to {}", args.store.display());
        }
        SessionAction::Clear => {
            session.clear();
            println!("Capture session cleared.");
        }
    }
    Ok(())
}
