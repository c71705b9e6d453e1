use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use facemark_core::annotation::domain::annotation_style::{AnnotationStyle, DEFAULT_THICKNESS};
use facemark_core::detection::domain::detection_params::{
    DetectionParams, DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR,
};
use facemark_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use facemark_core::pipeline::annotate_faces_use_case::AnnotateFacesUseCase;
use facemark_core::pipeline::image_width::image_width;
use facemark_core::shared::cascade_resolver;
use facemark_core::shared::constants::{FRONTAL_FACE_CASCADE_NAME, FRONTAL_FACE_CASCADE_URL};

/// Haar-cascade face detection for still images.
#[derive(Parser)]
#[command(name = "facemark", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Outline every detected face and write the annotated image.
    Detect(DetectArgs),
    /// Print the width of an image in pixels.
    Width {
        /// Image file to inspect.
        image: PathBuf,
    },
}

#[derive(clap::Args)]
struct DetectArgs {
    /// Input image file.
    input: PathBuf,

    /// Output image file; the format follows its extension.
    output: PathBuf,

    /// Cascade XML file. Defaults to the frontal-face cascade, downloaded
    /// into the user cache on first use.
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// Scale step between detection passes (must be greater than 1.0).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale_factor: f64,

    /// Overlapping candidates needed to keep a face (0 keeps every raw hit).
    #[arg(long, default_value_t = DEFAULT_MIN_NEIGHBORS)]
    min_neighbors: u32,

    /// Smallest face size to look for, in pixels.
    #[arg(long)]
    min_size: Option<u32>,

    /// Largest face size to look for, in pixels.
    #[arg(long)]
    max_size: Option<u32>,

    /// Outline thickness in pixels.
    #[arg(long, default_value_t = DEFAULT_THICKNESS)]
    thickness: i32,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Detect(args) => run_detect(args),
        Command::Width { image } => run_width(&image),
    }
}

fn run_detect(args: DetectArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate(&args)?;
    let cascade = match &args.cascade {
        Some(path) => path.clone(),
        None => resolve_default_cascade()?,
    };

    let use_case = AnnotateFacesUseCase::with_defaults(detection_params(&args), style(&args));
    match use_case.execute(&args.input, &cascade, &args.output) {
        Ok(faces) => {
            println!("Face detection succeeded: {faces} face(s)");
            log::info!("Output written to {}", args.output.display());
            Ok(())
        }
        Err(e) => {
            println!("Face detection failed");
            Err(e.into())
        }
    }
}

fn run_width(image: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let width = image_width(&ImageFileReader::new(), image)?;
    println!("{width}");
    Ok(())
}

fn resolve_default_cascade() -> Result<PathBuf, Box<dyn std::error::Error>> {
    log::info!("Resolving cascade: {FRONTAL_FACE_CASCADE_NAME}");
    let bundled = bundled_cascade_dir();
    let path = cascade_resolver::resolve(
        FRONTAL_FACE_CASCADE_NAME,
        FRONTAL_FACE_CASCADE_URL,
        bundled.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    Ok(path)
}

/// `cascades/` next to the executable, for packaged installs.
fn bundled_cascade_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("cascades"))
}

fn detection_params(args: &DetectArgs) -> DetectionParams {
    DetectionParams {
        scale_factor: args.scale_factor,
        min_neighbors: args.min_neighbors,
        min_size: args.min_size.map(|s| (s, s)),
        max_size: args.max_size.map(|s| (s, s)),
    }
}

fn style(args: &DetectArgs) -> AnnotationStyle {
    AnnotationStyle {
        thickness: args.thickness,
        ..Default::default()
    }
}

fn validate(args: &DetectArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.input.exists() {
        return Err(format!("Input file not found: {}", args.input.display()).into());
    }
    if let Some(cascade) = &args.cascade {
        if !cascade.exists() {
            return Err(format!("Cascade file not found: {}", cascade.display()).into());
        }
    }
    if !(args.scale_factor > 1.0) {
        return Err(format!(
            "Scale factor must be greater than 1.0, got {}",
            args.scale_factor
        )
        .into());
    }
    if args.thickness < 1 {
        return Err(format!("Thickness must be at least 1, got {}", args.thickness).into());
    }
    if let (Some(min), Some(max)) = (args.min_size, args.max_size) {
        if min > max {
            return Err(format!("Min size {min} exceeds max size {max}").into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face cascade... {pct}%");
    } else {
        eprint!("\rDownloading face cascade... {downloaded} bytes");
    }
}
