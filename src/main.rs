use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use snapbooth::assets;
use snapbooth::capture::{CaptureSource, WebcamCapture};
use snapbooth::compositor::{
    self, BackgroundFit, ForegroundFit, Label, OutputSize, PlacementPolicy, VerticalAnchor,
};
use snapbooth::error::BoothError;
use snapbooth::output::{spool_to_printer, PhotoWriter};
use snapbooth::segmentation::{self, ChromaKeyMatter, MatteScheduler, Preprocessor};
use snapbooth::session::BoothSession;
use std::path::PathBuf;
use std::time::Instant;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackgroundFitArg {
    Stretch,
    Cover,
    Contain,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SubjectFitArg {
    /// Scale so subject height is --subject-fraction of the canvas
    Height,
    /// Fit inside the canvas, shrunk to --subject-fraction
    Contain,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AnchorArg {
    Center,
    Bottom,
    Offset,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Capture resolution width hint
    #[arg(long, default_value_t = 1920)]
    capture_width: u32,

    /// Capture resolution height hint
    #[arg(long, default_value_t = 1080)]
    capture_height: u32,

    /// Background image the photo is composited onto
    #[arg(short, long)]
    background: PathBuf,

    /// Path to person segmentation model (ONNX file)
    /// If not provided, the full frame is composited without matting
    #[arg(long)]
    model: Option<String>,

    /// Key out a green screen instead of running a segmentation model
    #[arg(long, conflicts_with = "model")]
    green_screen: bool,

    /// Snap matte values to 0/1 around this confidence threshold
    #[arg(long)]
    matte_threshold: Option<f32>,

    /// Gaussian sigma used to feather matte edges (0 disables)
    #[arg(long, default_value_t = 2.0)]
    matte_feather: f32,

    /// Lift the captured frame's contrast and brightness before
    /// compositing
    #[arg(long)]
    enhance: bool,

    /// Output canvas width
    #[arg(long, default_value_t = 1920)]
    canvas_width: u32,

    /// Output canvas height
    #[arg(long, default_value_t = 1080)]
    canvas_height: u32,

    /// Size the canvas to the background image instead of a fixed size
    #[arg(long)]
    match_background: bool,

    /// How the background fills the canvas
    #[arg(long, value_enum, default_value_t = BackgroundFitArg::Cover)]
    background_fit: BackgroundFitArg,

    /// Fill fraction for the contain background fit
    #[arg(long, default_value_t = 1.0)]
    contain_fill: f32,

    /// How the subject is scaled onto the canvas
    #[arg(long, value_enum, default_value_t = SubjectFitArg::Contain)]
    subject_fit: SubjectFitArg,

    /// Subject size as a fraction of the canvas (0.33, 0.6, 0.9, ...)
    #[arg(long, default_value_t = 0.9)]
    subject_fraction: f32,

    /// Vertical subject placement
    #[arg(long, value_enum, default_value_t = AnchorArg::Center)]
    anchor: AnchorArg,

    /// Bottom inset in pixels for the bottom anchor
    #[arg(long, default_value_t = 20)]
    bottom_inset: u32,

    /// Top edge position as a fraction of canvas height for the offset
    /// anchor
    #[arg(long, default_value_t = 0.1)]
    offset_fraction: f32,

    /// Text drawn in the bottom-right corner (e.g. an event hashtag)
    #[arg(long, requires = "label_font")]
    label: Option<String>,

    /// TTF/OTF font used for the label
    #[arg(long)]
    label_font: Option<PathBuf>,

    /// Darken the edges with a radial vignette
    #[arg(long)]
    vignette: bool,

    /// Directory the photos are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Filename prefix for saved photos
    #[arg(long, default_value = "snapbooth")]
    prefix: String,

    /// Frames grabbed and discarded so auto-exposure can settle
    #[arg(long, default_value_t = 10)]
    warmup_frames: u32,

    /// Number of photos to take (each retake re-acquires the camera)
    #[arg(long, default_value_t = 1)]
    shots: u32,

    /// Spool each saved photo to the system printer
    #[arg(long)]
    print: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn placement_policy(&self) -> PlacementPolicy {
        let output_size = if self.match_background {
            OutputSize::MatchBackground
        } else {
            OutputSize::Fixed {
                width: self.canvas_width,
                height: self.canvas_height,
            }
        };

        let background_fit = match self.background_fit {
            BackgroundFitArg::Stretch => BackgroundFit::Stretch,
            BackgroundFitArg::Cover => BackgroundFit::Cover,
            BackgroundFitArg::Contain => BackgroundFit::Contain {
                fill: self.contain_fill,
            },
        };

        let foreground_fit = match self.subject_fit {
            SubjectFitArg::Height => ForegroundFit::FractionOfHeight(self.subject_fraction),
            SubjectFitArg::Contain => ForegroundFit::Contain(self.subject_fraction),
        };

        let anchor = match self.anchor {
            AnchorArg::Center => VerticalAnchor::Center,
            AnchorArg::Bottom => VerticalAnchor::Bottom {
                inset_px: self.bottom_inset,
            },
            AnchorArg::Offset => VerticalAnchor::OffsetFraction(self.offset_fraction),
        };

        let label = match (&self.label, &self.label_font) {
            (Some(text), Some(font)) => Some(Label::booth_default(text.clone(), font.clone())),
            _ => None,
        };

        PlacementPolicy {
            output_size,
            background_fit,
            foreground_fit,
            anchor,
            label,
            vignette: self.vignette,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("snapbooth starting");

    let background =
        assets::load_background(&args.background).context("Failed to load background image")?;

    // Blocking one-time model load. Failure only disables the matted
    // path; plain capture keeps working.
    let scheduler = if args.green_screen {
        tracing::info!("Green-screen keying enabled");
        Some(MatteScheduler::new(Box::new(ChromaKeyMatter::default())))
    } else {
        match &args.model {
            Some(model_path) => match segmentation::create_default_model(model_path) {
                Ok(model) => Some(MatteScheduler::new(model)),
                Err(e @ BoothError::SegmentationInit(_)) => {
                    tracing::warn!("{e}; continuing without segmentation");
                    None
                }
                Err(e) => return Err(e).context("Failed to set up segmentation"),
            },
            None => {
                tracing::info!("No model given, compositing full frames");
                None
            }
        }
    };

    let policy = args.placement_policy();
    let writer = PhotoWriter::new(&args.output_dir, &args.prefix);
    let opts = ShotOptions {
        matte_threshold: args.matte_threshold,
        matte_feather: args.matte_feather,
        enhance: args.enhance,
        warmup_frames: args.warmup_frames,
        print: args.print,
    };

    let device_index = args.input_device;
    let (width, height) = (args.capture_width, args.capture_height);
    let mut session =
        BoothSession::new(move || WebcamCapture::new(device_index, width, height));

    session.start().context("Failed to start camera")?;

    for shot in 1..=args.shots {
        take_photo(
            &mut session,
            &background,
            scheduler.as_ref(),
            &policy,
            &writer,
            &opts,
        )
        .with_context(|| format!("Shot {shot} failed"))?;

        if shot < args.shots {
            session.retake().context("Failed to re-acquire camera")?;
        }
    }

    session.release();
    Ok(())
}

/// Per-shot knobs that stay fixed across a session
struct ShotOptions {
    matte_threshold: Option<f32>,
    matte_feather: f32,
    enhance: bool,
    warmup_frames: u32,
    print: bool,
}

fn take_photo<C, F>(
    session: &mut BoothSession<C, F>,
    background: &image::RgbImage,
    scheduler: Option<&MatteScheduler>,
    policy: &PlacementPolicy,
    writer: &PhotoWriter,
    opts: &ShotOptions,
) -> Result<()>
where
    C: CaptureSource,
    F: FnMut() -> snapbooth::error::Result<C>,
{
    // Warm-up doubles as live preview for the segmentation worker:
    // frames go into the single-slot scheduler and are dropped when it
    // is still busy with an earlier one.
    match scheduler {
        Some(scheduler) => {
            for _ in 0..opts.warmup_frames {
                scheduler.submit(session.grab_frame()?);
            }
        }
        None => session.source_mut("warm up")?.warm_up(opts.warmup_frames)?,
    }

    let capture_start = Instant::now();
    let mut frame = session.grab_frame().context("Failed to capture frame")?;
    if opts.enhance {
        frame = compositor::enhance(&frame, 1.3, 10.0);
    }
    let capture_ms = capture_start.elapsed().as_secs_f64() * 1000.0;

    let segment_start = Instant::now();
    let matte = match scheduler {
        Some(scheduler) => {
            scheduler.submit(frame.clone());
            let mut matte = scheduler
                .wait_for_matte()
                .ok_or_else(|| anyhow!("segmentation produced no matte"))?;
            if let Some(threshold) = opts.matte_threshold {
                Preprocessor::binarize(&mut matte, threshold);
            }
            if opts.matte_feather > 0.0 {
                let (fw, fh) = frame.dimensions();
                matte = Preprocessor::feather(&matte, fw, fh, opts.matte_feather);
            }
            Some(matte)
        }
        None => None,
    };
    let segment_ms = segment_start.elapsed().as_secs_f64() * 1000.0;

    let compose_start = Instant::now();
    let composite = compositor::compose(background, &frame, matte.as_ref(), policy)
        .context("Failed to composite photo")?;
    let compose_ms = compose_start.elapsed().as_secs_f64() * 1000.0;

    session.store_composite(composite)?;
    let composite = session
        .composite()
        .ok_or_else(|| anyhow!("no composite after capture"))?;

    let path = writer.save(composite).context("Failed to save photo")?;
    if opts.print {
        spool_to_printer(&path).context("Failed to spool photo to printer")?;
    }

    tracing::info!(
        "Photo done: capture={capture_ms:.1}ms, segment={segment_ms:.1}ms, compose={compose_ms:.1}ms"
    );

    Ok(())
}
