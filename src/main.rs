use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use depthviz::capture::{CaptureSource, ImageFile};
use depthviz::classification::{top_k, DEFAULT_TOP_K};
use depthviz::inference::{
    InferenceBackend, ModelOutput, ModelPreset, OutputKind, RawLayout, ReplayBackend,
};
use depthviz::output::{OutputSink, PngOutput};
use depthviz::pipeline::ProcessingContext;
use depthviz::segmentation::{
    class_histogram, overlay, ClassLabels, SemanticPalette, DEFAULT_MASK_OPACITY,
};
use depthviz::PixelFormat;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a depth image output as grayscale at the photo's resolution
    Depth(DepthArgs),
    /// Render a depth-in-meters output as a banded heatmap
    Meters(MetersArgs),
    /// Render a class map and blend it over the photo
    Segment(SegmentArgs),
    /// Print the most probable classes
    Classify(ClassifyArgs),
}

#[derive(ClapArgs, Debug)]
struct ModelArgs {
    /// The input image file
    #[arg(short, long)]
    input: PathBuf,

    /// Raw model output captured from the runtime (little-endian, tightly packed)
    #[arg(short, long)]
    raw: PathBuf,

    /// Model output width (defaults to the model input width)
    #[arg(long)]
    raw_width: Option<u32>,

    /// Model output height (defaults to the model input height)
    #[arg(long)]
    raw_height: Option<u32>,

    /// Model input width (overrides the preset)
    #[arg(long)]
    model_width: Option<u32>,

    /// Model input height (overrides the preset)
    #[arg(long)]
    model_height: Option<u32>,

    /// Output feature stored in the raw file (defaults to the preset's)
    #[arg(long)]
    feature: Option<String>,
}

impl ModelArgs {
    fn model_size(&self, preset: ModelPreset) -> (u32, u32) {
        let (width, height) = preset.input_size();
        (
            self.model_width.unwrap_or(width),
            self.model_height.unwrap_or(height),
        )
    }

    fn feature(&self, preset: ModelPreset) -> &str {
        self.feature.as_deref().unwrap_or(preset.output_feature())
    }

    fn raw_size(&self, default: (u32, u32)) -> (u32, u32) {
        (
            self.raw_width.unwrap_or(default.0),
            self.raw_height.unwrap_or(default.1),
        )
    }
}

#[derive(ClapArgs, Debug)]
struct DepthArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// The output PNG file
    #[arg(short, long)]
    output: PathBuf,

    /// Model the output came from
    #[arg(long, value_enum, default_value_t = ModelPreset::DepthPro)]
    preset: ModelPreset,

    /// Element format of the raw output (defaults to the preset's)
    #[arg(long, value_enum)]
    format: Option<RawFormat>,

    /// Do not divide the output by 255 before display
    #[arg(long)]
    skip_normalize: bool,

    /// Resize filter for the input photo
    #[arg(long, value_enum, default_value_t = ResizeFilter::Bilinear)]
    filter: ResizeFilter,
}

#[derive(ClapArgs, Debug)]
struct MetersArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// The output PNG file
    #[arg(short, long)]
    output: PathBuf,

    /// Model the output came from
    #[arg(long, value_enum, default_value_t = ModelPreset::DepthPro)]
    preset: ModelPreset,

    /// Resize filter for the input photo
    #[arg(long, value_enum, default_value_t = ResizeFilter::Bilinear)]
    filter: ResizeFilter,
}

#[derive(ClapArgs, Debug)]
struct SegmentArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// The output PNG file, showing the segmentation map overlaid on the photo
    #[arg(short, long)]
    output: PathBuf,

    /// Also write the bare segmentation mask to this file
    #[arg(short = 'k', long)]
    mask: Option<PathBuf>,

    /// JSON class list, `{"labels": [...]}`
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Number of classes (defaults to the label count)
    #[arg(long)]
    num_classes: Option<usize>,

    /// Mask opacity when blended over the photo
    #[arg(long, default_value_t = DEFAULT_MASK_OPACITY)]
    opacity: f32,

    /// Model the output came from
    #[arg(long, value_enum, default_value_t = ModelPreset::DetrSegmentation)]
    preset: ModelPreset,
}

#[derive(ClapArgs, Debug)]
struct ClassifyArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// JSON class list, `{"labels": [...]}`
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Number of classes (defaults to the label count)
    #[arg(long)]
    num_classes: Option<usize>,

    /// How many predictions to print
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Model the output came from
    #[arg(long, value_enum, default_value_t = ModelPreset::FastVit)]
    preset: ModelPreset,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RawFormat {
    Half16,
    Float32,
}

impl From<RawFormat> for PixelFormat {
    fn from(format: RawFormat) -> Self {
        match format {
            RawFormat::Half16 => PixelFormat::Half16,
            RawFormat::Float32 => PixelFormat::Float32,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResizeFilter {
    Nearest,
    Bilinear,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match args.command {
        Command::Depth(args) => run_depth(args),
        Command::Meters(args) => run_meters(args),
        Command::Segment(args) => run_segment(args),
        Command::Classify(args) => run_classify(args),
    }
}

/// Photo, context and model output for one image
struct Frame {
    photo: RgbImage,
    context: ProcessingContext,
    output: ModelOutput,
}

fn run_model(
    args: &ModelArgs,
    preset: ModelPreset,
    format: PixelFormat,
    kind: OutputKind,
    raw_size: (u32, u32),
    filter: FilterType,
) -> Result<Frame> {
    let photo = ImageFile::new(&args.input).capture_frame()?;

    let (model_width, model_height) = args.model_size(preset);
    let context = ProcessingContext::new(model_width, model_height, format)
        .context("Invalid model input size")?
        .with_filter(filter);
    tracing::info!("Model input: {}x{} ({:?})", model_width, model_height, preset);

    let input = context
        .prepare_input(&photo)
        .context("Failed to resize input image")?;

    let layout = RawLayout {
        width: raw_size.0,
        height: raw_size.1,
        kind,
    };
    let mut backend =
        ReplayBackend::new(&args.raw, args.feature(preset), layout, context.input_size());

    let start = Instant::now();
    let output = infer(&mut backend, &input, preset.output_feature())?;
    tracing::info!(
        "Model inference took {:.1}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(Frame {
        photo,
        context,
        output,
    })
}

fn infer(backend: &mut dyn InferenceBackend, input: &RgbImage, feature: &str) -> Result<ModelOutput> {
    let output = backend.infer(input).context("Failed to run inference")?;
    output.expect_feature(feature)?;
    Ok(output)
}

fn run_depth(args: DepthArgs) -> Result<()> {
    let format = args
        .format
        .map(PixelFormat::from)
        .or_else(|| args.preset.output_format())
        .with_context(|| format!("{:?} does not output a depth image, pass --format", args.preset))?;
    let raw_size = args.model.raw_size(args.model.model_size(args.preset));
    let frame = run_model(
        &args.model,
        args.preset,
        format,
        OutputKind::Image(format),
        raw_size,
        args.filter.into(),
    )?;

    let buffer = frame.output.into_image()?;
    let original = frame.photo.dimensions();
    let depth = if args.preset.normalizes_output() && !args.skip_normalize {
        frame.context.normalized_inverse_depth(&buffer, original)
    } else {
        frame.context.relative_depth(&buffer, original)
    }
    .context("Failed to post-process depth output")?;

    PngOutput::new(&args.output).write_image(&DynamicImage::ImageLuma8(depth))
}

fn run_meters(args: MetersArgs) -> Result<()> {
    let raw_size = args.model.raw_size(args.model.model_size(args.preset));
    let frame = run_model(
        &args.model,
        args.preset,
        PixelFormat::Float32,
        OutputKind::DepthMeters,
        raw_size,
        args.filter.into(),
    )?;

    let tensor = frame.output.into_depth_meters()?;
    let heatmap = frame
        .context
        .metric_depth(&tensor, frame.photo.dimensions())
        .context("Failed to colorize depth output")?;

    PngOutput::new(&args.output).write_image(&DynamicImage::ImageRgb8(heatmap))
}

fn load_labels(path: Option<&PathBuf>) -> Result<Option<ClassLabels>> {
    path.map(|p| {
        ClassLabels::from_file(p).with_context(|| format!("Failed to read labels from {}", p.display()))
    })
    .transpose()
}

fn class_count(explicit: Option<usize>, labels: Option<&ClassLabels>) -> Result<usize> {
    explicit
        .or_else(|| labels.map(ClassLabels::num_classes))
        .context("Pass --labels or --num-classes")
}

fn run_segment(args: SegmentArgs) -> Result<()> {
    let labels = load_labels(args.labels.as_ref())?;
    let num_classes = class_count(args.num_classes, labels.as_ref())?;

    let raw_size = args.model.raw_size(args.model.model_size(args.preset));
    let frame = run_model(
        &args.model,
        args.preset,
        PixelFormat::Float32,
        OutputKind::ClassMap,
        raw_size,
        FilterType::Triangle,
    )?;

    let class_map = frame.output.into_class_map()?;
    for (id, pixels) in class_histogram(class_map.view()) {
        let name = labels
            .as_ref()
            .and_then(|l| l.label(id))
            .unwrap_or("unlabeled");
        tracing::info!("Class {} ({}): {} px", id, name, pixels);
    }

    let palette = SemanticPalette::new(num_classes);
    let mask = frame
        .context
        .semantic_mask(&class_map, &palette, frame.photo.dimensions())
        .context("Failed to render segmentation mask")?;

    if let Some(mask_path) = &args.mask {
        PngOutput::new(mask_path).write_image(&DynamicImage::ImageRgba8(mask.clone()))?;
    }

    let blended = overlay(&mask, &frame.photo, args.opacity).context("Failed to blend mask")?;
    PngOutput::new(&args.output).write_image(&DynamicImage::ImageRgb8(blended))
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    let labels = load_labels(args.labels.as_ref())?;
    let num_classes = class_count(args.num_classes, labels.as_ref())?;
    let width = u32::try_from(num_classes).context("Too many classes")?;

    let frame = run_model(
        &args.model,
        args.preset,
        PixelFormat::Float32,
        OutputKind::Probabilities,
        args.model.raw_size((width, 1)),
        FilterType::Triangle,
    )?;

    let probabilities = frame.output.into_probabilities()?;
    let names = labels.map(|l| l.to_vec()).unwrap_or_default();
    let probabilities = probabilities.to_vec();
    for prediction in top_k(&probabilities, &names, args.top_k) {
        println!("{}", prediction);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthviz::inference::InferenceError;
    use std::fs;
    use tempfile::tempdir;

    fn depth_args(extra: &[&str]) -> DepthArgs {
        let mut argv = vec!["depthviz", "depth", "-i", "photo.png", "-r", "out.bin", "-o", "depth.png"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Depth(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn replay(dir: &std::path::Path, label: &str) -> ReplayBackend {
        let raw = dir.join("out.bin");
        fs::write(&raw, 0.5f32.to_le_bytes()).unwrap();
        let layout = RawLayout {
            width: 1,
            height: 1,
            kind: OutputKind::Probabilities,
        };
        ReplayBackend::new(raw, label, layout, (1, 1))
    }

    #[test]
    fn feature_defaults_to_preset() {
        let args = depth_args(&[]);
        assert_eq!(args.model.feature(args.preset), "normalized_inverse_depth");

        let args = depth_args(&["--feature", "var_1"]);
        assert_eq!(args.model.feature(args.preset), "var_1");
    }

    #[test]
    fn infer_rejects_output_with_other_feature() {
        let dir = tempdir().unwrap();
        let args = depth_args(&["--feature", "var_1"]);
        let mut backend = replay(dir.path(), args.model.feature(args.preset));
        let input = RgbImage::new(1, 1);

        let err = infer(&mut backend, &input, args.preset.output_feature()).unwrap_err();
        match err.downcast_ref::<InferenceError>() {
            Some(InferenceError::MissingFeature { expected, found }) => {
                assert_eq!(expected, "normalized_inverse_depth");
                assert_eq!(found, "var_1");
            }
            other => panic!("expected MissingFeature, got {other:?}"),
        }
    }

    #[test]
    fn infer_accepts_matching_feature() {
        let dir = tempdir().unwrap();
        let mut backend = replay(dir.path(), "classLabel_probs");
        let output = infer(&mut backend, &RgbImage::new(1, 1), "classLabel_probs").unwrap();
        assert_eq!(output.into_probabilities().unwrap().to_vec(), vec![0.5]);
    }

    #[test]
    fn depth_needs_format_for_non_image_preset() {
        let args = depth_args(&["--preset", "fast-vit"]);
        let err = run_depth(args).unwrap_err();
        assert!(err.to_string().contains("--format"));
    }
}
