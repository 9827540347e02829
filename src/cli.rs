use crate::config::{Config, load_config};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::{contains_dependency_markers, parse_cohorts, split_sentences};
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::text_metrics::{HeuristicMeasurer, SystemFontMeasurer, TextMeasurer};
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "dep2svg",
    version,
    about = "Draw dependency arcs for annotated cohort text as SVG"
)]
pub struct Args {
    /// Input file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Fallback raster width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Fallback raster height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Render every blank-line separated sentence into its own file
    #[arg(long = "sentences")]
    pub sentences: bool,

    /// Measure text with the built-in width table instead of installed fonts
    #[arg(long = "fast-text")]
    pub fast_text: bool,

    /// Write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Fail when the input carries no dependency markers
    #[arg(long = "require-deps")]
    pub require_deps: bool,

    /// More log output (repeat for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

pub fn run() -> Result<()> {
    run_with_args(Args::parse())
}

fn run_with_args(args: Args) -> Result<()> {
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    if args.require_deps && !contains_dependency_markers(&input) {
        return Err(anyhow::anyhow!("No dependency markers found in input"));
    }

    let measurer: &dyn TextMeasurer = if args.fast_text {
        &HeuristicMeasurer
    } else {
        &SystemFontMeasurer
    };

    if !args.sentences {
        let output = match args.output_format {
            OutputFormat::Svg => args.output.clone(),
            OutputFormat::Png => Some(ensure_output(&args.output, "png")?),
        };
        return render_one(
            &input,
            measurer,
            &config,
            args.output_format,
            output.as_deref(),
            args.dump_layout.as_deref(),
        );
    }

    let sentences = split_sentences(&input);
    if sentences.is_empty() {
        return Err(anyhow::anyhow!("No sentences found in input"));
    }
    let outputs = resolve_multi_outputs(
        args.output.as_deref(),
        args.output_format.extension(),
        sentences.len(),
    )?;
    let dumps = match args.dump_layout.as_deref() {
        Some(base) => Some(resolve_multi_outputs(Some(base), "json", sentences.len())?),
        None => None,
    };
    for (idx, sentence) in sentences.iter().enumerate() {
        let dump = dumps.as_ref().map(|paths| paths[idx].as_path());
        render_one(
            sentence,
            measurer,
            &config,
            args.output_format,
            Some(&outputs[idx]),
            dump,
        )?;
    }
    info!(count = sentences.len(), "rendered sentences");
    Ok(())
}

fn render_one(
    text: &str,
    measurer: &dyn TextMeasurer,
    config: &Config,
    format: OutputFormat,
    output: Option<&Path>,
    dump: Option<&Path>,
) -> Result<()> {
    let parsed = parse_cohorts(text);
    let layout = compute_layout(&parsed, measurer, &config.theme, &config.layout)?;
    if let Some(path) = dump {
        write_layout_dump(path, &layout, &parsed)?;
    }
    let svg = render_svg(&layout, &config.theme, config.layout.corner_radius);
    match (format, output) {
        (OutputFormat::Svg, output) => write_output_svg(&svg, output),
        (OutputFormat::Png, Some(path)) => {
            write_output_png(&svg, path, &config.render, &config.theme)
        }
        (OutputFormat::Png, None) => Err(anyhow::anyhow!("Output path required for png output")),
    }
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(output: Option<&Path>, ext: &str, count: usize) -> Result<Vec<PathBuf>> {
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for per-sentence output"))?;
    if base.is_dir() {
        return Ok((0..count)
            .map(|idx| base.join(format!("sentence-{}.{}", idx + 1, ext)))
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("sentence");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok((0..count)
        .map(|idx| parent.join(format!("{}-{}.{}", stem, idx + 1, ext)))
        .collect())
}
