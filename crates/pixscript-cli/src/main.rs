use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pixscript_lang::EvalConfig;
use pixscript_renderer::mandelbrot::{self, MandelbrotParams, Viewport};
use pixscript_renderer::{Canvas, ImageFormat};

#[derive(Parser, Debug)]
#[command(name = "pixscript", version, about = "Run pixscript programs and render their canvas")]
struct Cli {
    #[command(flatten)]
    eval: EvalArgs,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a script and print what it prints.
    Run {
        script: PathBuf,
    },
    /// Run a script and write its canvas.
    Image {
        script: PathBuf,

        /// Output image path.
        #[arg(long)]
        out: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Pnm)]
        format: Format,
    },
    /// Render the Mandelbrot set without a script.
    Mandelbrot(MandelbrotArgs),
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Abort scripts after this many evaluation steps.
    #[arg(long, global = true, default_value_t = EvalConfig::DEFAULT_MAX_STEPS)]
    max_steps: u64,

    /// Canvas width used unless the script calls `size`.
    #[arg(long, global = true, default_value_t = pixscript_renderer::DEFAULT_WIDTH)]
    canvas_width: u32,

    /// Canvas height used unless the script calls `size`.
    #[arg(long, global = true, default_value_t = pixscript_renderer::DEFAULT_HEIGHT)]
    canvas_height: u32,
}

#[derive(Args, Debug)]
struct MandelbrotArgs {
    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1000)]
    width: u32,

    #[arg(long, default_value_t = 750)]
    height: u32,

    /// Real part of the view center. Defaults to the built-in view.
    #[arg(long, allow_hyphen_values = true)]
    center_re: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    center_im: Option<f64>,

    /// Width of the view on the real axis.
    #[arg(long)]
    span: Option<f64>,

    #[arg(long, default_value_t = 255)]
    iterations: usize,

    #[arg(long, value_enum, default_value_t = Format::Pnm)]
    format: Format,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Pnm,
    Png,
}

impl From<Format> for ImageFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Pnm => ImageFormat::Pnm,
            Format::Png => ImageFormat::Png,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = EvalConfig::default()
        .with_max_steps(cli.eval.max_steps)
        .with_canvas_size(cli.eval.canvas_width, cli.eval.canvas_height);

    match cli.cmd {
        Command::Run { script } => cmd_run(&script, &config),
        Command::Image { script, out, format } => cmd_image(&script, &out, format.into(), &config),
        Command::Mandelbrot(args) => cmd_mandelbrot(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_script(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read script '{}'", path.display()))
}

fn cmd_run(script: &Path, config: &EvalConfig) -> anyhow::Result<()> {
    let source = read_script(script)?;
    let outcome = pixscript_lang::run(&source, config)
        .with_context(|| format!("run '{}'", script.display()))?;
    std::io::stdout()
        .write_all(outcome.output.as_bytes())
        .context("write stdout")?;
    Ok(())
}

fn cmd_image(script: &Path, out: &Path, format: ImageFormat, config: &EvalConfig) -> anyhow::Result<()> {
    let source = read_script(script)?;
    let canvas = pixscript_lang::render(&source, config)
        .with_context(|| format!("run '{}'", script.display()))?;
    write_image(&canvas, out, format)
}

fn cmd_mandelbrot(args: MandelbrotArgs) -> anyhow::Result<()> {
    let viewport = match (args.center_re, args.center_im, args.span) {
        (Some(re), Some(im), Some(span)) => {
            anyhow::ensure!(span.is_finite() && span > 0.0, "--span must be positive, got {span}");
            Viewport::new(re, im, span)
        }
        (None, None, None) => Viewport::default(),
        _ => anyhow::bail!("--center-re, --center-im and --span must be given together"),
    };
    let params = MandelbrotParams {
        width: args.width,
        height: args.height,
        viewport,
        max_iterations: args.iterations,
    };
    tracing::debug!(?params, "rendering mandelbrot");
    write_image(&mandelbrot::render(&params), &args.out, args.format.into())
}

fn write_image(canvas: &Canvas, out: &Path, format: ImageFormat) -> anyhow::Result<()> {
    let bytes = format
        .encode(canvas)
        .with_context(|| format!("encode {}", format.extension()))?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, bytes).with_context(|| format!("write image '{}'", out.display()))?;

    eprintln!("wrote {} ({}x{})", out.display(), canvas.width(), canvas.height());
    Ok(())
}
