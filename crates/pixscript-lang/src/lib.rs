pub mod config;
pub mod error;
pub mod runtime;
pub mod syntax;

pub use config::EvalConfig;
pub use error::{Error, ErrorCode, LexError, LexErrorKind, ParseError, RuntimeError, RuntimeErrorKind};
pub use runtime::value::Value;
pub use syntax::ast::Program;
pub use syntax::token::{Builtin, Token, TokenKind};

use pixscript_renderer::mandelbrot::{self, MandelbrotParams};
use pixscript_renderer::{pnm, Canvas};

use runtime::interpreter::Interpreter;

// ─── Public API types ─────────────────────────────────────────────────────────

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Everything `print` wrote, one line per call.
    pub output: String,
    /// `None` when the script never wrote a pixel.
    pub canvas: Option<Canvas>,
    /// Size the canvas has, or would have had.
    pub canvas_size: (u32, u32),
}

impl Outcome {
    /// The canvas, or a blank one of the configured size.
    pub fn into_canvas(self) -> Canvas {
        let (w, h) = self.canvas_size;
        self.canvas.unwrap_or_else(|| Canvas::new(w, h))
    }
}

// ─── Public API ───────────────────────────────────────────────────────────────

/// Lex and parse source text.
pub fn compile(source: &str) -> Result<Program, Error> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    Ok(syntax::parser::Parser::new(tokens).parse()?)
}

/// Full pipeline: lex, parse, evaluate.
#[tracing::instrument(skip(source), fields(len = source.len()))]
pub fn run(source: &str, config: &EvalConfig) -> Result<Outcome, Error> {
    let program = compile(source).inspect_err(|e| tracing::debug!(error = %e, "compile failed"))?;
    let mut interp = Interpreter::new(*config);
    interp.run(&program).inspect_err(|e| tracing::debug!(error = %e, "run failed"))?;
    let state = interp.into_state();
    Ok(Outcome { output: state.output, canvas: state.canvas, canvas_size: state.canvas_size })
}

/// Run a script and return its final canvas.
pub fn render(source: &str, config: &EvalConfig) -> Result<Canvas, Error> {
    run(source, config).map(Outcome::into_canvas)
}

pub fn try_evaluate(source: &str) -> Result<String, Error> {
    run(source, &EvalConfig::default()).map(|o| o.output)
}

pub fn try_evaluate_image(source: &str) -> Result<Vec<u8>, Error> {
    let canvas = render(source, &EvalConfig::default())?;
    Ok(pnm::encode(&canvas)?)
}

/// Text mode. Returns the printed output, or the error message.
pub fn evaluate(source: &str) -> String {
    try_evaluate(source).unwrap_or_else(|e| e.to_string())
}

/// Image mode. Returns PNM bytes, or an empty vector on any error.
pub fn evaluate_image(source: &str) -> Vec<u8> {
    try_evaluate_image(source).unwrap_or_default()
}

/// PNM of the default Mandelbrot view, or an empty vector if encoding fails.
pub fn image_mandelbrot() -> Vec<u8> {
    pnm::encode(&mandelbrot::render(&MandelbrotParams::default())).unwrap_or_default()
}
