//! Implementations of the builtin calls. Dispatch is by the `Builtin` enum
//! the parser resolved, so argument counts are already known to be valid.

use pixscript_renderer::mandelbrot::{self, MandelbrotParams, Viewport};
use pixscript_renderer::{Canvas, MAX_DIMENSION, MAX_ITERATIONS, RasterError};

use crate::config::EvalConfig;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::value::Value;
use crate::syntax::ast::Span;
use crate::syntax::token::Builtin;

// ─── Runtime state ────────────────────────────────────────────────────────────

/// Everything a builtin may read or write during one run.
#[derive(Debug, Clone)]
pub struct RuntimeState {
    /// Accumulated `print` output.
    pub output: String,
    /// Allocated on the first pixel write or `mandelbrot` call.
    pub canvas: Option<Canvas>,
    /// Dimensions the canvas will have once allocated.
    pub canvas_size: (u32, u32),
}

impl RuntimeState {
    pub fn new(config: &EvalConfig) -> Self {
        Self {
            output: String::new(),
            canvas: None,
            canvas_size: (clamp_dimension(config.canvas_width), clamp_dimension(config.canvas_height)),
        }
    }

    pub fn pixel_count(&self) -> u64 {
        self.canvas_size.0 as u64 * self.canvas_size.1 as u64
    }

    fn canvas_mut(&mut self) -> &mut Canvas {
        let (w, h) = self.canvas_size;
        self.canvas.get_or_insert_with(|| {
            tracing::debug!(width = w, height = h, "allocating canvas");
            Canvas::new(w, h)
        })
    }
}

// ─── Cost ─────────────────────────────────────────────────────────────────────

/// Escape-time iterations that add up to one evaluation step.
pub const ESCAPE_ITERATIONS_PER_STEP: u64 = 64;

/// Steps charged for a call on top of evaluating its arguments. Only
/// `mandelbrot` costs anything: its worst case, every pixel running to the
/// iteration cap.
pub fn cost(builtin: Builtin, args: &[Value], state: &RuntimeState) -> u64 {
    if builtin != Builtin::Mandelbrot {
        return 0;
    }
    let limit = match args {
        [_, _, _, Value::Number(it)] if it.is_finite() => it.clamp(1.0, MAX_ITERATIONS as f64) as u64,
        [] => MandelbrotParams::default().max_iterations as u64,
        _ => 1,
    };
    state.pixel_count().saturating_mul(limit).div_ceil(ESCAPE_ITERATIONS_PER_STEP)
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub fn call(builtin: Builtin, args: &[Value], state: &mut RuntimeState, span: Span) -> Result<Value, RuntimeError> {
    match builtin {
        Builtin::Print => {
            state.output.push_str(&format!("{}\n", args[0]));
            Ok(Value::Unit)
        }

        Builtin::SetPixel => {
            let nums = numbers(args, span)?;
            set_pixel(state, &nums, span)?;
            Ok(Value::Unit)
        }

        Builtin::Size => {
            let nums = numbers(args, span)?;
            resize(state, nums[0], nums[1], span)?;
            Ok(Value::Unit)
        }

        Builtin::Width  => Ok(Value::Number(state.canvas_size.0 as f64)),
        Builtin::Height => Ok(Value::Number(state.canvas_size.1 as f64)),

        Builtin::Mandelbrot => {
            let nums = numbers(args, span)?;
            let (viewport, max_iterations) = match nums.as_slice() {
                [] => (Viewport::default(), MandelbrotParams::default().max_iterations),
                [re, im, span_re, iterations] => mandelbrot_args(*re, *im, *span_re, *iterations, span)?,
                _ => unreachable!("arity checked by the parser"),
            };
            mandelbrot::render_into(state.canvas_mut(), &viewport, max_iterations);
            Ok(Value::Unit)
        }
    }
}

fn set_pixel(state: &mut RuntimeState, nums: &[f64], span: Span) -> Result<(), RuntimeError> {
    let (x, y) = (nums[0], nums[1]);
    let canvas = state.canvas_mut();
    let out_of_bounds = |canvas: &Canvas| RuntimeError::new(
        RuntimeErrorKind::PixelOutOfBounds { x, y, width: canvas.width(), height: canvas.height() },
        span.line, span.column,
    );

    let (Some(cx), Some(cy)) = (coordinate(x), coordinate(y)) else {
        return Err(out_of_bounds(canvas));
    };
    let written = match nums[2..] {
        [v] => canvas.set_gray(cx, cy, channel(v)),
        [r, g, b] => canvas.set_rgb(cx, cy, [channel(r), channel(g), channel(b)]),
        _ => unreachable!("arity checked by the parser"),
    };
    written.map_err(|e| match e {
        RasterError::OutOfBounds { .. } => out_of_bounds(canvas),
        other => RuntimeError::new(
            RuntimeErrorKind::InvalidArgument { builtin: "set_pixel", message: other.to_string() },
            span.line, span.column,
        ),
    })
}

fn resize(state: &mut RuntimeState, w: f64, h: f64, span: Span) -> Result<(), RuntimeError> {
    if state.canvas.is_some() {
        return Err(RuntimeError::new(RuntimeErrorKind::CanvasLocked, span.line, span.column));
    }
    if !(w.is_finite() && h.is_finite() && w >= 1.0 && h >= 1.0) {
        return Err(invalid("size", format!("expects dimensions of at least 1, got {w} x {h}"), span));
    }
    let size = (clamp_dimension(w as u32), clamp_dimension(h as u32));
    if size.0 as f64 != w.floor() || size.1 as f64 != h.floor() {
        tracing::warn!(width = w, height = h, max = MAX_DIMENSION, "canvas size clamped");
    }
    state.canvas_size = size;
    Ok(())
}

fn mandelbrot_args(
    re: f64,
    im: f64,
    span_re: f64,
    iterations: f64,
    span: Span,
) -> Result<(Viewport, usize), RuntimeError> {
    if !(re.is_finite() && im.is_finite()) {
        return Err(invalid("mandelbrot", format!("center must be finite, got ({re}, {im})"), span));
    }
    if !(span_re.is_finite() && span_re > 0.0) {
        return Err(invalid("mandelbrot", format!("span must be positive, got {span_re}"), span));
    }
    if !(iterations.is_finite() && iterations >= 1.0) {
        return Err(invalid("mandelbrot", format!("iteration count must be at least 1, got {iterations}"), span));
    }
    if iterations > MAX_ITERATIONS as f64 {
        tracing::warn!(requested = iterations, max = MAX_ITERATIONS, "iteration count clamped");
    }
    Ok((Viewport::new(re, im, span_re), iterations as usize))
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn numbers(args: &[Value], span: Span) -> Result<Vec<f64>, RuntimeError> {
    args.iter().map(|v| as_number(v, span)).collect()
}

pub fn as_number(v: &Value, span: Span) -> Result<f64, RuntimeError> {
    match v {
        Value::Number(n) => Ok(*n),
        other => Err(RuntimeError::new(
            RuntimeErrorKind::TypeMismatch { expected: "number", found: other.type_name() },
            span.line, span.column,
        )),
    }
}

/// Pixel coordinate: floored, `None` when not finite.
fn coordinate(v: f64) -> Option<i64> {
    v.is_finite().then(|| v.floor() as i64)
}

/// Sample value: rounded and clamped to `0..=255`; NaN becomes 0.
fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn clamp_dimension(n: u32) -> u32 {
    n.clamp(1, MAX_DIMENSION)
}

fn invalid(builtin: &'static str, message: String, span: Span) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::InvalidArgument { builtin, message }, span.line, span.column)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pixscript_renderer::Pixel;

    fn state() -> RuntimeState {
        RuntimeState::new(&EvalConfig::default().with_canvas_size(4, 4))
    }

    fn sp() -> Span { Span::new(1, 1) }

    fn n(v: f64) -> Value { Value::Number(v) }

    #[test]
    fn print_appends_line() {
        let mut s = state();
        call(Builtin::Print, &[n(1.0)], &mut s, sp()).unwrap();
        call(Builtin::Print, &[n(2.5)], &mut s, sp()).unwrap();
        assert_eq!(s.output, "1\n2.5\n");
        assert!(s.canvas.is_none());
    }

    #[test]
    fn set_pixel_allocates_canvas_lazily() {
        let mut s = state();
        call(Builtin::SetPixel, &[n(1.0), n(2.0), n(128.0)], &mut s, sp()).unwrap();
        let canvas = s.canvas.as_ref().unwrap();
        assert_eq!(canvas.pixel(1, 2), Some(Pixel::Gray(128)));
    }

    #[test]
    fn coordinates_are_floored_and_samples_clamped() {
        let mut s = state();
        call(Builtin::SetPixel, &[n(1.9), n(0.2), n(300.0)], &mut s, sp()).unwrap();
        call(Builtin::SetPixel, &[n(0.0), n(0.0), n(-5.0)], &mut s, sp()).unwrap();
        let canvas = s.canvas.as_ref().unwrap();
        assert_eq!(canvas.pixel(1, 0), Some(Pixel::Gray(255)));
        assert_eq!(canvas.pixel(0, 0), Some(Pixel::Gray(0)));
    }

    #[test]
    fn five_argument_form_writes_color() {
        let mut s = state();
        call(Builtin::SetPixel, &[n(3.0), n(3.0), n(255.0), n(10.4), n(0.6)], &mut s, sp()).unwrap();
        assert_eq!(s.canvas.as_ref().unwrap().pixel(3, 3), Some(Pixel::Rgb([255, 10, 1])));
    }

    #[test]
    fn out_of_bounds_reports_original_coordinates() {
        let mut s = state();
        for (x, y) in [(4.0, 0.0), (0.0, -0.5), (f64::NAN, 0.0), (f64::INFINITY, 1.0)] {
            let err = call(Builtin::SetPixel, &[n(x), n(y), n(1.0)], &mut s, sp()).unwrap_err();
            assert!(
                matches!(err.kind, RuntimeErrorKind::PixelOutOfBounds { width: 4, height: 4, .. }),
                "({x}, {y}) gave {err:?}"
            );
        }
        assert!(s.canvas.unwrap().samples().iter().all(|&v| v == 0));
    }

    #[test]
    fn size_before_first_write() {
        let mut s = state();
        call(Builtin::Size, &[n(10.0), n(20.5)], &mut s, sp()).unwrap();
        assert_eq!(call(Builtin::Width, &[], &mut s, sp()).unwrap(), n(10.0));
        assert_eq!(call(Builtin::Height, &[], &mut s, sp()).unwrap(), n(20.0));
        call(Builtin::SetPixel, &[n(9.0), n(19.0), n(1.0)], &mut s, sp()).unwrap();
        let canvas = s.canvas.as_ref().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (10, 20));
    }

    #[test]
    fn size_after_write_is_locked() {
        let mut s = state();
        call(Builtin::SetPixel, &[n(0.0), n(0.0), n(1.0)], &mut s, sp()).unwrap();
        let err = call(Builtin::Size, &[n(8.0), n(8.0)], &mut s, sp()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::CanvasLocked);
    }

    #[test]
    fn size_rejects_degenerate_and_clamps_huge() {
        let mut s = state();
        let err = call(Builtin::Size, &[n(0.0), n(8.0)], &mut s, sp()).unwrap_err();
        assert!(matches!(err.kind, RuntimeErrorKind::InvalidArgument { builtin: "size", .. }));

        call(Builtin::Size, &[n(1e12), n(3.0)], &mut s, sp()).unwrap();
        assert_eq!(s.canvas_size, (MAX_DIMENSION, 3));
    }

    fn mandelbrot_on(size: (u32, u32), args: &[Value]) -> Canvas {
        let mut s = RuntimeState::new(&EvalConfig::default().with_canvas_size(size.0, size.1));
        call(Builtin::Mandelbrot, args, &mut s, sp()).unwrap();
        s.canvas.expect("mandelbrot allocates the canvas")
    }

    #[test]
    fn mandelbrot_fills_current_canvas() {
        let mut s = state();
        call(Builtin::SetPixel, &[n(0.0), n(0.0), n(1.0), n(2.0), n(3.0)], &mut s, sp()).unwrap();
        call(Builtin::Mandelbrot, &[n(0.0), n(0.0), n(4.0), n(50.0)], &mut s, sp()).unwrap();
        let canvas = s.canvas.unwrap();
        assert_eq!((canvas.width(), canvas.height()), (4, 4));
        assert_eq!(canvas.mode(), pixscript_renderer::ColorMode::Gray);

        let mut expected = Canvas::new(4, 4);
        mandelbrot::render_into(&mut expected, &Viewport::new(0.0, 0.0, 4.0), 50);
        assert_eq!(canvas, expected);
    }

    #[test]
    fn mandelbrot_matches_renderer_for_viewport() {
        let canvas = mandelbrot_on((48, 32), &[n(-0.75), n(0.1), n(0.5), n(120.0)]);
        let mut expected = Canvas::new(48, 32);
        mandelbrot::render_into(&mut expected, &Viewport::new(-0.75, 0.1, 0.5), 120);
        assert_eq!(canvas, expected);
        assert!(canvas.samples().iter().any(|&v| v != 0));
    }

    #[test]
    fn mandelbrot_iterations_are_clamped() {
        let view = |iterations| mandelbrot_on((24, 16), &[n(-0.745), n(0.113), n(0.01), n(iterations)]);
        assert_eq!(view(5000.0), view(MAX_ITERATIONS as f64));
        assert_eq!(view(7.9), view(7.0));
    }

    #[test]
    fn mandelbrot_cost_scales_with_iterations() {
        let s = RuntimeState::new(&EvalConfig::default().with_canvas_size(2048, 2048));
        let deep = [n(-0.1), n(0.0), n(0.2), n(1000.0)];
        assert_eq!(cost(Builtin::Mandelbrot, &deep, &s), 2048 * 2048 * 1000 / ESCAPE_ITERATIONS_PER_STEP);
        let clamped = [n(-0.1), n(0.0), n(0.2), n(1e9)];
        assert_eq!(cost(Builtin::Mandelbrot, &clamped, &s), cost(Builtin::Mandelbrot, &deep, &s));

        let small = RuntimeState::new(&EvalConfig::default().with_canvas_size(8, 8));
        assert_eq!(cost(Builtin::Mandelbrot, &[], &small), 255);
        assert_eq!(cost(Builtin::Mandelbrot, &[n(0.0), n(0.0), n(1.0), n(1.0)], &small), 1);
        assert_eq!(cost(Builtin::Print, &[n(1.0)], &small), 0);
    }

    #[test]
    fn mandelbrot_rejects_bad_viewport() {
        let mut s = state();
        for args in [
            [n(0.0), n(0.0), n(0.0), n(50.0)],
            [n(0.0), n(0.0), n(-1.0), n(50.0)],
            [n(f64::NAN), n(0.0), n(1.0), n(50.0)],
            [n(0.0), n(0.0), n(1.0), n(0.0)],
        ] {
            let err = call(Builtin::Mandelbrot, &args, &mut s, sp()).unwrap_err();
            assert!(matches!(err.kind, RuntimeErrorKind::InvalidArgument { builtin: "mandelbrot", .. }));
        }
    }

    #[test]
    fn non_number_argument_is_type_mismatch() {
        let mut s = state();
        let err = call(Builtin::SetPixel, &[Value::Bool(true), n(0.0), n(0.0)], &mut s, sp()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch { expected: "number", found: "bool" });
    }
}
