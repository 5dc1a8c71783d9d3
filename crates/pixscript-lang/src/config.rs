use pixscript_renderer::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Limits and defaults for one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Statements plus expressions a run may evaluate before it is aborted
    /// with `ExecutionLimitExceeded`.
    pub max_steps: u64,
    /// Canvas size used unless the script calls `size(w, h)`.
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl EvalConfig {
    pub const DEFAULT_MAX_STEPS: u64 = 5_000_000;

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_canvas_size(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_steps: Self::DEFAULT_MAX_STEPS,
            canvas_width: DEFAULT_WIDTH,
            canvas_height: DEFAULT_HEIGHT,
        }
    }
}
