use pixscript_renderer::RasterError;
use thiserror::Error;

/// Error codes prefixed by phase: L = lexer, P = parser, R = runtime,
/// E = image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated block comment

    // Parser
    P001, // unexpected token
    P002, // missing expected token
    P003, // unknown builtin
    P004, // wrong builtin argument count
    P005, // nesting too deep or too many operators

    // Runtime
    R001, // unbound variable
    R002, // division by zero
    R003, // pixel out of bounds
    R004, // execution limit exceeded
    R005, // type mismatch
    R006, // canvas already allocated
    R007, // invalid builtin argument

    // Output
    E001, // canvas could not be encoded
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
            Self::P005 => "P005",
            Self::R001 => "R001",
            Self::R002 => "R002",
            Self::R003 => "R003",
            Self::R004 => "R004",
            Self::R005 => "R005",
            Self::R006 => "R006",
            Self::R007 => "R007",
            Self::E001 => "E001",
        }
    }
}

// ─── Lexer ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),

    #[error("unterminated block comment")]
    UnterminatedComment,
}

impl LexErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedChar(_)   => ErrorCode::L001,
            Self::UnterminatedComment => ErrorCode::L002,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{}] {line}:{column} — {kind}", .kind.code().as_str())]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    pub fn code(&self) -> ErrorCode { self.kind.code() }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{}] {line}:{column} — expected {expected}, found {found}", .code.as_str())]
pub struct ParseError {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub expected: String,
    pub found: String,
}

impl ParseError {
    pub fn new(
        code: ErrorCode,
        line: usize,
        column: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self { code, line, column, expected: expected.into(), found: found.into() }
    }
}

// ─── Runtime ─────────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("UnboundVariable: `{name}` is not defined")]
    UnboundVariable { name: String },

    #[error("DivisionByZero: division by zero")]
    DivisionByZero,

    #[error("PixelOutOfBounds: ({x}, {y}) is outside the {width}x{height} canvas")]
    PixelOutOfBounds { x: f64, y: f64, width: u32, height: u32 },

    #[error("ExecutionLimitExceeded: script ran for more than {limit} steps")]
    ExecutionLimitExceeded { limit: u64 },

    #[error("TypeMismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },

    #[error("CanvasLocked: `size` must be called before the first pixel write")]
    CanvasLocked,

    #[error("InvalidArgument: `{builtin}` {message}")]
    InvalidArgument { builtin: &'static str, message: String },
}

impl RuntimeErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnboundVariable { .. }        => ErrorCode::R001,
            Self::DivisionByZero                => ErrorCode::R002,
            Self::PixelOutOfBounds { .. }       => ErrorCode::R003,
            Self::ExecutionLimitExceeded { .. } => ErrorCode::R004,
            Self::TypeMismatch { .. }           => ErrorCode::R005,
            Self::CanvasLocked                  => ErrorCode::R006,
            Self::InvalidArgument { .. }        => ErrorCode::R007,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{}] {line}:{column} — {kind}", .kind.code().as_str())]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub line: usize,
    pub column: usize,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// Any failure of the source → output pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("[E001] {0}")]
    Encode(#[from] RasterError),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Lex(e)     => e.code(),
            Self::Parse(e)   => e.code,
            Self::Runtime(e) => e.kind.code(),
            Self::Encode(_)  => ErrorCode::E001,
        }
    }

    /// Source position the error points at. Encoding failures happen after
    /// the script finished and report `(0, 0)`.
    pub fn position(&self) -> (usize, usize) {
        match self {
            Self::Lex(e)     => (e.line, e.column),
            Self::Parse(e)   => (e.line, e.column),
            Self::Runtime(e) => (e.line, e.column),
            Self::Encode(_)  => (0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn messages_carry_code_and_position() {
        let lex = Error::from(LexError::new(LexErrorKind::UnexpectedChar('$'), 2, 5));
        assert_eq!(lex.to_string(), "[L001] 2:5 — unexpected character `$`");
        let comment = Error::from(LexError::new(LexErrorKind::UnterminatedComment, 4, 1));
        assert_eq!(comment.to_string(), "[L002] 4:1 — unterminated block comment");
        assert_eq!(comment.code(), ErrorCode::L002);

        let parse = Error::from(ParseError::new(ErrorCode::P002, 1, 9, "`)`", "`{`"));
        assert_eq!(parse.to_string(), "[P002] 1:9 — expected `)`, found `{`");

        let rt = Error::from(RuntimeError::new(RuntimeErrorKind::DivisionByZero, 3, 7));
        assert_eq!(rt.to_string(), "[R002] 3:7 — DivisionByZero: division by zero");
        assert_eq!(rt.code(), ErrorCode::R002);
        assert_eq!(rt.position(), (3, 7));

        let enc = Error::from(RasterError::Encode("disk full".into()));
        assert_eq!(enc.to_string(), "[E001] image encoding failed: disk full");
        assert_eq!(enc.code(), ErrorCode::E001);
    }

    #[test]
    fn runtime_kinds_have_distinct_codes() {
        let kinds = [
            RuntimeErrorKind::UnboundVariable { name: "x".into() },
            RuntimeErrorKind::DivisionByZero,
            RuntimeErrorKind::PixelOutOfBounds { x: 0.0, y: 0.0, width: 1, height: 1 },
            RuntimeErrorKind::ExecutionLimitExceeded { limit: 1 },
            RuntimeErrorKind::TypeMismatch { expected: "number", found: "bool" },
            RuntimeErrorKind::CanvasLocked,
            RuntimeErrorKind::InvalidArgument { builtin: "size", message: "x".into() },
        ];
        let codes: HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|c| c.as_str().starts_with('R')));
    }
}
