use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Ident(String),

    // Keywords
    While,
    If,
    Else,
    Builtin(Builtin),

    // Operators
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // /
    Eq,     // =
    EqEq,   // ==
    BangEq, // !=
    Lt,     // <
    LtEq,   // <=
    Gt,     // >
    GtEq,   // >=

    // Punctuation
    Comma,     // ,
    Semicolon, // ;
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Number(n) => return write!(f, "number `{n}`"),
            Self::Ident(s) => return write!(f, "identifier `{s}`"),
            Self::Builtin(b) => return write!(f, "`{}`", b.name()),
            Self::Eof => return f.write_str("end of input"),
            Self::While => "while",
            Self::If => "if",
            Self::Else => "else",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Eq => "=",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
        };
        write!(f, "`{s}`")
    }
}

/// Maps an identifier string to its keyword token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "while" => TokenKind::While,
        "if"    => TokenKind::If,
        "else"  => TokenKind::Else,
        _ => match Builtin::from_name(&s) {
            Some(b) => TokenKind::Builtin(b),
            None    => TokenKind::Ident(s),
        },
    }
}

// ─── Builtins ────────────────────────────────────────────────────────────────

/// The closed set of callable names. Resolved by the lexer, arity-checked by
/// the parser, so the evaluator never sees an unknown call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `print(v)`
    Print,
    /// `set_pixel(x, y, v)` or `set_pixel(x, y, r, g, b)`
    SetPixel,
    /// `size(w, h)`
    Size,
    /// `width()`
    Width,
    /// `height()`
    Height,
    /// `mandelbrot()` or `mandelbrot(center_re, center_im, span, max_iterations)`
    Mandelbrot,
}

impl Builtin {
    pub const ALL: [Builtin; 6] = [
        Self::Print, Self::SetPixel, Self::Size, Self::Width, Self::Height, Self::Mandelbrot,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Print      => "print",
            Self::SetPixel   => "set_pixel",
            Self::Size       => "size",
            Self::Width      => "width",
            Self::Height     => "height",
            Self::Mandelbrot => "mandelbrot",
        }
    }

    /// Accepted argument counts.
    pub fn arities(&self) -> &'static [usize] {
        match self {
            Self::Print      => &[1],
            Self::SetPixel   => &[3, 5],
            Self::Size       => &[2],
            Self::Width      => &[0],
            Self::Height     => &[0],
            Self::Mandelbrot => &[0, 4],
        }
    }

    pub fn accepts(&self, argc: usize) -> bool {
        self.arities().contains(&argc)
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
