// src/frontend/token.rs

/// All token types in the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Literals
    IntLiteral,
    Identifier,

    // Keywords
    KwClass,
    KwInterface,
    KwExtends,
    KwImplements,
    KwPublic,
    KwStatic,
    KwVoid,
    KwInt,
    KwBoolean,
    KwIf,
    KwElse,
    KwWhile,
    KwReturn,
    KwNew,
    KwThis,
    KwNull,
    KwTrue,
    KwFalse,

    // Operators
    Plus,
    Minus,
    Star,
    Bang,
    AmpAmp,
    PipePipe,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Dot,

    // Special
    Eof,
    Error,
}

impl TokenType {
    /// Get string representation for error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IntLiteral => "integer",
            Self::Identifier => "identifier",
            Self::KwClass => "class",
            Self::KwInterface => "interface",
            Self::KwExtends => "extends",
            Self::KwImplements => "implements",
            Self::KwPublic => "public",
            Self::KwStatic => "static",
            Self::KwVoid => "void",
            Self::KwInt => "int",
            Self::KwBoolean => "boolean",
            Self::KwIf => "if",
            Self::KwElse => "else",
            Self::KwWhile => "while",
            Self::KwReturn => "return",
            Self::KwNew => "new",
            Self::KwThis => "this",
            Self::KwNull => "null",
            Self::KwTrue => "true",
            Self::KwFalse => "false",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Bang => "!",
            Self::AmpAmp => "&&",
            Self::PipePipe => "||",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Eq => "=",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Dot => ".",
            Self::Eof => "end of file",
            Self::Error => "error",
        }
    }

    /// Get precedence for binary operators (Pratt parsing)
    pub fn precedence(&self) -> u8 {
        match self {
            Self::PipePipe => 1,
            Self::AmpAmp => 2,
            Self::EqEq | Self::BangEq => 3,
            Self::Lt | Self::Gt | Self::LtEq | Self::GtEq => 4,
            Self::Plus | Self::Minus => 5,
            Self::Star => 6,
            _ => 0,
        }
    }
}

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: usize,    // Byte offset
    pub end: usize,      // Byte offset (exclusive)
    pub line: u32,       // Start line (1-indexed)
    pub column: u32,     // Start column (1-indexed)
    pub end_line: u32,   // End line (1-indexed)
    pub end_column: u32, // End column (1-indexed, exclusive)
}

impl Span {
    /// Create a new span with explicit end position
    pub fn new_with_end(
        start: usize,
        end: usize,
        line: u32,
        column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            start,
            end,
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Create a new span, computing end position for single-line tokens
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        let length = end.saturating_sub(start);
        Self {
            start,
            end,
            line,
            column,
            end_line: line,
            end_column: column + length as u32,
        }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
            end_line: other.end_line,
            end_column: other.end_column,
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        // miette uses (offset, length)
        (span.start, span.end - span.start).into()
    }
}

/// A token with its location in source code
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ty: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(ty: TokenType, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            ty,
            lexeme: lexeme.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_orders_operators() {
        assert!(TokenType::Star.precedence() > TokenType::Plus.precedence());
        assert!(TokenType::Plus.precedence() > TokenType::Lt.precedence());
        assert!(TokenType::Lt.precedence() > TokenType::EqEq.precedence());
        assert!(TokenType::EqEq.precedence() > TokenType::AmpAmp.precedence());
        assert!(TokenType::AmpAmp.precedence() > TokenType::PipePipe.precedence());
        assert_eq!(TokenType::Semicolon.precedence(), 0);
    }

    #[test]
    fn span_merge_keeps_outer_bounds() {
        let a = Span::new(0, 3, 1, 1);
        let b = Span::new(10, 12, 2, 5);
        let merged = a.merge(b);
        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 12);
        assert_eq!(merged.line, 1);
        assert_eq!(merged.end_line, 2);
    }
}
