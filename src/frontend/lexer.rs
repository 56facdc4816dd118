// src/frontend/lexer.rs

use crate::errors::LexerError;
use crate::frontend::{Span, Token, TokenType};

pub struct Lexer<'src> {
    source: &'src str,
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    start: usize,
    current: usize,
    line: u32,
    column: u32,
    start_column: u32,
    start_line: u32,
    // Error collection
    errors: Vec<LexerError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_column: 1,
            start_line: 1,
            errors: Vec::new(),
        }
    }

    /// Take all collected errors, leaving the internal list empty.
    pub fn take_errors(&mut self) -> Vec<LexerError> {
        std::mem::take(&mut self.errors)
    }

    /// Check if any errors have been collected.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        self.start = self.current;
        self.start_column = self.column;
        self.start_line = self.line;

        let Some(c) = self.advance() else {
            return self.make_token(TokenType::Eof);
        };

        match c {
            '(' => self.make_token(TokenType::LParen),
            ')' => self.make_token(TokenType::RParen),
            '{' => self.make_token(TokenType::LBrace),
            '}' => self.make_token(TokenType::RBrace),
            ',' => self.make_token(TokenType::Comma),
            ';' => self.make_token(TokenType::Semicolon),
            '.' => self.make_token(TokenType::Dot),
            '+' => self.make_token(TokenType::Plus),
            '-' => self.make_token(TokenType::Minus),
            '*' => self.make_token(TokenType::Star),
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenType::EqEq)
                } else {
                    self.make_token(TokenType::Eq)
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenType::BangEq)
                } else {
                    self.make_token(TokenType::Bang)
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make_token(TokenType::LtEq)
                } else {
                    self.make_token(TokenType::Lt)
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenType::GtEq)
                } else {
                    self.make_token(TokenType::Gt)
                }
            }
            '&' if self.match_char('&') => self.make_token(TokenType::AmpAmp),
            '|' if self.match_char('|') => self.make_token(TokenType::PipePipe),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            _ => self.error_unexpected_char(c),
        }
    }

    /// Skip whitespace, newlines and comments
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.peek() != Some('\n') && self.peek().is_some() {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.block_comment();
                }
                _ => return,
            }
        }
    }

    fn block_comment(&mut self) {
        let start = self.current;
        let (line, column) = (self.line, self.column);
        // consume "/*"
        self.advance();
        self.advance();
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return;
                }
                Some('\n') => {
                    self.line += 1;
                    self.column = 1;
                }
                Some(_) => {}
                None => {
                    let span = Span::new_with_end(
                        start,
                        self.current,
                        line,
                        column,
                        self.line,
                        self.column,
                    );
                    self.errors
                        .push(LexerError::UnterminatedComment { span: span.into() });
                    return;
                }
            }
        }
    }

    /// Advance to the next character and return it
    fn advance(&mut self) -> Option<char> {
        if let Some((idx, c)) = self.chars.next() {
            self.current = idx + c.len_utf8();
            self.column += 1;
            Some(c)
        } else {
            None
        }
    }

    /// Peek at the next character without consuming it
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Peek at the character after the next one
    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current..].chars();
        iter.next();
        iter.next()
    }

    /// Consume the next character if it matches the expected character
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::new_with_end(
            self.start,
            self.current,
            self.start_line,
            self.start_column,
            self.line,
            self.column,
        )
    }

    /// Create a token from start to current position
    fn make_token(&self, ty: TokenType) -> Token {
        let lexeme = &self.source[self.start..self.current];
        Token::new(ty, lexeme, self.current_span())
    }

    /// Create an error token and collect an error for an unexpected character.
    fn error_unexpected_char(&mut self, c: char) -> Token {
        let span = self.current_span();
        self.errors.push(LexerError::UnexpectedCharacter {
            ch: c,
            span: span.into(),
        });
        Token::new(TokenType::Error, format!("unexpected character '{}'", c), span)
    }

    /// Scan an integer literal. Literals must fit in a 32-bit int.
    fn number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[self.start..self.current];
        if text.parse::<i32>().is_err() {
            let span = self.current_span();
            self.errors
                .push(LexerError::InvalidNumber { span: span.into() });
            return Token::new(TokenType::Error, "invalid number literal", span);
        }
        self.make_token(TokenType::IntLiteral)
    }

    /// Scan an identifier or keyword
    fn identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[self.start..self.current];
        let ty = Self::keyword_type(text).unwrap_or(TokenType::Identifier);
        self.make_token(ty)
    }

    /// Check if a string is a keyword and return its token type
    fn keyword_type(text: &str) -> Option<TokenType> {
        match text {
            "class" => Some(TokenType::KwClass),
            "interface" => Some(TokenType::KwInterface),
            "extends" => Some(TokenType::KwExtends),
            "implements" => Some(TokenType::KwImplements),
            "public" => Some(TokenType::KwPublic),
            "static" => Some(TokenType::KwStatic),
            "void" => Some(TokenType::KwVoid),
            "int" => Some(TokenType::KwInt),
            "boolean" => Some(TokenType::KwBoolean),
            "if" => Some(TokenType::KwIf),
            "else" => Some(TokenType::KwElse),
            "while" => Some(TokenType::KwWhile),
            "return" => Some(TokenType::KwReturn),
            "new" => Some(TokenType::KwNew),
            "this" => Some(TokenType::KwThis),
            "null" => Some(TokenType::KwNull),
            "true" => Some(TokenType::KwTrue),
            "false" => Some(TokenType::KwFalse),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_types(source: &str) -> Vec<TokenType> {
        let mut lexer = Lexer::new(source);
        let mut types = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.ty == TokenType::Eof {
                break;
            }
            types.push(token.ty);
        }
        types
    }

    #[test]
    fn lex_class_header() {
        assert_eq!(
            token_types("class B extends A implements Shape {"),
            vec![
                TokenType::KwClass,
                TokenType::Identifier,
                TokenType::KwExtends,
                TokenType::Identifier,
                TokenType::KwImplements,
                TokenType::Identifier,
                TokenType::LBrace,
            ]
        );
    }

    #[test]
    fn lex_operators() {
        assert_eq!(
            token_types("a <= b && !c || d != e"),
            vec![
                TokenType::Identifier,
                TokenType::LtEq,
                TokenType::Identifier,
                TokenType::AmpAmp,
                TokenType::Bang,
                TokenType::Identifier,
                TokenType::PipePipe,
                TokenType::Identifier,
                TokenType::BangEq,
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn comments_are_skipped_and_lines_tracked() {
        let mut lexer = Lexer::new("// header\n/* block\n comment */ x");
        let token = lexer.next_token();
        assert_eq!(token.ty, TokenType::Identifier);
        assert_eq!(token.lexeme, "x");
        assert_eq!(token.span.line, 3);
    }

    #[test]
    fn unexpected_character_is_collected() {
        let mut lexer = Lexer::new("@");
        let token = lexer.next_token();
        assert_eq!(token.ty, TokenType::Error);
        assert!(lexer.has_errors());
        let errors = lexer.take_errors();
        assert!(matches!(
            errors[0],
            LexerError::UnexpectedCharacter { ch: '@', .. }
        ));
    }

    #[test]
    fn oversized_literal_is_invalid() {
        let mut lexer = Lexer::new("99999999999");
        assert_eq!(lexer.next_token().ty, TokenType::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexerError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn unterminated_block_comment() {
        let mut lexer = Lexer::new("/* never closed");
        assert_eq!(lexer.next_token().ty, TokenType::Eof);
        assert!(matches!(
            lexer.take_errors()[0],
            LexerError::UnterminatedComment { .. }
        ));
    }
}
