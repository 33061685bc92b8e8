//! Selector Lexer
//!
//! Tokenizes CSS selector text. Runs of whitespace collapse into a single
//! `Whitespace` token because whitespace is the descendant combinator.

/// Selector token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Names
    Ident(String), // div, row-fluid, first-child
    Hash(String),  // #id

    // Punctuation
    Dot,   // .
    Star,  // *
    Colon, // :
    Comma, // ,

    // Combinators
    Whitespace,
    Gt,    // >
    Plus,  // +
    Tilde, // ~

    // Brackets
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )

    // Attribute operators
    Eq,             // =
    Includes,       // ~=
    DashMatch,      // |=
    PrefixMatch,    // ^=
    SuffixMatch,    // $=
    SubstringMatch, // *=

    // Literals
    String(String),

    // Errors surface as tokens; the parser turns them into CompileError
    Unterminated,
    Invalid(char),

    // End of input
    Eof,
}

/// Selector lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    token_start: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            token_start: 0,
        }
    }

    /// Byte offset where the most recent token started
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Advance by n bytes
    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Consume `c`, then `=` if it follows, picking the matching token
    fn with_eq(&mut self, plain: Token, with_eq: Token) -> Token {
        self.advance(1);
        if self.peek() == Some('=') {
            self.advance(1);
            with_eq
        } else {
            plain
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.token_start = self.pos;

        let c = match self.peek() {
            Some(c) => c,
            None => return Token::Eof,
        };

        match c {
            _ if c.is_whitespace() => {
                while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
                    self.advance(c.len_utf8());
                }
                Token::Whitespace
            }
            '.' => {
                self.advance(1);
                Token::Dot
            }
            ',' => {
                self.advance(1);
                Token::Comma
            }
            ':' => {
                self.advance(1);
                Token::Colon
            }
            '>' => {
                self.advance(1);
                Token::Gt
            }
            '+' => {
                self.advance(1);
                Token::Plus
            }
            '[' => {
                self.advance(1);
                Token::LeftBracket
            }
            ']' => {
                self.advance(1);
                Token::RightBracket
            }
            '(' => {
                self.advance(1);
                Token::LeftParen
            }
            ')' => {
                self.advance(1);
                Token::RightParen
            }
            '=' => {
                self.advance(1);
                Token::Eq
            }
            '*' => self.with_eq(Token::Star, Token::SubstringMatch),
            '~' => self.with_eq(Token::Tilde, Token::Includes),
            '|' => self.with_eq(Token::Invalid('|'), Token::DashMatch),
            '^' => self.with_eq(Token::Invalid('^'), Token::PrefixMatch),
            '$' => self.with_eq(Token::Invalid('$'), Token::SuffixMatch),
            '#' => {
                self.advance(1);
                match self.read_name() {
                    Some(name) => Token::Hash(name),
                    None => Token::Invalid('#'),
                }
            }
            '"' | '\'' => self.read_string(c),
            _ if starts_ident(c, self.peek_at(1)) => match self.read_name() {
                Some(name) => Token::Ident(name),
                None => Token::Invalid(c),
            },
            _ => {
                self.advance(c.len_utf8());
                Token::Invalid(c)
            }
        }
    }

    /// Read a run of name characters
    fn read_name(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek().filter(|&c| is_name_char(c)) {
            self.advance(c.len_utf8());
        }
        if self.pos == start {
            None
        } else {
            Some(self.input[start..self.pos].to_string())
        }
    }

    /// Read a quoted string literal
    fn read_string(&mut self, quote: char) -> Token {
        self.advance(1);
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c == quote {
                let value = self.input[start..self.pos].to_string();
                self.advance(1);
                return Token::String(value);
            }
            self.advance(c.len_utf8());
        }

        Token::Unterminated
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}

fn starts_ident(c: char, next: Option<char>) -> bool {
    match c {
        '-' => next.is_some_and(|n| n.is_alphabetic() || n == '_' || n == '-'),
        _ => c.is_alphabetic() || c == '_' || !c.is_ascii(),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
