//! Selector Parser
//!
//! Recursive descent parser for a CSS selector group:
//!
//! ```text
//! list     := complex ( ',' complex )*
//! complex  := compound ( combinator compound )*
//! compound := ( ident | '*' )? ( '#' id | '.' class | '[' attr ']' | ':' pseudo )*
//! ```

use super::lexer::{Lexer, Token};
use crate::error::{CompileError, Result};

/// Comma-separated selector group
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<Complex>);

/// Compound selectors joined by combinators, left to right.
/// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Complex {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

/// A type selector plus simple selectors that all apply to one element
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    /// Element name; None for `*` or an implicit universal selector
    pub tag: Option<String>,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Id(String),
    Class(String),
    Attribute {
        name: String,
        value: Option<(AttrOp, String)>,
    },
    Pseudo(Pseudo),
}

/// Attribute value operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pseudo {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
    Not(SelectorList),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Deepest `:not(...)` nesting accepted before parsing gives up
pub const MAX_NESTING: usize = 32;

/// Selector parser
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    position: usize,
    /// Current `:not(` nesting level
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let position = lexer.token_start();
        Parser {
            source,
            lexer,
            current,
            position,
            depth: 0,
        }
    }

    /// Parse a complete selector group
    pub fn parse(&mut self) -> Result<SelectorList> {
        self.skip_whitespace();
        let list = self.parse_list()?;
        match self.current {
            Token::Eof => Ok(list),
            _ => Err(self.unexpected("end of selector")),
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
        self.position = self.lexer.token_start();
    }

    fn skip_whitespace(&mut self) {
        if self.current == Token::Whitespace {
            self.advance();
        }
    }

    fn error(&self, reason: impl Into<String>) -> CompileError {
        CompileError::new(self.source, self.position, reason)
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        match &self.current {
            Token::Eof => self.error(format!("expected {}, found end of input", expected)),
            Token::Unterminated => self.error("unterminated string"),
            Token::Invalid(c) => self.error(format!("unexpected character {:?}", c)),
            other => self.error(format!("expected {}, found {:?}", expected, other)),
        }
    }

    /// Parse selectors separated by commas; stops before `)` or end of input
    fn parse_list(&mut self) -> Result<SelectorList> {
        let mut selectors = vec![self.parse_complex()?];

        while self.current == Token::Comma {
            self.advance();
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
        }

        Ok(SelectorList(selectors))
    }

    fn parse_complex(&mut self) -> Result<Complex> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        while let Some(combinator) = self.parse_combinator()? {
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(Complex {
            compounds,
            combinators,
        })
    }

    /// Consume a combinator and surrounding whitespace, if one follows
    fn parse_combinator(&mut self) -> Result<Option<Combinator>> {
        let had_whitespace = self.current == Token::Whitespace;
        self.skip_whitespace();

        let combinator = match self.current {
            Token::Gt => Combinator::Child,
            Token::Plus => Combinator::NextSibling,
            Token::Tilde => Combinator::SubsequentSibling,
            Token::Comma | Token::RightParen | Token::Eof => return Ok(None),
            _ if had_whitespace => return Ok(Some(Combinator::Descendant)),
            _ => return Err(self.unexpected("combinator")),
        };

        self.advance();
        self.skip_whitespace();
        Ok(Some(combinator))
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound {
            tag: None,
            components: Vec::new(),
        };
        let mut has_type = false;

        match &self.current {
            Token::Ident(name) => {
                compound.tag = Some(name.clone());
                has_type = true;
                self.advance();
            }
            Token::Star => {
                has_type = true;
                self.advance();
            }
            _ => {}
        }

        loop {
            let component = match &self.current {
                Token::Hash(id) => {
                    let id = id.clone();
                    self.advance();
                    Component::Id(id)
                }
                Token::Dot => {
                    self.advance();
                    Component::Class(self.expect_ident("class name")?)
                }
                Token::LeftBracket => {
                    self.advance();
                    self.parse_attribute()?
                }
                Token::Colon => {
                    self.advance();
                    Component::Pseudo(self.parse_pseudo()?)
                }
                _ => break,
            };
            compound.components.push(component);
        }

        if !has_type && compound.components.is_empty() {
            return Err(self.unexpected("selector"));
        }

        Ok(compound)
    }

    fn expect_ident(&mut self, what: &str) -> Result<String> {
        match &self.current {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Parse the inside of `[...]`; the opening bracket is consumed
    fn parse_attribute(&mut self) -> Result<Component> {
        self.skip_whitespace();
        let name = self.expect_ident("attribute name")?;
        self.skip_whitespace();

        let op = match self.current {
            Token::RightBracket => {
                self.advance();
                return Ok(Component::Attribute { name, value: None });
            }
            Token::Eq => AttrOp::Equals,
            Token::Includes => AttrOp::Includes,
            Token::DashMatch => AttrOp::DashMatch,
            Token::PrefixMatch => AttrOp::Prefix,
            Token::SuffixMatch => AttrOp::Suffix,
            Token::SubstringMatch => AttrOp::Substring,
            _ => return Err(self.unexpected("attribute operator or ']'")),
        };
        self.advance();
        self.skip_whitespace();

        let value = match &self.current {
            Token::Ident(v) | Token::String(v) => v.clone(),
            _ => return Err(self.unexpected("attribute value")),
        };
        self.advance();
        self.skip_whitespace();

        if self.current != Token::RightBracket {
            return Err(self.unexpected("']'"));
        }
        self.advance();

        Ok(Component::Attribute {
            name,
            value: Some((op, value)),
        })
    }

    /// Parse a pseudo-class; the colon is consumed
    fn parse_pseudo(&mut self) -> Result<Pseudo> {
        let start = self.position;
        let name = self.expect_ident("pseudo-class name")?;

        let pseudo = match name.to_ascii_lowercase().as_str() {
            "first-child" => Pseudo::FirstChild,
            "last-child" => Pseudo::LastChild,
            "only-child" => Pseudo::OnlyChild,
            "empty" => Pseudo::Empty,
            "root" => Pseudo::Root,
            "not" => {
                if self.current != Token::LeftParen {
                    return Err(self.unexpected("'('"));
                }
                if self.depth >= MAX_NESTING {
                    return Err(self.error(format!(
                        ":not() nested deeper than {} levels",
                        MAX_NESTING
                    )));
                }
                self.advance();
                self.skip_whitespace();
                self.depth += 1;
                let inner = self.parse_list();
                self.depth -= 1;
                let inner = inner?;
                if self.current != Token::RightParen {
                    return Err(self.unexpected("')'"));
                }
                self.advance();
                Pseudo::Not(inner)
            }
            _ => {
                return Err(CompileError::new(
                    self.source,
                    start,
                    format!("unsupported pseudo-class :{}", name),
                ))
            }
        };

        Ok(pseudo)
    }
}

/// Parse a selector string
pub fn parse(selector: &str) -> Result<SelectorList> {
    Parser::new(selector).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let list = parse("div.row#main").unwrap();
        assert_eq!(list.0.len(), 1);
        let compound = &list.0[0].compounds[0];
        assert_eq!(compound.tag.as_deref(), Some("div"));
        assert_eq!(
            compound.components,
            vec![
                Component::Class("row".to_string()),
                Component::Id("main".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_combinators() {
        let list = parse("html > body div + p ~ span").unwrap();
        assert_eq!(
            list.0[0].combinators,
            vec![
                Combinator::Child,
                Combinator::Descendant,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
            ]
        );
        assert_eq!(list.0[0].compounds.len(), 5);
    }

    #[test]
    fn test_parse_group() {
        let list = parse(" .a , .b ").unwrap();
        assert_eq!(list.0.len(), 2);
    }

    #[test]
    fn test_parse_attribute() {
        let list = parse("[lang|='en'][data-x]").unwrap();
        let components = &list.0[0].compounds[0].components;
        assert_eq!(
            components[0],
            Component::Attribute {
                name: "lang".to_string(),
                value: Some((AttrOp::DashMatch, "en".to_string())),
            }
        );
        assert_eq!(
            components[1],
            Component::Attribute {
                name: "data-x".to_string(),
                value: None,
            }
        );
    }

    #[test]
    fn test_parse_not() {
        let list = parse("li:not(.x, #y)").unwrap();
        match &list.0[0].compounds[0].components[0] {
            Component::Pseudo(Pseudo::Not(inner)) => assert_eq!(inner.0.len(), 2),
            other => panic!("unexpected component {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse(":+ ^").is_err());
        assert!(parse("div >").is_err());
        assert!(parse("div,").is_err());
        assert!(parse("[attr").is_err());
        assert!(parse("a:hover").is_err());
        assert!(parse("a:not(b").is_err());
        assert!(parse("'x'").is_err());
    }

    #[test]
    fn test_not_nesting_limit() {
        let nested = |levels: usize| {
            format!("{}a{}", ":not(".repeat(levels), ")".repeat(levels))
        };
        assert!(parse(&nested(MAX_NESTING)).is_ok());

        let err = parse(&nested(MAX_NESTING + 1)).unwrap_err();
        assert!(err.reason.contains("nested"));

        let err = parse(&":not(".repeat(100_000)).unwrap_err();
        assert_eq!(err.position, MAX_NESTING * 5 + 4);
    }

    #[test]
    fn test_error_position() {
        let err = parse("div ^x").unwrap_err();
        assert_eq!(err.position, 4);
        assert_eq!(err.selector, "div ^x");
    }
}
