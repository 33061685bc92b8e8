//! Selector Compiler
//!
//! Lowers a parsed selector group into match chains that are evaluated
//! right to left: the first step tests the candidate element itself, and
//! each step's combinator says where to look for the next one.

use super::parser::{self, AttrOp, Combinator, Complex, Component, Pseudo, SelectorList};
use crate::error::Result;

/// Compiled selector
///
/// Immutable once built and cheap to share behind an `Arc`. Two selectors
/// compiled from the same text behave identically.
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    pub(crate) chains: Vec<Chain>,
}

/// One alternative of a selector group, rightmost compound first
#[derive(Debug, Clone)]
pub(crate) struct Chain {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub tests: Vec<Test>,
    /// How to reach the element tested by the next step; None on the last step
    pub combinator: Option<Combinator>,
}

/// A single check against one element
#[derive(Debug, Clone)]
pub(crate) enum Test {
    Tag(String),
    Id(String),
    Class(String),
    HasAttribute(String),
    Attribute(String, AttrOp, String),
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
    Not(Vec<Chain>),
}

impl Test {
    /// Lower numbers run first; id and tag checks reject most elements cheaply
    fn cost(&self) -> u8 {
        match self {
            Test::Id(_) => 0,
            Test::Tag(_) => 1,
            Test::Class(_) => 2,
            Test::HasAttribute(_) | Test::Attribute(..) => 3,
            Test::Root => 4,
            Test::FirstChild | Test::LastChild | Test::OnlyChild | Test::Empty => 5,
            Test::Not(_) => 6,
        }
    }
}

impl Selector {
    /// Compile selector text
    pub fn compile(source: &str) -> Result<Self> {
        let list = parser::parse(source)?;
        Ok(Selector {
            source: source.to_string(),
            chains: compile_list(&list),
        })
    }

    /// The text this selector was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn compile_list(list: &SelectorList) -> Vec<Chain> {
    list.0.iter().map(compile_complex).collect()
}

fn compile_complex(complex: &Complex) -> Chain {
    let steps = complex
        .compounds
        .iter()
        .enumerate()
        .rev()
        .map(|(i, compound)| {
            let mut tests: Vec<Test> = compound
                .tag
                .iter()
                .map(|tag| Test::Tag(tag.to_ascii_lowercase()))
                .chain(compound.components.iter().map(compile_component))
                .collect();
            tests.sort_by_key(Test::cost);

            // combinators[i - 1] joins compounds[i - 1] and compounds[i]
            let combinator = i.checked_sub(1).map(|j| complex.combinators[j]);
            Step { tests, combinator }
        })
        .collect();

    Chain { steps }
}

fn compile_component(component: &Component) -> Test {
    match component {
        Component::Id(id) => Test::Id(id.clone()),
        Component::Class(class) => Test::Class(class.clone()),
        Component::Attribute { name, value: None } => Test::HasAttribute(name.clone()),
        Component::Attribute {
            name,
            value: Some((op, value)),
        } => Test::Attribute(name.clone(), *op, value.clone()),
        Component::Pseudo(pseudo) => match pseudo {
            Pseudo::FirstChild => Test::FirstChild,
            Pseudo::LastChild => Test::LastChild,
            Pseudo::OnlyChild => Test::OnlyChild,
            Pseudo::Empty => Test::Empty,
            Pseudo::Root => Test::Root,
            Pseudo::Not(inner) => Test::Not(compile_list(inner)),
        },
    }
}

/// Compile a selector string
pub fn compile(source: &str) -> Result<Selector> {
    Selector::compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple() {
        let compiled = compile("div").unwrap();
        assert_eq!(compiled.source(), "div");
        assert_eq!(compiled.chains.len(), 1);
        assert!(matches!(compiled.chains[0].steps[0].tests[0], Test::Tag(ref t) if t == "div"));
    }

    #[test]
    fn test_compile_reverses_steps() {
        let compiled = compile("ul > li.item").unwrap();
        let steps = &compiled.chains[0].steps;
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].combinator, Some(Combinator::Child));
        assert!(steps[1].combinator.is_none());
        assert!(matches!(steps[1].tests[0], Test::Tag(ref t) if t == "ul"));
    }

    #[test]
    fn test_compile_orders_cheap_tests_first() {
        let compiled = compile("P:first-child.lead#intro").unwrap();
        let tests = &compiled.chains[0].steps[0].tests;
        assert!(matches!(tests[0], Test::Id(_)));
        assert!(matches!(tests[1], Test::Tag(ref t) if t == "p"));
        assert!(matches!(tests[2], Test::Class(_)));
        assert!(matches!(tests[3], Test::FirstChild));
    }

    #[test]
    fn test_compile_error() {
        let err = compile("div >").unwrap_err();
        assert_eq!(err.selector, "div >");
    }
}
