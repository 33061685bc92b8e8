//! Shared test documents

use std::sync::Arc;

use super::selection::Selection;
use crate::dom::{Document, DocumentBuilder, NodeId};
use crate::selector::PredicateCache;

/// Nested page layout
///
/// ```text
/// html
///   head > title
///   body
///     div#cf1.container-fluid
///       div#r1.row-fluid
///         div#g1.span12
///           div#content.pvk-content
///             "\n"
///             div#hero.hero-unit
///               div#cf2.container-fluid
///                 div#r2.row-fluid
///                   h1#title
///                   p#lead.lead
///             <!-- footer -->
///             p#foot.footer
///       div#g2.row-fluid
/// ```
pub fn page_doc() -> Document {
    let mut b = DocumentBuilder::new();
    b.open("html", &[]);

    b.open("head", &[]);
    b.open("title", &[]);
    b.text("Page");
    b.close();
    b.close();

    b.open("body", &[]);
    b.open("div", &[("id", "cf1"), ("class", "container-fluid")]);
    b.open("div", &[("id", "r1"), ("class", "row-fluid")]);
    b.open("div", &[("id", "g1"), ("class", "span12")]);
    b.open("div", &[("id", "content"), ("class", "pvk-content")]);
    b.text("\n");
    b.open("div", &[("id", "hero"), ("class", "hero-unit")]);
    b.open("div", &[("id", "cf2"), ("class", "container-fluid")]);
    b.open("div", &[("id", "r2"), ("class", "row-fluid")]);
    b.open("h1", &[("id", "title")]);
    b.text("Hello");
    b.close();
    b.open("p", &[("id", "lead"), ("class", "lead")]);
    b.text("Welcome");
    b.close();
    b.close(); // r2
    b.close(); // cf2
    b.close(); // hero
    b.comment(" footer ");
    b.leaf("p", &[("id", "foot"), ("class", "footer")]);
    b.close(); // content
    b.close(); // g1
    b.close(); // r1
    b.leaf("div", &[("id", "g2"), ("class", "row-fluid")]);
    b.close(); // cf1
    b.close(); // body

    b.close();
    b.finish()
}

/// html > body > ul#list holding li#s1..li#s4, with text and a comment
/// between them
pub fn list_doc() -> Document {
    let mut b = DocumentBuilder::new();
    b.open("html", &[]);
    b.open("body", &[]);
    b.open("ul", &[("id", "list")]);
    b.text("\n  ");
    b.leaf("li", &[("id", "s1"), ("class", "item")]);
    b.comment("two");
    b.leaf("li", &[("id", "s2"), ("class", "item")]);
    b.text("\n  ");
    b.leaf("li", &[("id", "s3"), ("class", "item odd")]);
    b.leaf("li", &[("id", "s4"), ("class", "item last")]);
    b.close();
    b.close();
    b.close();
    b.finish()
}

/// Element with the given `id` attribute
pub fn id_of(doc: &Document, id: &str) -> NodeId {
    doc.element_by_id(id)
        .unwrap_or_else(|| panic!("fixture has no #{}", id))
}

/// Root Selection over `doc` with a private cache
pub fn root(doc: Document) -> Selection {
    Selection::from_document_with_cache(Arc::new(doc), Arc::new(PredicateCache::new()))
}

/// `id` attributes of the selected nodes, "?" for nodes without one
pub fn ids(selection: &Selection) -> Vec<String> {
    selection
        .iter()
        .map(|id| {
            selection
                .document()
                .get_attribute(id, "id")
                .unwrap_or("?")
                .to_string()
        })
        .collect()
}
