//! Selection chains
//!
//! A `Selection` is an immutable, ordered, duplicate-free set of nodes of
//! one document. Every traversal or filter returns a new Selection that
//! remembers the one it was derived from, so `end()` can step back along
//! the chain.
//!
//! Operations taking a `Matcher` return `Result` because selector text may
//! fail to compile. Each has a `*_compiled` twin taking a `Selector`,
//! which cannot fail.

use std::sync::Arc;

use tracing::trace;

use super::axes::{self, SiblingKind};
use super::dedup::{merge, NodeMerger};
use super::matcher::{Matcher, Resolved};
use crate::dom::{Document, NodeId, DOCUMENT_NODE};
use crate::error::Result;
use crate::selector::{PredicateCache, Selector};

/// Ordered node set with a link to the Selection it was derived from
///
/// Cloning is cheap and preserves identity (`ptr_eq`).
#[derive(Clone)]
pub struct Selection {
    inner: Arc<Inner>,
}

struct Inner {
    nodes: Vec<NodeId>,
    document: Arc<Document>,
    cache: Arc<PredicateCache>,
    prev: Option<Selection>,
}

impl Selection {
    /// Select `nodes` of `document`, resolving selector text through the
    /// process-wide cache
    pub fn new<I: IntoIterator<Item = NodeId>>(document: Arc<Document>, nodes: I) -> Self {
        Self::with_cache(document, nodes, Arc::clone(PredicateCache::global()))
    }

    pub fn with_cache<I: IntoIterator<Item = NodeId>>(
        document: Arc<Document>,
        nodes: I,
        cache: Arc<PredicateCache>,
    ) -> Self {
        let mut merger = NodeMerger::new();
        merger.extend(nodes);
        Self::build(merger.into_nodes(), document, cache, None)
    }

    /// Root Selection holding only the document node
    pub fn from_document(document: Arc<Document>) -> Self {
        Self::new(document, [DOCUMENT_NODE])
    }

    pub fn from_document_with_cache(document: Arc<Document>, cache: Arc<PredicateCache>) -> Self {
        Self::with_cache(document, [DOCUMENT_NODE], cache)
    }

    fn build(
        nodes: Vec<NodeId>,
        document: Arc<Document>,
        cache: Arc<PredicateCache>,
        prev: Option<Selection>,
    ) -> Self {
        Selection {
            inner: Arc::new(Inner {
                nodes,
                document,
                cache,
                prev,
            }),
        }
    }

    /// New Selection over `nodes` whose back-link is `self`
    fn derive(&self, op: &'static str, nodes: Vec<NodeId>) -> Selection {
        trace!(op, from = self.len(), to = nodes.len(), "derived selection");
        Self::build(
            nodes,
            Arc::clone(&self.inner.document),
            Arc::clone(&self.inner.cache),
            Some(self.clone()),
        )
    }

    fn resolve<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Resolved<'a>> {
        matcher.into().resolve(&self.inner.cache)
    }

    /// Like `resolve`, but empty selector text means no condition
    fn resolve_optional<'a>(
        &self,
        matcher: impl Into<Matcher<'a>>,
    ) -> Result<Option<Resolved<'a>>> {
        match matcher.into() {
            Matcher::Selector("") => Ok(None),
            matcher => matcher.resolve(&self.inner.cache).map(Some),
        }
    }

    /// Run a per-node traversal over every node and merge the batches,
    /// then keep what passes `filter`
    fn collect<F>(&self, filter: Option<&Resolved<'_>>, per_node: F) -> Vec<NodeId>
    where
        F: Fn(&Document, NodeId) -> Vec<NodeId>,
    {
        let doc = self.inner.document.as_ref();
        let nodes = merge(self.inner.nodes.iter().map(|&id| per_node(doc, id)));
        match filter {
            Some(condition) => condition.winnow(doc, nodes),
            None => nodes,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn nodes(&self) -> &[NodeId] {
        &self.inner.nodes
    }

    pub fn len(&self) -> usize {
        self.inner.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.inner.nodes.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.nodes.iter().copied()
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.inner.document
    }

    pub fn cache(&self) -> &Arc<PredicateCache> {
        &self.inner.cache
    }

    /// Whether this Selection was derived from another one
    pub fn has_previous(&self) -> bool {
        self.inner.prev.is_some()
    }

    /// Same Selection value, not merely the same nodes
    pub fn ptr_eq(&self, other: &Selection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The Selection this one was derived from. A root Selection yields an
    /// empty Selection over the same document.
    pub fn end(&self) -> Selection {
        match &self.inner.prev {
            Some(prev) => prev.clone(),
            None => Self::build(
                Vec::new(),
                Arc::clone(&self.inner.document),
                Arc::clone(&self.inner.cache),
                None,
            ),
        }
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// Nodes of this Selection that match
    pub fn filter<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        Ok(self.filter_by(&self.resolve(matcher)?))
    }

    pub fn filter_compiled(&self, selector: &Selector) -> Selection {
        self.filter_by(&Resolved::Borrowed(selector))
    }

    fn filter_by(&self, condition: &Resolved<'_>) -> Selection {
        let nodes = condition.winnow(self.inner.document.as_ref(), self.inner.nodes.clone());
        self.derive("filter", nodes)
    }

    /// Whether any node of this Selection matches
    pub fn is<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<bool> {
        Ok(self.is_by(&self.resolve(matcher)?))
    }

    pub fn is_compiled(&self, selector: &Selector) -> bool {
        self.is_by(&Resolved::Borrowed(selector))
    }

    fn is_by(&self, condition: &Resolved<'_>) -> bool {
        let doc = self.inner.document.as_ref();
        self.iter().any(|id| condition.test(doc, id))
    }

    // ------------------------------------------------------------------
    // Descendants
    // ------------------------------------------------------------------

    /// Matching descendants of each node; a node is never its own match.
    /// Empty selector text finds nothing.
    pub fn find<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        Ok(match self.resolve_optional(matcher)? {
            Some(condition) => self.find_by(&condition),
            None => self.derive("find", Vec::new()),
        })
    }

    pub fn find_compiled(&self, selector: &Selector) -> Selection {
        self.find_by(&Resolved::Borrowed(selector))
    }

    fn find_by(&self, condition: &Resolved<'_>) -> Selection {
        let nodes = self.collect(None, |doc, id| axes::find(doc, id, condition));
        self.derive("find", nodes)
    }

    /// Element children
    pub fn children(&self) -> Selection {
        self.children_by("children", None)
    }

    pub fn children_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        Ok(self.children_by("children_filtered", Some(&self.resolve(matcher)?)))
    }

    pub fn children_filtered_compiled(&self, selector: &Selector) -> Selection {
        self.children_by("children_filtered", Some(&Resolved::Borrowed(selector)))
    }

    fn children_by(&self, op: &'static str, filter: Option<&Resolved<'_>>) -> Selection {
        let nodes = self.collect(filter, |doc, id| axes::children(doc, id));
        self.derive(op, nodes)
    }

    /// All children, text and comment nodes included
    pub fn contents(&self) -> Selection {
        self.contents_by("contents", None)
    }

    /// Empty selector text keeps every child, as `contents` does
    pub fn contents_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        let filter = self.resolve_optional(matcher)?;
        Ok(self.contents_by("contents_filtered", filter.as_ref()))
    }

    pub fn contents_filtered_compiled(&self, selector: &Selector) -> Selection {
        self.contents_by("contents_filtered", Some(&Resolved::Borrowed(selector)))
    }

    fn contents_by(&self, op: &'static str, filter: Option<&Resolved<'_>>) -> Selection {
        let nodes = self.collect(filter, |doc, id| axes::contents(doc, id));
        self.derive(op, nodes)
    }

    // ------------------------------------------------------------------
    // Ancestors
    // ------------------------------------------------------------------

    /// Element parent of each node
    pub fn parent(&self) -> Selection {
        self.parent_by("parent", None)
    }

    pub fn parent_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        Ok(self.parent_by("parent_filtered", Some(&self.resolve(matcher)?)))
    }

    pub fn parent_filtered_compiled(&self, selector: &Selector) -> Selection {
        self.parent_by("parent_filtered", Some(&Resolved::Borrowed(selector)))
    }

    fn parent_by(&self, op: &'static str, filter: Option<&Resolved<'_>>) -> Selection {
        let nodes = self.collect(filter, |doc, id| axes::parent(doc, id).into_iter().collect());
        self.derive(op, nodes)
    }

    /// Element ancestors of each node, nearest first
    pub fn parents(&self) -> Selection {
        self.parents_by("parents", None, None)
    }

    pub fn parents_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        Ok(self.parents_by("parents_filtered", Some(&self.resolve(matcher)?), None))
    }

    pub fn parents_filtered_compiled(&self, selector: &Selector) -> Selection {
        self.parents_by("parents_filtered", Some(&Resolved::Borrowed(selector)), None)
    }

    /// Ancestors up to, but not including, the first one that matches.
    /// Empty selector text sets no boundary.
    pub fn parents_until<'a>(&self, until: impl Into<Matcher<'a>>) -> Result<Selection> {
        let until = self.resolve_optional(until)?;
        Ok(self.parents_by("parents_until", None, until.as_ref()))
    }

    pub fn parents_until_compiled(&self, until: &Selector) -> Selection {
        self.parents_by("parents_until", None, Some(&Resolved::Borrowed(until)))
    }

    pub fn parents_filtered_until<'a, 'b>(
        &self,
        filter: impl Into<Matcher<'a>>,
        until: impl Into<Matcher<'b>>,
    ) -> Result<Selection> {
        let filter = self.resolve(filter)?;
        let until = self.resolve_optional(until)?;
        Ok(self.parents_by("parents_filtered_until", Some(&filter), until.as_ref()))
    }

    pub fn parents_filtered_until_compiled(&self, filter: &Selector, until: &Selector) -> Selection {
        self.parents_by(
            "parents_filtered_until",
            Some(&Resolved::Borrowed(filter)),
            Some(&Resolved::Borrowed(until)),
        )
    }

    fn parents_by(
        &self,
        op: &'static str,
        filter: Option<&Resolved<'_>>,
        until: Option<&Resolved<'_>>,
    ) -> Selection {
        let nodes = self.collect(filter, |doc, id| axes::parents(doc, id, until));
        self.derive(op, nodes)
    }

    /// Nearest of {node, ancestors} that matches, per node
    pub fn closest<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        Ok(self.closest_by(&self.resolve(matcher)?))
    }

    pub fn closest_compiled(&self, selector: &Selector) -> Selection {
        self.closest_by(&Resolved::Borrowed(selector))
    }

    fn closest_by(&self, condition: &Resolved<'_>) -> Selection {
        let nodes = self.collect(None, |doc, id| {
            axes::closest(doc, id, condition).into_iter().collect()
        });
        self.derive("closest", nodes)
    }

    // ------------------------------------------------------------------
    // Siblings
    // ------------------------------------------------------------------

    /// Element siblings of each node, excluding the node itself
    pub fn siblings(&self) -> Selection {
        self.siblings_by("siblings", SiblingKind::All, None, None)
    }

    pub fn siblings_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        let filter = self.resolve(matcher)?;
        Ok(self.siblings_by("siblings_filtered", SiblingKind::All, Some(&filter), None))
    }

    pub fn siblings_filtered_compiled(&self, selector: &Selector) -> Selection {
        let filter = Resolved::Borrowed(selector);
        self.siblings_by("siblings_filtered", SiblingKind::All, Some(&filter), None)
    }

    /// Next element sibling of each node
    pub fn next(&self) -> Selection {
        self.siblings_by("next", SiblingKind::Next, None, None)
    }

    pub fn next_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        let filter = self.resolve(matcher)?;
        Ok(self.siblings_by("next_filtered", SiblingKind::Next, Some(&filter), None))
    }

    pub fn next_filtered_compiled(&self, selector: &Selector) -> Selection {
        let filter = Resolved::Borrowed(selector);
        self.siblings_by("next_filtered", SiblingKind::Next, Some(&filter), None)
    }

    /// All following element siblings
    pub fn next_all(&self) -> Selection {
        self.siblings_by("next_all", SiblingKind::NextAll, None, None)
    }

    pub fn next_all_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        let filter = self.resolve(matcher)?;
        Ok(self.siblings_by("next_all_filtered", SiblingKind::NextAll, Some(&filter), None))
    }

    pub fn next_all_filtered_compiled(&self, selector: &Selector) -> Selection {
        let filter = Resolved::Borrowed(selector);
        self.siblings_by("next_all_filtered", SiblingKind::NextAll, Some(&filter), None)
    }

    /// Following element siblings up to, but not including, the first match.
    /// Empty selector text sets no boundary.
    pub fn next_until<'a>(&self, until: impl Into<Matcher<'a>>) -> Result<Selection> {
        let until = self.resolve_optional(until)?;
        Ok(self.siblings_by("next_until", SiblingKind::NextUntil, None, until.as_ref()))
    }

    pub fn next_until_compiled(&self, until: &Selector) -> Selection {
        let until = Resolved::Borrowed(until);
        self.siblings_by("next_until", SiblingKind::NextUntil, None, Some(&until))
    }

    pub fn next_filtered_until<'a, 'b>(
        &self,
        filter: impl Into<Matcher<'a>>,
        until: impl Into<Matcher<'b>>,
    ) -> Result<Selection> {
        let filter = self.resolve(filter)?;
        let until = self.resolve_optional(until)?;
        Ok(self.siblings_by(
            "next_filtered_until",
            SiblingKind::NextUntil,
            Some(&filter),
            until.as_ref(),
        ))
    }

    pub fn next_filtered_until_compiled(&self, filter: &Selector, until: &Selector) -> Selection {
        self.siblings_by(
            "next_filtered_until",
            SiblingKind::NextUntil,
            Some(&Resolved::Borrowed(filter)),
            Some(&Resolved::Borrowed(until)),
        )
    }

    /// Previous element sibling of each node
    pub fn prev(&self) -> Selection {
        self.siblings_by("prev", SiblingKind::Prev, None, None)
    }

    pub fn prev_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        let filter = self.resolve(matcher)?;
        Ok(self.siblings_by("prev_filtered", SiblingKind::Prev, Some(&filter), None))
    }

    pub fn prev_filtered_compiled(&self, selector: &Selector) -> Selection {
        let filter = Resolved::Borrowed(selector);
        self.siblings_by("prev_filtered", SiblingKind::Prev, Some(&filter), None)
    }

    /// All preceding element siblings, nearest first
    pub fn prev_all(&self) -> Selection {
        self.siblings_by("prev_all", SiblingKind::PrevAll, None, None)
    }

    pub fn prev_all_filtered<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Result<Selection> {
        let filter = self.resolve(matcher)?;
        Ok(self.siblings_by("prev_all_filtered", SiblingKind::PrevAll, Some(&filter), None))
    }

    pub fn prev_all_filtered_compiled(&self, selector: &Selector) -> Selection {
        let filter = Resolved::Borrowed(selector);
        self.siblings_by("prev_all_filtered", SiblingKind::PrevAll, Some(&filter), None)
    }

    /// Preceding element siblings up to, but not including, the first match.
    /// Empty selector text sets no boundary.
    pub fn prev_until<'a>(&self, until: impl Into<Matcher<'a>>) -> Result<Selection> {
        let until = self.resolve_optional(until)?;
        Ok(self.siblings_by("prev_until", SiblingKind::PrevUntil, None, until.as_ref()))
    }

    pub fn prev_until_compiled(&self, until: &Selector) -> Selection {
        let until = Resolved::Borrowed(until);
        self.siblings_by("prev_until", SiblingKind::PrevUntil, None, Some(&until))
    }

    pub fn prev_filtered_until<'a, 'b>(
        &self,
        filter: impl Into<Matcher<'a>>,
        until: impl Into<Matcher<'b>>,
    ) -> Result<Selection> {
        let filter = self.resolve(filter)?;
        let until = self.resolve_optional(until)?;
        Ok(self.siblings_by(
            "prev_filtered_until",
            SiblingKind::PrevUntil,
            Some(&filter),
            until.as_ref(),
        ))
    }

    pub fn prev_filtered_until_compiled(&self, filter: &Selector, until: &Selector) -> Selection {
        self.siblings_by(
            "prev_filtered_until",
            SiblingKind::PrevUntil,
            Some(&Resolved::Borrowed(filter)),
            Some(&Resolved::Borrowed(until)),
        )
    }

    fn siblings_by(
        &self,
        op: &'static str,
        kind: SiblingKind,
        filter: Option<&Resolved<'_>>,
        until: Option<&Resolved<'_>>,
    ) -> Selection {
        let nodes = self.collect(filter, |doc, id| axes::siblings(doc, id, kind, until));
        self.derive(op, nodes)
    }
}

impl Drop for Inner {
    // Unlink the back-link chain iteratively; long `s = s.next()` walks
    // would otherwise recurse once per link on drop.
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(selection) = prev {
            prev = match Arc::into_inner(selection.inner) {
                Some(mut inner) => inner.prev.take(),
                None => None,
            };
        }
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("nodes", &self.inner.nodes)
            .field("has_previous", &self.has_previous())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentBuilder;
    use crate::query::fixtures::{id_of, ids, list_doc, page_doc, root};

    fn by_id(doc: Document, id: &str) -> Selection {
        let node = id_of(&doc, id);
        Selection::with_cache(Arc::new(doc), [node], Arc::new(PredicateCache::new()))
    }

    #[test]
    fn test_constructor_dedups() {
        let doc = Arc::new(list_doc());
        let s1 = id_of(&doc, "s1");
        let s2 = id_of(&doc, "s2");
        let sel = Selection::with_cache(doc, [s2, s1, s2], Arc::new(PredicateCache::new()));
        assert_eq!(sel.nodes(), &[s2, s1]);
        assert!(!sel.has_previous());
    }

    #[test]
    fn test_new_uses_global_cache() {
        let sel = Selection::from_document(Arc::new(list_doc()));
        assert!(Arc::ptr_eq(sel.cache(), PredicateCache::global()));
        assert_eq!(sel.get(0), Some(DOCUMENT_NODE));
    }

    #[test]
    fn test_find() {
        let sel = root(page_doc()).find("div.row-fluid").unwrap();
        assert_eq!(ids(&sel), vec!["r1", "r2", "g2"]);
    }

    #[test]
    fn test_find_compiled_same_as_text() {
        let doc = root(page_doc());
        let compiled = Selector::compile("div.row-fluid").unwrap();
        let a = doc.find("div.row-fluid").unwrap();
        let b = doc.find(&compiled).unwrap();
        assert_eq!(a.nodes(), b.nodes());
    }

    #[test]
    fn test_find_not_self() {
        let sel = root(page_doc()).find("h1").unwrap().find("h1").unwrap();
        assert!(sel.is_empty());

        let sel = by_id(page_doc(), "lead").find("#lead").unwrap();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_chained_find() {
        let sel = root(page_doc())
            .find("div.hero-unit")
            .unwrap()
            .find(".row-fluid")
            .unwrap();
        assert_eq!(ids(&sel), vec!["r2"]);
    }

    #[test]
    fn test_find_source_order() {
        let doc = root(page_doc());
        let sources = Selection::with_cache(
            Arc::clone(doc.document()),
            [id_of(doc.document(), "hero"), id_of(doc.document(), "cf1")],
            Arc::clone(doc.cache()),
        );

        // hero's matches come first; cf1 only adds what hero did not find
        let found = sources.find("div").unwrap();
        assert_eq!(
            ids(&found),
            vec!["cf2", "r2", "r1", "g1", "content", "hero", "g2"]
        );
    }

    #[test]
    fn test_find_node_set() {
        let doc = root(page_doc());
        let paragraphs = doc.find("p").unwrap();
        let found = doc.find("#hero").unwrap().find(&paragraphs).unwrap();
        assert_eq!(ids(&found), vec!["lead"]);
    }

    #[test]
    fn test_find_node_set_groups_by_source() {
        let mut b = DocumentBuilder::new();
        b.open("ul", &[("id", "a")]);
        b.leaf("li", &[("id", "a1")]);
        b.close();
        b.open("ul", &[("id", "b")]);
        b.leaf("li", &[("id", "b1")]);
        b.close();
        let doc = root(b.finish());

        let [a1, b1] = ["a1", "b1"].map(|id| id_of(doc.document(), id));
        let candidates = [b1, a1];
        let found = doc.find("ul").unwrap().find(&candidates[..]).unwrap();
        assert_eq!(ids(&found), vec!["a1", "b1"]);
    }

    #[test]
    fn test_find_invalid_selector() {
        let doc = root(page_doc());
        let err = doc.find(":+ ^").unwrap_err();
        assert_eq!(err.selector, ":+ ^");
        assert!(doc.cache().is_empty());
    }

    #[test]
    fn test_children_and_contents() {
        let content = by_id(page_doc(), "content");
        assert_eq!(ids(&content.children()), vec!["hero", "foot"]);
        assert_eq!(content.contents().len(), 4);
        assert_eq!(ids(&content.children_filtered(".hero-unit").unwrap()), vec!["hero"]);
        assert_eq!(ids(&content.contents_filtered(".hero-unit").unwrap()), vec!["hero"]);
        assert!(content.children_filtered("a.btn").unwrap().is_empty());
    }

    #[test]
    fn test_parent() {
        let doc = root(page_doc());
        let sel = doc.find(".container-fluid").unwrap().parent();
        assert_eq!(ids(&sel), vec!["?", "hero"]);

        let filtered = doc
            .find(".container-fluid")
            .unwrap()
            .parent_filtered(".hero-unit")
            .unwrap();
        assert_eq!(ids(&filtered), vec!["hero"]);
    }

    #[test]
    fn test_parent_of_root_element_is_empty() {
        let sel = root(page_doc()).find("html").unwrap().parent();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_shared_parent_once() {
        let doc = root(list_doc());
        let sel = doc.find("#s1, #s2").unwrap().parent();
        assert_eq!(ids(&sel), vec!["list"]);
    }

    #[test]
    fn test_parents_order() {
        let sel = by_id(page_doc(), "cf2").parents();
        assert_eq!(
            ids(&sel),
            vec!["hero", "content", "g1", "r1", "cf1", "?", "?"]
        );
        assert_eq!(sel.document().node_name(sel.nodes()[6]), Some("html"));
    }

    #[test]
    fn test_parents_merge() {
        let sel = root(page_doc()).find(".container-fluid").unwrap().parents();
        // body and html are shared, so they appear once at their first position
        assert_eq!(sel.len(), 7);
        assert_eq!(
            ids(&sel),
            vec!["?", "?", "hero", "content", "g1", "r1", "cf1"]
        );
    }

    #[test]
    fn test_parents_filtered_and_until() {
        let doc = root(page_doc());
        let fluid = doc.find(".container-fluid").unwrap();

        assert_eq!(fluid.parents_filtered("body").unwrap().len(), 1);
        assert_eq!(
            ids(&fluid.parents_until("#content").unwrap()),
            vec!["?", "?", "hero"]
        );

        let cf2 = doc.find("#cf2").unwrap();
        let sel = cf2
            .parents_filtered_until(".hero-unit, .span12", "body")
            .unwrap();
        assert_eq!(ids(&sel), vec!["hero", "g1"]);
    }

    #[test]
    fn test_parents_until_unmatched_reaches_root() {
        let cf2 = by_id(page_doc(), "cf2");
        assert_eq!(cf2.parents_until("#missing").unwrap().len(), 7);
    }

    #[test]
    fn test_parents_until_node_set() {
        let doc = root(page_doc());
        let boundary = doc.find("#g1").unwrap();
        let sel = doc.find("#cf2").unwrap().parents_until(&boundary).unwrap();
        assert_eq!(ids(&sel), vec!["hero", "content"]);
    }

    #[test]
    fn test_closest() {
        let doc = root(page_doc());
        let rows = doc.find("#r1, #r2").unwrap();
        assert_eq!(ids(&rows.closest(".row-fluid").unwrap()), vec!["r1", "r2"]);

        let text = doc.find("#title, #lead").unwrap();
        assert_eq!(ids(&text.closest(".container-fluid").unwrap()), vec!["cf2"]);
        assert!(text.closest("table").unwrap().is_empty());

        let hero = doc.find("#hero").unwrap();
        assert_eq!(ids(&text.closest(&hero).unwrap()), vec!["hero"]);
    }

    #[test]
    fn test_siblings() {
        let doc = root(list_doc());
        let s3 = doc.find("#s3").unwrap();
        assert_eq!(ids(&s3.siblings()), vec!["s1", "s2", "s4"]);

        let s1 = doc.find("#s1").unwrap();
        assert_eq!(ids(&s1.siblings_filtered(".odd").unwrap()), vec!["s3"]);
    }

    #[test]
    fn test_next_and_prev() {
        let doc = root(list_doc());
        let s2 = doc.find("#s2").unwrap();
        assert_eq!(ids(&s2.next()), vec!["s3"]);
        assert_eq!(ids(&s2.prev()), vec!["s1"]);
        assert_eq!(ids(&s2.prev_filtered("#s1").unwrap()), vec!["s1"]);
        assert!(s2.next_filtered("#s4").unwrap().is_empty());

        let s4 = doc.find("#s4").unwrap();
        assert!(s4.next().is_empty());
        assert_eq!(ids(&s4.prev_all()), vec!["s3", "s2", "s1"]);
        assert_eq!(ids(&s4.prev_all_filtered(".odd").unwrap()), vec!["s3"]);

        let s1 = doc.find("#s1").unwrap();
        assert_eq!(ids(&s1.next_all()), vec!["s2", "s3", "s4"]);
        assert_eq!(ids(&s1.next_all_filtered(".last").unwrap()), vec!["s4"]);
    }

    #[test]
    fn test_next_until() {
        let doc = root(list_doc());
        let s1 = doc.find("#s1").unwrap();
        assert_eq!(ids(&s1.next_until("#s4").unwrap()), vec!["s2", "s3"]);
        assert_eq!(ids(&s1.next_until("#nope").unwrap()), vec!["s2", "s3", "s4"]);

        let compiled = Selector::compile(".odd").unwrap();
        assert_eq!(ids(&s1.next_until(&compiled).unwrap()), vec!["s2"]);

        let s4 = doc.find("#s4").unwrap();
        assert_eq!(ids(&s1.next_until(&s4).unwrap()), vec!["s2", "s3"]);
    }

    #[test]
    fn test_prev_until() {
        let doc = root(list_doc());
        let s4 = doc.find("#s4").unwrap();
        assert_eq!(ids(&s4.prev_until("#s1").unwrap()), vec!["s3", "s2"]);
        assert_eq!(
            ids(&s4.prev_filtered_until(".item", "#s1").unwrap()),
            vec!["s3", "s2"]
        );
        assert_eq!(
            ids(&s4.prev_filtered_until("#s2", "#s3").unwrap()),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_next_filtered_until() {
        let doc = root(list_doc());
        let s1 = doc.find("#s1").unwrap();
        assert_eq!(ids(&s1.next_filtered_until(".odd", "#s4").unwrap()), vec!["s3"]);
    }

    #[test]
    fn test_filter_and_is() {
        let doc = root(page_doc());
        let paragraphs = doc.find("p").unwrap();
        assert_eq!(ids(&paragraphs.filter(".footer").unwrap()), vec!["foot"]);
        assert!(paragraphs.is(".lead").unwrap());
        assert!(!paragraphs.is("div").unwrap());
        assert!(paragraphs.is(":+ ^").is_err());
    }

    #[test]
    fn test_invalid_selector_fails_every_matcher_op() {
        let doc = root(list_doc());
        let s1 = doc.find("#s1").unwrap();
        let bad = "li >";
        assert!(s1.filter(bad).is_err());
        assert!(s1.children_filtered(bad).is_err());
        assert!(s1.contents_filtered(bad).is_err());
        assert!(s1.parent_filtered(bad).is_err());
        assert!(s1.parents_filtered(bad).is_err());
        assert!(s1.parents_until(bad).is_err());
        assert!(s1.parents_filtered_until("ul", bad).is_err());
        assert!(s1.siblings_filtered(bad).is_err());
        assert!(s1.next_filtered(bad).is_err());
        assert!(s1.next_all_filtered(bad).is_err());
        assert!(s1.next_until(bad).is_err());
        assert!(s1.next_filtered_until(bad, "li").is_err());
        assert!(s1.prev_filtered(bad).is_err());
        assert!(s1.prev_all_filtered(bad).is_err());
        assert!(s1.prev_until(bad).is_err());
        assert!(s1.prev_filtered_until("li", bad).is_err());
        assert!(s1.closest(bad).is_err());
    }

    #[test]
    fn test_rollback_identity() {
        let doc = root(list_doc());
        let sel = doc.find("#s2, #s3").unwrap();

        let ops: Vec<(&str, Selection)> = vec![
            ("find", sel.find("*").unwrap()),
            ("filter", sel.filter("li").unwrap()),
            ("children", sel.children()),
            ("children_filtered", sel.children_filtered("li").unwrap()),
            ("contents", sel.contents()),
            ("contents_filtered", sel.contents_filtered("li").unwrap()),
            ("parent", sel.parent()),
            ("parent_filtered", sel.parent_filtered("ul").unwrap()),
            ("parents", sel.parents()),
            ("parents_filtered", sel.parents_filtered("body").unwrap()),
            ("parents_until", sel.parents_until("html").unwrap()),
            ("parents_filtered_until", sel.parents_filtered_until("ul", "html").unwrap()),
            ("closest", sel.closest("ul").unwrap()),
            ("siblings", sel.siblings()),
            ("siblings_filtered", sel.siblings_filtered(".last").unwrap()),
            ("next", sel.next()),
            ("next_filtered", sel.next_filtered("li").unwrap()),
            ("next_all", sel.next_all()),
            ("next_all_filtered", sel.next_all_filtered("li").unwrap()),
            ("next_until", sel.next_until("#s4").unwrap()),
            ("next_filtered_until", sel.next_filtered_until("li", "#s4").unwrap()),
            ("prev", sel.prev()),
            ("prev_filtered", sel.prev_filtered("li").unwrap()),
            ("prev_all", sel.prev_all()),
            ("prev_all_filtered", sel.prev_all_filtered("li").unwrap()),
            ("prev_until", sel.prev_until("#s1").unwrap()),
            ("prev_filtered_until", sel.prev_filtered_until("li", "#s1").unwrap()),
        ];

        for (name, derived) in ops {
            assert!(derived.has_previous(), "{} has no back-link", name);
            assert!(!derived.ptr_eq(&sel), "{} returned its input", name);
            assert!(derived.end().ptr_eq(&sel), "{} does not roll back", name);
        }
    }

    #[test]
    fn test_compiled_variants_match_text_variants() {
        let doc = root(list_doc());
        let sel = doc.find("#s2").unwrap();
        let item = Selector::compile(".item").unwrap();
        let s4 = Selector::compile("#s4").unwrap();
        let s1 = Selector::compile("#s1").unwrap();

        assert_eq!(
            sel.next_filtered_until_compiled(&item, &s4).nodes(),
            sel.next_filtered_until(".item", "#s4").unwrap().nodes()
        );
        assert_eq!(ids(&sel.prev_until_compiled(&s1)), Vec::<String>::new());
        assert_eq!(ids(&sel.next_until_compiled(&s4)), vec!["s3"]);
        assert_eq!(ids(&sel.siblings_filtered_compiled(&s4)), vec!["s4"]);
        let ul = Selector::compile("ul").unwrap();
        assert_eq!(ids(&sel.parent_filtered_compiled(&ul)), vec!["list"]);
        assert!(sel.is_compiled(&item));
        assert!(sel.filter_compiled(&s1).is_empty());
        assert_eq!(doc.find_compiled(&item).len(), 4);

        let fresh = root(list_doc());
        assert_eq!(fresh.find_compiled(&item).children_filtered_compiled(&s1).len(), 0);
        assert!(fresh.cache().is_empty());

        let derived = sel.closest_compiled(&item);
        assert!(derived.end().ptr_eq(&sel));
    }

    #[test]
    fn test_empty_selector_text() {
        let doc = root(list_doc());
        let s1 = doc.find("#s1").unwrap();
        let s4 = doc.find("#s4").unwrap();

        assert!(doc.find("").unwrap().is_empty());
        assert!(doc.find("").unwrap().end().ptr_eq(&doc));
        assert_eq!(ids(&s1.next_until("").unwrap()), vec!["s2", "s3", "s4"]);
        assert_eq!(ids(&s4.prev_until("").unwrap()), vec!["s3", "s2", "s1"]);
        assert_eq!(s1.parents_until("").unwrap().len(), 3);
        assert_eq!(ids(&s1.next_filtered_until(".odd", "").unwrap()), vec!["s3"]);
        assert_eq!(ids(&s4.prev_filtered_until(".item", "").unwrap()), vec!["s3", "s2", "s1"]);
        assert_eq!(s1.parents_filtered_until("ul", "").unwrap().len(), 1);

        let list = doc.find("#list").unwrap();
        assert_eq!(
            list.contents_filtered("").unwrap().nodes(),
            list.contents().nodes()
        );

        // Pure filters still need a real selector
        assert!(s1.filter("").is_err());
        assert!(s1.children_filtered("").is_err());
        assert!(s1.next_filtered("").is_err());
        assert!(s1.closest("").is_err());
        assert!(s1.next_filtered_until("", "#s4").is_err());
        assert!(doc.cache().contains("#s1"));
        assert!(!doc.cache().contains(""));
    }

    #[test]
    fn test_long_chain_drop() {
        let mut b = DocumentBuilder::new();
        b.open("ul", &[]);
        for _ in 0..100_000 {
            b.leaf("li", &[]);
        }
        b.close();
        let doc = root(b.finish());

        let mut walk = doc.find("li:first-child").unwrap();
        let mut steps = 0;
        while !walk.is_empty() {
            walk = walk.next();
            steps += 1;
        }
        assert_eq!(steps, 100_000);
        drop(walk);

        // The root is still shared by the test, so unlinking stops there
        assert_eq!(doc.len(), 1);
        assert!(!doc.has_previous());
    }

    #[test]
    fn test_drop_keeps_shared_links() {
        let doc = root(list_doc());
        let s1 = doc.find("#s1").unwrap();
        let tail = s1.next().next().next();
        drop(tail);
        assert_eq!(ids(&s1), vec!["s1"]);
        assert!(s1.end().ptr_eq(&doc));
    }

    #[test]
    fn test_end_of_root_is_empty() {
        let doc = root(list_doc());
        let end = doc.end();
        assert!(end.is_empty());
        assert!(!end.has_previous());
        assert!(Arc::ptr_eq(end.document(), doc.document()));
        assert!(Arc::ptr_eq(end.cache(), doc.cache()));
    }

    #[test]
    fn test_filter_allocates_even_when_unchanged() {
        let doc = root(list_doc());
        let items = doc.find("li").unwrap();
        let same = items.filter("li").unwrap();
        assert_eq!(same.nodes(), items.nodes());
        assert!(!same.ptr_eq(&items));
        assert!(same.end().end().ptr_eq(&doc));
    }

    #[test]
    fn test_selector_text_is_cached() {
        let doc = root(list_doc());
        doc.find("li.item").unwrap();
        doc.find("li.item").unwrap();
        assert_eq!(doc.cache().len(), 1);
        assert!(doc.cache().contains("li.item"));
    }

    #[test]
    fn test_selection_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Selection>();
    }
}
