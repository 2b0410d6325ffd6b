//! Helpers over the `scraper` element tree.
//!
//! The resolution engine never owns the tree: it walks `ElementRef`s borrowed
//! from a parsed [`Html`] document and asks a [`HiddenOracle`] whether an
//! element is visually hidden. Everything here is a pure query.

use scraper::{ElementRef, Html, Node};

/// Ancestor walks are bounded so a pathological tree cannot stall resolution.
const ANCESTOR_SEARCH_MAX: usize = 100;

/// Answers "is this element visually hidden?" for a resolution pass.
///
/// Real visibility needs computed styles, which a static parse cannot supply;
/// callers embedding a layout engine can provide their own oracle.
pub trait HiddenOracle {
    fn is_hidden(&self, element: &ElementRef) -> bool;
}

/// Default oracle: inline `style` display/visibility plus the `hidden`
/// attribute. Good enough for static documents where styles are inlined.
#[derive(Debug, Default)]
pub struct StyleHidden;

impl HiddenOracle for StyleHidden {
    fn is_hidden(&self, element: &ElementRef) -> bool {
        let el = element.value();
        if el.attr("hidden").is_some() {
            return true;
        }
        if let Some(style) = el.attr("style") {
            let s = style.to_lowercase();
            if s.contains("display:none")
                || s.contains("display: none")
                || s.contains("visibility:hidden")
                || s.contains("visibility: hidden")
            {
                return true;
            }
        }
        false
    }
}

pub fn tag_name<'a>(element: &ElementRef<'a>) -> &'a str {
    element.value().name()
}

/// `aria-hidden` is a plain attribute check, independent of computed styles.
pub fn is_aria_hidden(element: &ElementRef) -> bool {
    element.value().attr("aria-hidden") == Some("true")
}

pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Whether the element sits in an SVG subtree (the element itself included).
pub fn is_svg_scoped(element: &ElementRef) -> bool {
    let mut current = Some(*element);
    while let Some(el) = current {
        if tag_name(&el) == "svg" {
            return true;
        }
        current = parent_element(&el);
    }
    false
}

/// Walk upward from `element` (inclusive), returning the first ancestor the
/// predicate accepts. The walk stops before `<html>` and after a fixed number
/// of levels.
pub fn search_ancestors<'a, F>(element: &ElementRef<'a>, predicate: F) -> Option<ElementRef<'a>>
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    let mut current = Some(*element);
    for _ in 0..ANCESTOR_SEARCH_MAX {
        let el = current?;
        if tag_name(&el) == "html" {
            return None;
        }
        if predicate(&el) {
            return Some(el);
        }
        current = parent_element(&el);
    }
    None
}

/// Depth-first search over descendants (self excluded), first match wins.
pub fn find_descendant<'a, F>(element: &ElementRef<'a>, predicate: &F) -> Option<ElementRef<'a>>
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if predicate(&child_el) {
                return Some(child_el);
            }
            if let Some(found) = find_descendant(&child_el, predicate) {
                return Some(found);
            }
        }
    }
    None
}

/// Document-wide id lookup, the resolution target of `aria-labelledby` and
/// `label[for]`. First element in document order wins, like
/// `getElementById`.
pub fn lookup_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let root = document.root_element();
    if root.value().attr("id") == Some(id) {
        return Some(root);
    }
    find_descendant(&root, &|el: &ElementRef| el.value().attr("id") == Some(id))
}

/// All elements matching a predicate, in document order.
pub fn find_all<'a, F>(document: &'a Html, predicate: F) -> Vec<ElementRef<'a>>
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    let mut out = Vec::new();
    collect_matching(&document.root_element(), &predicate, &mut out);
    out
}

fn collect_matching<'a, F>(element: &ElementRef<'a>, predicate: &F, out: &mut Vec<ElementRef<'a>>)
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    if predicate(element) {
        out.push(*element);
    }
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            collect_matching(&child_el, predicate, out);
        }
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The element's raw text content, whitespace-collapsed. Used for
/// `aria-labelledby` targets, which take their plain text rather than a
/// chained name computation.
pub fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Serialized opening tag, e.g. `<input type="text" id="user">`. Attached to
/// every diagnostic so records can be displayed without the tree.
pub fn opening_tag(element: &ElementRef) -> String {
    let el = element.value();
    let mut out = String::from("<");
    out.push_str(el.name());
    for (name, value) in el.attrs() {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
    }
    out.push('>');
    out
}

/// Stable locator string for an element: a `>`-joined path of
/// `tag#id.class:nth-child(n)` segments from the root.
pub fn locator(element: &ElementRef) -> String {
    let mut segments = Vec::new();
    let mut current = Some(*element);
    while let Some(el) = current {
        segments.push(locator_segment(&el));
        if tag_name(&el) == "html" {
            break;
        }
        current = parent_element(&el);
    }
    segments.reverse();
    segments.join(" > ")
}

fn locator_segment(element: &ElementRef) -> String {
    let el = element.value();
    let mut segment = el.name().to_string();
    if let Some(id) = el.attr("id") {
        if !id.is_empty() {
            segment.push('#');
            segment.push_str(id);
        }
    }
    for class in el.classes() {
        segment.push('.');
        segment.push_str(class);
    }
    if tag_name(element) != "html" {
        let index = 1 + element
            .prev_siblings()
            .filter(|sibling| matches!(sibling.value(), Node::Element(_)))
            .count();
        segment.push_str(&format!(":nth-child({index})"));
    }
    segment
}
