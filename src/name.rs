//! Accessible-name resolution.
//!
//! The W3C accessible-name computation is a precedence chain over five
//! sources, tried strictly in order and short-circuiting at the first one
//! that yields non-empty text:
//!
//! 1. referential labelling (`aria-labelledby`, then `aria-label`)
//! 2. host-language attributes (`value`, `alt`, `<legend>`, `<label>`, ...)
//! 3. name from descendant content
//! 4. fallback attributes (`title`, `placeholder`, localized constants)
//! 5. no name
//!
//! All resolution state lives in a [`NameContext`] created per top-level
//! invocation: the diagnostics stream and the cycle-guard visited set are
//! threaded through every recursive call, never stored at module scope, so
//! the engine is re-entrant across invocations.

use std::collections::HashSet;

use ego_tree::NodeId;
use scraper::{ElementRef, Html};
use serde::Serialize;

use crate::content::{self, ContentGate, ContentText};
use crate::diagnostics::Diagnostic;
use crate::dom::{self, HiddenOracle};
use crate::host;
use crate::roles;

/// Which step of the chain produced the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    AriaLabelledby,
    AriaLabel,
    HostAttribute,
    NestedContent,
    FallbackAttribute,
    TextNode,
}

impl std::fmt::Display for NameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NameSource::AriaLabelledby => "aria-labelledby",
            NameSource::AriaLabel => "aria-label",
            NameSource::HostAttribute => "host attribute",
            NameSource::NestedContent => "nested content",
            NameSource::FallbackAttribute => "fallback attribute",
            NameSource::TextNode => "text node",
        };
        write!(f, "{s}")
    }
}

impl Serialize for NameSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved accessible name. `text` is always whitespace-collapsed and
/// trimmed; an empty string never leaves the resolver as a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessibleName {
    #[serde(rename = "type")]
    pub source: NameSource,
    pub text: String,
}

impl AccessibleName {
    pub(crate) fn new(source: NameSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }
}

/// Internal outcome of one resolution attempt. `Cycle` means the traversal
/// re-entered a node already in progress; it propagates to the top, which
/// reports "no name" for the whole invocation rather than a fabricated empty
/// result.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    Found(AccessibleName),
    Missing,
    Cycle,
}

/// Per-invocation resolution state. Create one per focused node; it must not
/// be shared between concurrent invocations (the visited set would produce
/// false cycle detections).
pub struct NameContext<'a> {
    pub document: &'a Html,
    pub hidden: &'a dyn HiddenOracle,
    pub diagnostics: Vec<Diagnostic>,
    /// Cycle guard for content traversal. Lazily created by the first
    /// traversal, cleared unconditionally by its creator on exit.
    pub(crate) visited: Option<HashSet<NodeId>>,
}

impl<'a> NameContext<'a> {
    pub fn new(document: &'a Html, hidden: &'a dyn HiddenOracle) -> Self {
        Self {
            document,
            hidden,
            diagnostics: Vec::new(),
            visited: None,
        }
    }
}

/// Resolve the accessible name of `element`. This is the public entry point:
/// it maps a detected cycle to "no name".
pub fn accessible_name(
    element: &ElementRef,
    ctx: &mut NameContext,
    is_focus_target: bool,
) -> Option<AccessibleName> {
    match resolve(element, ctx, is_focus_target) {
        Resolution::Found(name) => Some(name),
        Resolution::Missing | Resolution::Cycle => None,
    }
}

pub(crate) fn resolve(
    element: &ElementRef,
    ctx: &mut NameContext,
    is_focus_target: bool,
) -> Resolution {
    if dom::is_aria_hidden(element) || ctx.hidden.is_hidden(element) {
        return Resolution::Missing;
    }

    // Step 1: aria-labelledby, then aria-label.
    if let Some(name) = aria_text(element, ctx) {
        return Resolution::Found(name);
    }

    // Step 2: host-language attributes. A cycle inside the input-labelling
    // sub-resolution does not abort the chain; later steps may still name
    // the element.
    match host::from_host_attributes(element, ctx) {
        Resolution::Found(name) => return Resolution::Found(name),
        Resolution::Missing | Resolution::Cycle => {}
    }

    // Step 3: name from descendant content. The gate applies only to the
    // focus target itself; recursive calls always descend.
    let gate = if is_focus_target {
        content::content_gate(element, ctx.document)
    } else {
        ContentGate::Take { exclude: None }
    };
    if let ContentGate::Take { exclude } = gate {
        match content::text_from_content(element, ctx, exclude) {
            ContentText::Visited => return Resolution::Cycle,
            ContentText::New(text) if !text.is_empty() => {
                return Resolution::Found(AccessibleName::new(NameSource::NestedContent, text));
            }
            ContentText::New(_) => {}
        }
    }

    // Step 4: fallback attributes, each use flagged as a warning.
    match host::fallback_text(element, ctx) {
        Some(name) => Resolution::Found(name),
        None => Resolution::Missing,
    }
}

/// Step 1: referential labelling. `aria-labelledby` takes precedence over
/// `aria-label`; both share the same validity precondition.
pub(crate) fn aria_text(element: &ElementRef, ctx: &mut NameContext) -> Option<AccessibleName> {
    if let Some(text) = labelledby_text(element, ctx) {
        if !text.is_empty() {
            return Some(AccessibleName::new(NameSource::AriaLabelledby, text));
        }
    }
    if let Some(text) = aria_label_text(element, ctx) {
        if !text.is_empty() {
            return Some(AccessibleName::new(NameSource::AriaLabel, text));
        }
    }
    None
}

/// Resolve `aria-labelledby`: split on whitespace, ignore repeated ids, look
/// each id up, and join the targets' raw text content. The referenced
/// elements' own `aria-labelledby` is deliberately not followed - the
/// property does not chain.
fn labelledby_text(element: &ElementRef, ctx: &mut NameContext) -> Option<String> {
    let labelledby = element.value().attr("aria-labelledby")?.trim();
    if labelledby.is_empty() {
        return None;
    }

    if !validate_aria_label(element, ctx) {
        return None;
    }

    let mut seen = HashSet::new();
    let targets: Vec<ElementRef> = labelledby
        .split_whitespace()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| dom::lookup_by_id(ctx.document, id))
        .collect();

    if targets.is_empty() {
        ctx.diagnostics.push(
            Diagnostic::error(
                "aria-labelledby refers to a non-existing element",
                dom::opening_tag(element),
                dom::locator(element),
            )
            .message(format!("target ids: {labelledby}")),
        );
        return None;
    }

    let text = dom::collapse_whitespace(
        &targets
            .iter()
            .map(dom::element_text)
            .collect::<Vec<_>>()
            .join(" "),
    );
    if text.is_empty() {
        ctx.diagnostics.push(
            Diagnostic::error(
                "aria-labelledby text is empty",
                dom::opening_tag(element),
                dom::locator(element),
            )
            .message(format!("target ids: {labelledby}")),
        );
    }
    Some(text)
}

fn aria_label_text(element: &ElementRef, ctx: &mut NameContext) -> Option<String> {
    let label = element.value().attr("aria-label")?.trim();

    if !validate_aria_label(element, ctx) {
        return None;
    }

    if label.is_empty() {
        ctx.diagnostics.push(Diagnostic::error(
            "empty aria-label",
            dom::opening_tag(element),
            dom::locator(element),
        ));
    }
    Some(dom::collapse_whitespace(label))
}

/// Shared validity precondition for both aria label reads: the element must
/// have a role, and one that supports naming. Returns false when the label
/// must be ignored entirely; also emits the advisory findings about
/// suspicious-but-valid label usage.
fn validate_aria_label(element: &ElementRef, ctx: &mut NameContext) -> bool {
    let html = dom::opening_tag(element);
    let loc = dom::locator(element);
    let el = element.value();

    let Some(role) = roles::role_of(element, ctx.document) else {
        ctx.diagnostics.push(
            Diagnostic::error("aria label used in an element with no role", html, loc)
                .message(
                    "'aria-label' is often ignored by assistive technologies in elements \
                     with no role like <div> or <span>. Prefer a semantic element, or add \
                     a role attribute",
                )
                .link(
                    "https://developer.mozilla.org/en-US/docs/Web/Accessibility/ARIA/Attributes/aria-label",
                    "MDN: not all elements can be given an accessible name",
                ),
        );
        return false;
    };

    if !role.supports_label() {
        ctx.diagnostics.push(
            Diagnostic::error("element does not support aria label", html, loc)
                .message(format!(
                    "element with role \"{role}\" does not support aria label"
                ))
                .link(
                    "https://developer.mozilla.org/en-US/docs/Web/Accessibility/ARIA/Attributes/aria-label#associated_roles",
                    "MDN: aria-label associated roles",
                ),
        );
        return false;
    }

    if dom::is_aria_hidden(element) {
        ctx.diagnostics.push(Diagnostic::warn(
            "using 'aria-hidden' in an element with an aria label",
            html.clone(),
            loc.clone(),
        ));
    }

    if roles::is_role_presentation(element) {
        ctx.diagnostics.push(Diagnostic::warn(
            "using role='presentation' in an element with an aria label",
            html.clone(),
            loc.clone(),
        ));
    }

    let has_alt_or_title = el.attr("alt").is_some_and(|v| !v.trim().is_empty())
        || el.attr("title").is_some_and(|v| !v.trim().is_empty());
    if has_alt_or_title {
        ctx.diagnostics.push(Diagnostic::minor(
            "using aria label in an element with 'alt' or 'title'. Aria label will take precedence.",
            html.clone(),
            loc.clone(),
        ));
    }

    let both_labels = el.attr("aria-label").is_some_and(|v| !v.trim().is_empty())
        && el
            .attr("aria-labelledby")
            .is_some_and(|v| !v.trim().is_empty());
    if both_labels {
        ctx.diagnostics.push(
            Diagnostic::minor(
                "using 'aria-label' and 'aria-labelledby' in the same element. \
                 'aria-labelledby' will take precedence",
                html,
                loc,
            )
            .message("Prefer 'aria-labelledby' and consider removing 'aria-label'."),
        );
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::dom::StyleHidden;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = scraper::Selector::parse(css).expect("valid selector");
        document.select(&selector).next().expect("element present")
    }

    fn resolve_one(html: &str, css: &str) -> (Option<AccessibleName>, Vec<Diagnostic>) {
        let d = doc(html);
        let oracle = StyleHidden;
        let mut ctx = NameContext::new(&d, &oracle);
        let name = accessible_name(&first(&d, css), &mut ctx, true);
        (name, ctx.diagnostics)
    }

    #[test]
    fn labelledby_beats_aria_label() {
        let (name, _) = resolve_one(
            r#"<body><span id="t">From target</span>
               <button aria-labelledby="t" aria-label="From label">x</button></body>"#,
            "button",
        );
        let name = name.unwrap();
        assert_eq!(name.source, NameSource::AriaLabelledby);
        assert_eq!(name.text, "From target");
    }

    #[test]
    fn labelledby_both_present_flags_minor() {
        let (_, diags) = resolve_one(
            r#"<body><span id="t">T</span>
               <button aria-labelledby="t" aria-label="L">x</button></body>"#,
            "button",
        );
        assert!(diags.iter().any(|d| d.severity == Severity::Minor
            && d.issue.contains("'aria-labelledby' will take precedence")));
    }

    #[test]
    fn labelledby_joins_and_dedupes_ids() {
        let (name, _) = resolve_one(
            r#"<body><span id="a">First</span><span id="b">Second</span>
               <button aria-labelledby="a b a">x</button></body>"#,
            "button",
        );
        assert_eq!(name.unwrap().text, "First Second");
    }

    #[test]
    fn labelledby_does_not_chain() {
        let (name, _) = resolve_one(
            r#"<body><span id="a" aria-labelledby="b">Visible</span><span id="b">Hidden target</span>
               <button aria-labelledby="a">x</button></body>"#,
            "button",
        );
        // The target's own aria-labelledby is ignored; its text content wins.
        assert_eq!(name.unwrap().text, "Visible");
    }

    #[test]
    fn dangling_labelledby_is_an_error_and_falls_through() {
        let (name, diags) = resolve_one(
            r#"<body><button aria-labelledby="ghost">Content</button></body>"#,
            "button",
        );
        let name = name.unwrap();
        assert_eq!(name.source, NameSource::NestedContent);
        assert_eq!(name.text, "Content");
        assert!(diags.iter().any(|d| d.severity == Severity::Error
            && d.issue == "aria-labelledby refers to a non-existing element"));
    }

    #[test]
    fn empty_labelledby_target_is_an_error() {
        let (name, diags) = resolve_one(
            r#"<body><span id="t">  </span><button aria-labelledby="t">Fallback</button></body>"#,
            "button",
        );
        assert_eq!(name.unwrap().text, "Fallback");
        assert!(diags
            .iter()
            .any(|d| d.issue == "aria-labelledby text is empty"));
    }

    #[test]
    fn aria_label_trims_and_collapses() {
        let (name, _) = resolve_one(
            r#"<body><button aria-label="  a   b ">x</button></body>"#,
            "button",
        );
        let name = name.unwrap();
        assert_eq!(name.source, NameSource::AriaLabel);
        assert_eq!(name.text, "a b");
    }

    #[test]
    fn empty_aria_label_is_an_error() {
        let (name, diags) = resolve_one(
            r#"<body><button aria-label="  ">Text</button></body>"#,
            "button",
        );
        // Falls through to content.
        assert_eq!(name.unwrap().text, "Text");
        assert!(diags.iter().any(|d| d.issue == "empty aria-label"));
    }

    #[test]
    fn aria_label_without_role_is_blocked() {
        let (name, diags) = resolve_one(
            r#"<body><div aria-label="Nope">Text</div></body>"#,
            "div",
        );
        assert!(diags.iter().any(|d| d.severity == Severity::Error
            && d.issue == "aria label used in an element with no role"));
        // Name falls through to content for the div (not a focus-gated role,
        // so content is skipped; the div ends up unnamed).
        assert!(name.is_none());
    }

    #[test]
    fn aria_label_on_unsupported_role_is_blocked() {
        let (name, diags) = resolve_one(
            r#"<body><p aria-label="Nope">Text</p></body>"#,
            "p",
        );
        assert!(diags
            .iter()
            .any(|d| d.issue == "element does not support aria label"));
        assert!(name.is_none());
    }

    #[test]
    fn hidden_element_has_no_name() {
        let (name, _) = resolve_one(
            r#"<body><button aria-hidden="true" aria-label="X">x</button></body>"#,
            "button",
        );
        assert!(name.is_none());
        let (name, _) = resolve_one(
            r#"<body><button style="display:none" aria-label="X">x</button></body>"#,
            "button",
        );
        assert!(name.is_none());
    }

    #[test]
    fn content_name_for_button() {
        let (name, _) = resolve_one(
            "<body><button>  Save   changes </button></body>",
            "button",
        );
        let name = name.unwrap();
        assert_eq!(name.source, NameSource::NestedContent);
        assert_eq!(name.text, "Save changes");
    }

    #[test]
    fn content_gate_skips_unnamed_roles() {
        // A nav takes its name from aria attributes, not from content.
        let (name, _) = resolve_one("<body><nav>Lots of links</nav></body>", "nav");
        assert!(name.is_none());
    }

    #[test]
    fn resolution_is_idempotent() {
        let html = r#"<body><button aria-labelledby="ghost" title="t">Content</button></body>"#;
        let d = doc(html);
        let oracle = StyleHidden;
        let el = first(&d, "button");

        let mut ctx1 = NameContext::new(&d, &oracle);
        let n1 = accessible_name(&el, &mut ctx1, true);
        let mut ctx2 = NameContext::new(&d, &oracle);
        let n2 = accessible_name(&el, &mut ctx2, true);

        assert_eq!(n1, n2);
        assert_eq!(ctx1.diagnostics, ctx2.diagnostics);
        assert!(ctx1.visited.is_none(), "visited set must not leak");
    }
}
