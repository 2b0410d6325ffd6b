//! Top-level inspection of a focusable element: role, tab index, accessible
//! name, and the spot checks that do not fit in the naming chain.

use std::panic::{self, AssertUnwindSafe};

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::diagnostics::{self, Diagnostic};
use crate::dom::{self, HiddenOracle};
use crate::name::{self, AccessibleName, NameContext};
use crate::roles::{self, Role};

/// Selector probes for interactive descendants. `tabindex` and
/// `role=button` are included because they can be made interactive from
/// script even when the tag itself is inert.
const NESTED_INTERACTIVE_QUERIES: [&str; 13] = [
    "button",
    "a",
    "input",
    "select",
    "textarea",
    "label",
    "menu",
    "details",
    "video[controls]",
    "audio[controls]",
    "[tabindex=\"0\"]",
    "[tabindex=\"-1\"]",
    "[role=\"button\"]",
];

/// Everything the engine knows about one focused element. Read-only once
/// produced; consumers render or serialize it without touching the tree.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub role: Option<Role>,
    pub tag_name: String,
    pub name: Option<AccessibleName>,
    pub tab_index: Option<i32>,
    pub html: String,
    pub locator: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Inspect one element. Never panics: a failure inside name resolution is
/// logged and downgraded to "no name" so one malformed subtree cannot take
/// down a scan over many elements.
pub fn inspect(document: &Html, element: &ElementRef, hidden: &dyn HiddenOracle) -> ElementInfo {
    let mut diags = Vec::new();
    let html = dom::opening_tag(element);
    let loc = dom::locator(element);

    let role = roles::resolve_role(element, document, &mut diags);
    let tab_index = tab_index(element, &mut diags);
    element_validations(element, role.as_ref(), &mut diags);

    let mut ctx = NameContext::new(document, hidden);
    let name = match panic::catch_unwind(AssertUnwindSafe(|| {
        name::accessible_name(element, &mut ctx, true)
    })) {
        Ok(name) => name,
        Err(_) => {
            tracing::error!(element = %html, "name resolution panicked");
            None
        }
    };
    diags.append(&mut ctx.diagnostics);

    if name.is_none() {
        diags.push(Diagnostic::error(
            "focusable element missing text",
            html.clone(),
            loc.clone(),
        ));
    }

    ElementInfo {
        role,
        tag_name: dom::tag_name(element).to_string(),
        name,
        tab_index,
        html,
        locator: loc,
        diagnostics: diagnostics::dedup(diags),
    }
}

/// Parse `tabindex`, flagging the values that hurt keyboard users. A
/// non-numeric value is how the browser treats it: absent.
fn tab_index(element: &ElementRef, diags: &mut Vec<Diagnostic>) -> Option<i32> {
    let raw = element.value().attr("tabindex")?.trim();
    if raw.is_empty() {
        return None;
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let only_digits = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
    if !only_digits {
        diags.push(
            Diagnostic::warn(
                "tabindex contains non numeric values",
                dom::opening_tag(element),
                dom::locator(element),
            )
            .message(format!("tabindex=\"{raw}\"")),
        );
        return None;
    }

    let value: i32 = raw.parse().ok()?;
    if value > 0 {
        diags.push(
            Diagnostic::warn(
                "tabindex > 0",
                dom::opening_tag(element),
                dom::locator(element),
            )
            .message("This is valid only if it improves accessibility, like in skip links"),
        );
    } else if value < -1 {
        diags.push(Diagnostic::warn(
            "tabindex < -1",
            dom::opening_tag(element),
            dom::locator(element),
        ));
    }
    Some(value)
}

/// Structural checks on the focused element itself, independent of how its
/// name resolves.
fn element_validations(element: &ElementRef, role: Option<&Role>, diags: &mut Vec<Diagnostic>) {
    let html = dom::opening_tag(element);
    let loc = dom::locator(element);
    let el = element.value();
    let has_aria_text = el.attr("aria-label").is_some_and(|v| !v.trim().is_empty())
        || el
            .attr("aria-labelledby")
            .is_some_and(|v| !v.trim().is_empty());

    if dom::is_aria_hidden(element) {
        diags.push(Diagnostic::warn(
            "focusable element with 'aria-hidden'",
            html.clone(),
            loc.clone(),
        ));
    }

    if roles::is_role_presentation(element) {
        diags.push(Diagnostic::warn(
            "focusable element with role=\"presentation\"",
            html.clone(),
            loc.clone(),
        ));
        if has_aria_text {
            diags.push(
                Diagnostic::warn(
                    "role='presentation' with aria label ('aria-label' or 'aria-labelledby')",
                    html.clone(),
                    loc.clone(),
                )
                .message(
                    "If the element is just presentational it doesn't need aria text. If it \
                     is not purely presentational use another role, or prefer semantic html \
                     elements like <button>",
                )
                .link(
                    "https://a11ytips.dev/docs/roles-vs-presentation/",
                    "aria-hidden vs role='presentation'",
                ),
            );
        }
    }

    match role {
        None => {
            diags.push(
                Diagnostic::warn(
                    "focusable element with no role",
                    html.clone(),
                    loc.clone(),
                )
                .message(
                    "A focusable element without a role can be fine for scroll containers, \
                     not for clickable items",
                ),
            );
        }
        Some(Role::Button) => {
            let tag = dom::tag_name(element);
            if tag != "button" && tag != "input" {
                diags.push(
                    Diagnostic::warn(
                        "role='button' not using <button> html tag",
                        html.clone(),
                        loc.clone(),
                    )
                    .message(
                        "When possible prefer the <button> html tag. Otherwise confirm that \
                         this element is keyboard accessible ('enter', 'space') and handles \
                         focus properly.",
                    ),
                );
            }
        }
        Some(role) => {
            if role.requires_label() && !has_aria_text {
                diags.push(
                    Diagnostic::warn(
                        format!("role \"{role}\" requires an aria label"),
                        html.clone(),
                        loc.clone(),
                    )
                    .link(
                        "https://www.w3.org/WAI/ARIA/apg/practices/names-and-descriptions/",
                        "W3C: names and descriptions",
                    ),
                );
            }
        }
    }

    if let Some(hidden_root) =
        dom::search_ancestors(element, |el| dom::is_aria_hidden(el))
    {
        diags.push(
            Diagnostic::warn("element inside aria-hidden", html.clone(), loc.clone())
                .data("ariaHiddenElement", dom::opening_tag(&hidden_root)),
        );
    }

    let nested = nested_interactive(element);
    let is_grid = role == Some(&Role::Grid);
    if is_grid {
        if nested.is_empty() {
            diags.push(
                Diagnostic::warn(
                    "'grid' role with no interactive element",
                    html.clone(),
                    loc.clone(),
                )
                .link(
                    "https://developer.mozilla.org/en-US/docs/Web/Accessibility/ARIA/Roles/grid_role",
                    "MDN: grid role",
                ),
            );
        } else {
            diags.push(
                Diagnostic::info("'grid' role", html.clone(), loc.clone())
                    .message(
                        "Confirm that the elements inside are keyboard accessible \
                         (Arrow keys, etc.)",
                    )
                    .link(
                        "https://developer.mozilla.org/en-US/docs/Web/Accessibility/ARIA/Roles/grid_role#keyboard_interactions",
                        "MDN: 'grid' role keyboard interactions",
                    ),
            );
        }
    }

    let may_nest = is_grid || role == Some(&Role::List);
    if !may_nest && !nested.is_empty() {
        diags.push(
            Diagnostic::error("element contains nested controls", html, loc)
                .message(format!("Includes: {}", nested.join(", ")))
                .link(
                    "https://accessibleweb.com/question-answer/why-are-nested-interactive-controls-an-accessibility-issue/",
                    "Why nested interactive elements is an a11y issue?",
                ),
        );
    }
}

/// The subset of [`NESTED_INTERACTIVE_QUERIES`] matching somewhere under
/// `element` (the element itself excluded).
fn nested_interactive(element: &ElementRef) -> Vec<&'static str> {
    NESTED_INTERACTIVE_QUERIES
        .iter()
        .filter(|query| {
            let selector = Selector::parse(query).expect("valid selector");
            element
                .select(&selector)
                .any(|found| found.id() != element.id())
        })
        .copied()
        .collect()
}

/// Elements a scan visits: everything natively focusable or opted into the
/// tab order. An approximation of the browser's sequential focus order.
pub fn focusable_elements(document: &Html) -> Vec<ElementRef<'_>> {
    let selector = Selector::parse(
        "a[href], button, input, select, textarea, summary, [tabindex], [role=\"button\"], \
         [role=\"link\"], [contenteditable=\"true\"]",
    )
    .expect("valid selector");
    document
        .select(&selector)
        .filter(|el| el.value().attr("type") != Some("hidden"))
        .filter(|el| el.value().attr("disabled").is_none())
        .collect()
}
