//! `<label>` association for form controls.
//!
//! A control is labelled by, in order: its own aria text, an ancestor
//! `<label>` wrapping it, or `<label for="...">` elements pointing at its
//! id. Label text is gathered with the same content traversal as everything
//! else, with the control itself excluded so a wrapped control does not
//! recurse into its own label forever.

use scraper::ElementRef;

use crate::content::{self, ContentText};
use crate::diagnostics::Diagnostic;
use crate::dom;
use crate::name::{self, NameContext, NameSource};

/// Outcome of label resolution for a control. `Visited` surfaces a cycle
/// from the underlying content traversal.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LabelText {
    Found(String),
    Visited,
    None,
}

pub(crate) fn input_label(element: &ElementRef, ctx: &mut NameContext) -> LabelText {
    // Aria text directly on the control wins over any <label>.
    if let Some(accname) = name::aria_text(element, ctx) {
        if accname.source == NameSource::AriaLabelledby {
            ctx.diagnostics.push(
                Diagnostic::warn(
                    "using 'aria-labelledby' as an input label",
                    dom::opening_tag(element),
                    dom::locator(element),
                )
                .message("prefer a <label> element associated with the control"),
            );
        }
        return LabelText::Found(accname.text);
    }

    if let Some(label) = dom::search_ancestors(element, |el| dom::tag_name(el) == "label") {
        return label_element_text(&label, element, ctx);
    }

    let Some(id) = element
        .value()
        .attr("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        return LabelText::None;
    };

    let labels = dom::find_all(ctx.document, |el| {
        dom::tag_name(el) == "label" && el.value().attr("for") == Some(id)
    });
    if labels.is_empty() {
        return LabelText::None;
    }
    if labels.len() > 1 {
        ctx.diagnostics.push(
            Diagnostic::warn(
                "multiple <label> elements for one control",
                dom::opening_tag(element),
                dom::locator(element),
            )
            .data(
                "labels",
                labels
                    .iter()
                    .map(dom::opening_tag)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        );
    }

    let mut parts: Vec<String> = Vec::new();
    for label in &labels {
        if let LabelText::Found(text) = label_element_text(label, element, ctx) {
            parts.push(text);
        }
    }
    let joined = dom::collapse_whitespace(&parts.join(" "));
    if joined.is_empty() {
        LabelText::None
    } else {
        LabelText::Found(joined)
    }
}

/// The text a single `<label>` contributes for `control`. A label carrying
/// its own aria text is misassociated more often than not, so that case is
/// flagged even though the text is still used.
fn label_element_text(
    label: &ElementRef,
    control: &ElementRef,
    ctx: &mut NameContext,
) -> LabelText {
    if let Some(accname) = name::aria_text(label, ctx) {
        ctx.diagnostics.push(
            Diagnostic::error(
                format!("<label> using '{}'", accname.source),
                dom::opening_tag(label),
                dom::locator(label),
            )
            .message("aria text on a <label> names the label, not the control it points at"),
        );
        return LabelText::Found(accname.text);
    }

    match content::text_from_content(label, ctx, Some(control.id())) {
        ContentText::Visited => LabelText::Visited,
        ContentText::New(text) => {
            if text.is_empty() {
                ctx.diagnostics.push(Diagnostic::error(
                    "<label> missing text",
                    dom::opening_tag(label),
                    dom::locator(label),
                ));
                LabelText::None
            } else {
                LabelText::Found(text)
            }
        }
    }
}
