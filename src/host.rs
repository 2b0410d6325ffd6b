//! Host-language naming: step 2 (native labelling attributes and elements)
//! and step 4 (fallback attributes and localized defaults).

use scraper::ElementRef;

use crate::diagnostics::Diagnostic;
use crate::dom;
use crate::label::{self, LabelText};
use crate::name::{AccessibleName, NameContext, NameSource, Resolution};

/// Tags whose controls are named by an associated `<label>`.
const LABELABLE_TAGS: [&str; 6] = ["input", "select", "textarea", "meter", "output", "progress"];

/// `alt` markers for words that restate what `alt` already implies.
const REDUNDANT_ALT_WORDS: [&str; 4] = ["image", "img", "picture", "photo"];

/// Localized defaults for controls the browser names itself.
const SUBMIT_LABEL: &str = "Submit";
const RESET_LABEL: &str = "Reset";
const SUBMIT_QUERY_LABEL: &str = "Submit Query";
const DETAILS_LABEL: &str = "Details";

fn input_type<'a>(element: &ElementRef<'a>) -> &'a str {
    if dom::tag_name(element) != "input" {
        return "";
    }
    element.value().attr("type").unwrap_or("text")
}

/// Step 2: names carried by the host language. Branches are ordered by
/// specificity; the generic labelable-control branch comes after the
/// button/image input forms it would otherwise shadow.
pub(crate) fn from_host_attributes(element: &ElementRef, ctx: &mut NameContext) -> Resolution {
    let tag = dom::tag_name(element);
    let ty = input_type(element);

    // <input type=button|submit|reset value="...">
    if tag == "input" && matches!(ty, "button" | "submit" | "reset") {
        if let Some(value) = element.value().attr("value") {
            let value = dom::collapse_whitespace(value);
            if !value.is_empty() {
                return Resolution::Found(AccessibleName::new(NameSource::HostAttribute, value));
            }
        }
    }

    // alt text for images, rendered with an explicit marker so a reader can
    // tell it apart from visible text.
    if (tag == "input" && ty == "image") || tag == "img" || tag == "area" {
        if let Some(alt) = element.value().attr("alt") {
            let alt = dom::collapse_whitespace(alt);
            if !alt.is_empty() {
                let lowered = alt.to_lowercase();
                if REDUNDANT_ALT_WORDS.iter().any(|w| lowered.contains(w)) {
                    ctx.diagnostics.push(Diagnostic::info(
                        "alt text contains redundant words like 'image' or 'picture'",
                        dom::opening_tag(element),
                        dom::locator(element),
                    ));
                }
                return Resolution::Found(AccessibleName::new(
                    NameSource::HostAttribute,
                    format!("[img:{alt}]"),
                ));
            }
        }
    }

    if tag == "fieldset" {
        if let Some(name) = caption_child(element, ctx, "legend") {
            return Resolution::Found(name);
        }
    }

    if LABELABLE_TAGS.contains(&tag) && ty != "hidden" {
        match label::input_label(element, ctx) {
            LabelText::Visited => return Resolution::Cycle,
            LabelText::Found(text) => {
                return Resolution::Found(AccessibleName::new(NameSource::HostAttribute, text));
            }
            LabelText::None => {
                // Buttons and images are named elsewhere in the chain; the
                // remaining control types genuinely need a label.
                if !matches!(ty, "button" | "submit" | "reset" | "image") {
                    ctx.diagnostics.push(Diagnostic::warn(
                        format!("<{tag}> element missing label"),
                        dom::opening_tag(element),
                        dom::locator(element),
                    ));
                }
                return Resolution::Missing;
            }
        }
    }

    if tag == "figure" {
        if let Some(name) = caption_child(element, ctx, "figcaption") {
            return Resolution::Found(name);
        }
    }

    if tag == "table" {
        if let Some(name) = caption_child(element, ctx, "caption") {
            return Resolution::Found(name);
        }
    }

    Resolution::Missing
}

/// Name a container from a dedicated caption child (`<legend>`,
/// `<figcaption>`, `<caption>`).
fn caption_child(
    element: &ElementRef,
    ctx: &mut NameContext,
    caption_tag: &str,
) -> Option<AccessibleName> {
    let caption = dom::find_descendant(element, &|el| dom::tag_name(el) == caption_tag)?;
    match crate::content::text_from_content(&caption, ctx, None) {
        crate::content::ContentText::New(text) if !text.is_empty() => {
            Some(AccessibleName::new(NameSource::HostAttribute, text))
        }
        _ => None,
    }
}

/// Step 4: last-resort names. Every hit is flagged, since these names are
/// invisible to sighted users or not localized by the page.
pub(crate) fn fallback_text(element: &ElementRef, ctx: &mut NameContext) -> Option<AccessibleName> {
    let tag = dom::tag_name(element);
    let ty = input_type(element);

    let is_text_entry = (tag == "input"
        && matches!(ty, "text" | "password" | "search" | "tel" | "url"))
        || tag == "textarea";
    if is_text_entry {
        if let Some(title) = non_empty_attr(element, "title") {
            fallback_warn(element, ctx, "using 'title' attribute as a placeholder");
            return Some(AccessibleName::new(NameSource::FallbackAttribute, title));
        }
        if let Some(placeholder) = non_empty_attr(element, "placeholder") {
            fallback_warn(element, ctx, "using 'placeholder' attribute as a label");
            return Some(AccessibleName::new(
                NameSource::FallbackAttribute,
                placeholder,
            ));
        }
        return None;
    }

    if tag == "input" {
        let localized = match ty {
            "submit" => Some(SUBMIT_LABEL.to_string()),
            "reset" => Some(RESET_LABEL.to_string()),
            "image" => Some(
                non_empty_attr(element, "title").unwrap_or_else(|| SUBMIT_QUERY_LABEL.to_string()),
            ),
            _ => None,
        };
        if let Some(text) = localized {
            fallback_warn(element, ctx, "using a localized default as a label");
            return Some(AccessibleName::new(NameSource::FallbackAttribute, text));
        }
    }

    if tag == "summary" {
        fallback_warn(element, ctx, "using a localized default as a label");
        return Some(AccessibleName::new(
            NameSource::FallbackAttribute,
            DETAILS_LABEL.to_string(),
        ));
    }

    if let Some(title) = non_empty_attr(element, "title") {
        fallback_warn(element, ctx, "using 'title' attribute as a label");
        return Some(AccessibleName::new(NameSource::FallbackAttribute, title));
    }

    None
}

fn non_empty_attr(element: &ElementRef, attr: &str) -> Option<String> {
    let value = dom::collapse_whitespace(element.value().attr(attr)?);
    (!value.is_empty()).then_some(value)
}

fn fallback_warn(element: &ElementRef, ctx: &mut NameContext, issue: &str) {
    ctx.diagnostics.push(
        Diagnostic::warn(issue, dom::opening_tag(element), dom::locator(element))
            .message("prefer a visible text label or an aria label")
            .link(
                "https://www.w3.org/WAI/WCAG21/Techniques/failures/F68",
                "WCAG: form control without an associated label",
            ),
    );
}
