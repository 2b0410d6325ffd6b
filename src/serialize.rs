use crate::diagnostics::Diagnostic;
use crate::inspect::ElementInfo;

/// Render one inspection result as the compact text report.
///
/// Example output:
/// ```text
/// button "Save changes" (nested content)
///   html: <button class="primary">
///   at: html > body:nth-child(2) > button:nth-child(1)
///   warn: tabindex > 0
///     This is valid only if it improves accessibility, like in skip links
/// ```
pub fn to_compact_text(info: &ElementInfo) -> String {
    let mut output = String::new();

    match &info.role {
        Some(role) => output.push_str(&format!("{role}")),
        None => output.push_str("(no role)"),
    }
    match &info.name {
        Some(name) => output.push_str(&format!(" \"{}\" ({})", name.text, name.source)),
        None => output.push_str(" (no name)"),
    }
    if let Some(tab_index) = info.tab_index {
        output.push_str(&format!(" [tabindex={tab_index}]"));
    }
    output.push('\n');

    output.push_str(&format!("  html: {}\n", info.html));
    output.push_str(&format!("  at: {}\n", info.locator));

    for diag in &info.diagnostics {
        serialize_diagnostic(diag, &mut output);
    }

    output
}

/// Render a whole scan: one block per focusable element.
pub fn scan_to_compact_text(infos: &[ElementInfo]) -> String {
    let mut output = format!("scanned: {} focusable elements\n---\n", infos.len());
    for info in infos {
        output.push_str(&to_compact_text(info));
        output.push_str("---\n");
    }
    output
}

fn serialize_diagnostic(diag: &Diagnostic, output: &mut String) {
    output.push_str(&format!("  {}: {}\n", diag.severity, diag.issue));
    if let Some(message) = &diag.message {
        output.push_str(&format!("    {message}\n"));
    }
    for (key, value) in &diag.data {
        output.push_str(&format!("    {key}: {value}\n"));
    }
    for link in &diag.links {
        output.push_str(&format!("    see: {} <{}>\n", link.label, link.href));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::StyleHidden;
    use crate::inspect;
    use scraper::Html;

    fn inspect_one(html: &str, css: &str) -> ElementInfo {
        let document = Html::parse_document(html);
        let selector = scraper::Selector::parse(css).expect("valid selector");
        let element = document.select(&selector).next().expect("element present");
        inspect::inspect(&document, &element, &StyleHidden)
    }

    #[test]
    fn named_button_renders_on_one_line() {
        let info = inspect_one("<body><button>Save</button></body>", "button");
        let text = to_compact_text(&info);
        assert!(text.starts_with("button \"Save\" (nested content)\n"), "{text}");
        assert!(text.contains("  html: <button>"));
        assert!(text.contains("  at: "));
    }

    #[test]
    fn missing_name_and_role_render_placeholders() {
        let info = inspect_one(r#"<body><div tabindex="0"></div></body>"#, "div");
        let text = to_compact_text(&info);
        assert!(text.starts_with("(no role) (no name) [tabindex=0]\n"), "{text}");
        assert!(text.contains("error: focusable element missing text"));
    }

    #[test]
    fn diagnostic_message_and_link_indented() {
        let info = inspect_one(
            r#"<body><input type="text" placeholder="Search"></body>"#,
            "input",
        );
        let text = to_compact_text(&info);
        assert!(text.contains("warn: using 'placeholder' attribute as a label"));
        assert!(text.contains("    prefer a visible text label or an aria label"));
        assert!(text.contains("    see: "));
    }

    #[test]
    fn scan_report_counts_blocks() {
        let document = Html::parse_document(
            r#"<body><button>One</button><a href="/x">Two</a></body>"#,
        );
        let infos: Vec<ElementInfo> = inspect::focusable_elements(&document)
            .iter()
            .map(|el| inspect::inspect(&document, el, &StyleHidden))
            .collect();
        let text = scan_to_compact_text(&infos);
        assert!(text.starts_with("scanned: 2 focusable elements\n"));
        assert_eq!(text.matches("---\n").count(), 3);
    }
}
