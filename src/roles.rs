//! ARIA role resolution.
//!
//! An explicit `role` attribute wins when present (with `aria-role` accepted
//! as a legacy fallback); otherwise the role is derived from the tag via the
//! HTML-to-ARIA mapping tables. A handful of tags need structural context -
//! `<td>` inside a grid, `<li>` outside a list, `<section>` without a label -
//! and SVG content has its own small shape table. Roles are recomputed on
//! every request, never cached on the node.

use std::fmt;

use scraper::{ElementRef, Html};
use serde::{Serialize, Serializer};

use crate::diagnostics::Diagnostic;
use crate::dom;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Alert,
    AlertDialog,
    Application,
    Article,
    Banner,
    Button,
    Caption,
    Cell,
    Checkbox,
    Code,
    ColumnHeader,
    ComboBox,
    Complementary,
    ContentInfo,
    Definition,
    Deletion,
    Dialog,
    Document,
    Emphasis,
    Form,
    Generic,
    GraphicsDocument,
    GraphicsSymbol,
    Grid,
    GridCell,
    Group,
    Heading(u8),
    Img,
    Insertion,
    Link,
    List,
    ListItem,
    Main,
    Mark,
    Menu,
    MenuItem,
    MenuItemCheckbox,
    MenuItemRadio,
    Navigation,
    Option,
    Paragraph,
    Presentation,
    ProgressBar,
    Radio,
    RadioGroup,
    Region,
    Row,
    RowGroup,
    RowHeader,
    Search,
    Separator,
    Slider,
    SpinButton,
    Status,
    Strong,
    Subscript,
    Suggestion,
    Superscript,
    Switch,
    Tab,
    TabList,
    TabPanel,
    Table,
    Term,
    TextBox,
    Time,
    Toolbar,
    Tooltip,
    Tree,
    TreeGrid,
    TreeItem,
    /// Explicit role outside the vocabulary above; kept verbatim so
    /// diagnostics can report what the author wrote.
    Other(String),
}

impl Role {
    /// Parse an explicit role attribute value. The literal `none` is handled
    /// by the caller (it means "no role"), so it never reaches here.
    pub fn from_attr(value: &str) -> Role {
        match value.to_lowercase().as_str() {
            "alert" => Role::Alert,
            "alertdialog" => Role::AlertDialog,
            "application" => Role::Application,
            "article" => Role::Article,
            "banner" => Role::Banner,
            "button" => Role::Button,
            "caption" => Role::Caption,
            "cell" => Role::Cell,
            "checkbox" => Role::Checkbox,
            "code" => Role::Code,
            "columnheader" => Role::ColumnHeader,
            "combobox" => Role::ComboBox,
            "complementary" => Role::Complementary,
            "contentinfo" => Role::ContentInfo,
            "definition" => Role::Definition,
            "deletion" => Role::Deletion,
            "dialog" => Role::Dialog,
            "document" => Role::Document,
            "emphasis" => Role::Emphasis,
            "form" => Role::Form,
            "generic" => Role::Generic,
            "graphics-document" => Role::GraphicsDocument,
            "graphics-symbol" => Role::GraphicsSymbol,
            "grid" => Role::Grid,
            "gridcell" => Role::GridCell,
            "group" => Role::Group,
            "heading" => Role::Heading(2),
            "img" | "image" => Role::Img,
            "insertion" => Role::Insertion,
            "link" => Role::Link,
            "list" => Role::List,
            "listitem" => Role::ListItem,
            "main" => Role::Main,
            "mark" => Role::Mark,
            "menu" => Role::Menu,
            "menuitem" => Role::MenuItem,
            "menuitemcheckbox" => Role::MenuItemCheckbox,
            "menuitemradio" => Role::MenuItemRadio,
            "navigation" => Role::Navigation,
            "option" => Role::Option,
            "paragraph" => Role::Paragraph,
            "presentation" => Role::Presentation,
            "progressbar" => Role::ProgressBar,
            "radio" => Role::Radio,
            "radiogroup" => Role::RadioGroup,
            "region" => Role::Region,
            "row" => Role::Row,
            "rowgroup" => Role::RowGroup,
            "rowheader" => Role::RowHeader,
            "search" => Role::Search,
            "separator" => Role::Separator,
            "slider" => Role::Slider,
            "spinbutton" => Role::SpinButton,
            "status" => Role::Status,
            "strong" => Role::Strong,
            "subscript" => Role::Subscript,
            "suggestion" => Role::Suggestion,
            "superscript" => Role::Superscript,
            "switch" => Role::Switch,
            "tab" => Role::Tab,
            "tablist" => Role::TabList,
            "tabpanel" => Role::TabPanel,
            "table" => Role::Table,
            "term" => Role::Term,
            "textbox" => Role::TextBox,
            "time" => Role::Time,
            "toolbar" => Role::Toolbar,
            "tooltip" => Role::Tooltip,
            "tree" => Role::Tree,
            "treegrid" => Role::TreeGrid,
            "treeitem" => Role::TreeItem,
            other => Role::Other(other.to_string()),
        }
    }

    /// Roles that take their accessible name from descendant content
    /// (step 3 of the name computation).
    pub fn named_from_content(&self) -> bool {
        matches!(
            self,
            Role::Button
                | Role::Cell
                | Role::Checkbox
                | Role::ColumnHeader
                | Role::GridCell
                | Role::Heading(_)
                | Role::Link
                | Role::MenuItem
                | Role::MenuItemCheckbox
                | Role::MenuItemRadio
                | Role::Option
                | Role::Radio
                | Role::Row
                | Role::RowHeader
                | Role::Switch
                | Role::Tab
                | Role::Tooltip
                | Role::TreeItem
        )
    }

    /// Roles for which `aria-label`/`aria-labelledby` are ignored by
    /// assistive technologies. Labelling one of these is an authoring error.
    pub fn supports_label(&self) -> bool {
        !matches!(
            self,
            Role::Caption
                | Role::Code
                | Role::Definition
                | Role::Deletion
                | Role::Emphasis
                | Role::Generic
                | Role::Insertion
                | Role::Mark
                | Role::Paragraph
                | Role::Presentation
                | Role::Strong
                | Role::Subscript
                | Role::Suggestion
                | Role::Superscript
                | Role::Term
                | Role::Time
        )
    }

    /// Roles that must carry an aria label to be usable at all.
    pub fn requires_label(&self) -> bool {
        matches!(
            self,
            Role::AlertDialog
                | Role::Application
                | Role::Dialog
                | Role::RadioGroup
                | Role::Region
                | Role::TabPanel
                | Role::Tree
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Heading(level) => write!(f, "heading[{level}]"),
            Role::Other(s) => write!(f, "{s}"),
            Role::AlertDialog => write!(f, "alertdialog"),
            Role::ColumnHeader => write!(f, "columnheader"),
            Role::ComboBox => write!(f, "combobox"),
            Role::ContentInfo => write!(f, "contentinfo"),
            Role::GraphicsDocument => write!(f, "graphics-document"),
            Role::GraphicsSymbol => write!(f, "graphics-symbol"),
            Role::GridCell => write!(f, "gridcell"),
            Role::ListItem => write!(f, "listitem"),
            Role::MenuItem => write!(f, "menuitem"),
            Role::MenuItemCheckbox => write!(f, "menuitemcheckbox"),
            Role::MenuItemRadio => write!(f, "menuitemradio"),
            Role::ProgressBar => write!(f, "progressbar"),
            Role::RadioGroup => write!(f, "radiogroup"),
            Role::RowGroup => write!(f, "rowgroup"),
            Role::RowHeader => write!(f, "rowheader"),
            Role::SpinButton => write!(f, "spinbutton"),
            Role::TabList => write!(f, "tablist"),
            Role::TabPanel => write!(f, "tabpanel"),
            Role::TextBox => write!(f, "textbox"),
            Role::TreeGrid => write!(f, "treegrid"),
            Role::TreeItem => write!(f, "treeitem"),
            other => write!(f, "{}", format!("{other:?}").to_lowercase()),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The raw explicit role attribute, `role` first with `aria-role` accepted as
/// a legacy fallback. Empty-after-trim counts as absent.
pub fn explicit_role_attr<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    let el = element.value();
    el.attr("role")
        .or_else(|| el.attr("aria-role"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn is_role_presentation(element: &ElementRef) -> bool {
    element.value().attr("role") == Some("presentation")
}

/// Resolve the role without a diagnostics sink. Same result as
/// [`resolve_role`], used where a validity check needs the role but must not
/// duplicate findings.
pub fn role_of(element: &ElementRef, document: &Html) -> Option<Role> {
    resolve_inner(element, document, None)
}

/// Resolve the role, reporting an explicit role that the element's tag does
/// not permit as a `minor` finding. The explicit role still wins; the
/// implicit table is only consulted when no explicit role is given.
pub fn resolve_role(
    element: &ElementRef,
    document: &Html,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Role> {
    resolve_inner(element, document, Some(diagnostics))
}

fn resolve_inner(
    element: &ElementRef,
    document: &Html,
    diagnostics: Option<&mut Vec<Diagnostic>>,
) -> Option<Role> {
    if let Some(explicit) = explicit_role_attr(element) {
        if explicit.eq_ignore_ascii_case("none") {
            return None;
        }
        let tag = dom::tag_name(element);
        if let Some(diagnostics) = diagnostics {
            if !explicit_role_allowed(tag, &explicit.to_lowercase()) {
                diagnostics.push(
                    Diagnostic::minor(
                        "invalid role for this element",
                        dom::opening_tag(element),
                        dom::locator(element),
                    )
                    .message(format!("role=\"{explicit}\" is not permitted on <{tag}>"))
                    .link(
                        "https://www.w3.org/TR/html-aria/#docconformance",
                        "ARIA in HTML: document conformance",
                    ),
                );
            }
        }
        return Some(Role::from_attr(explicit));
    }

    implicit_role(element, document)
}

/// Explicit roles permitted per tag. Tags absent from the table accept any
/// role. The table covers the tags whose ARIA-in-HTML restrictions come up in
/// practice; per-type `<input>` restrictions are not modeled.
fn explicit_role_allowed(tag: &str, role: &str) -> bool {
    let permitted: &[&str] = match tag {
        "a" => &[
            "button",
            "checkbox",
            "link",
            "menuitem",
            "menuitemcheckbox",
            "menuitemradio",
            "option",
            "radio",
            "switch",
            "tab",
            "treeitem",
        ],
        "area" => &["link"],
        "button" => &[
            "button",
            "checkbox",
            "combobox",
            "link",
            "menuitem",
            "menuitemcheckbox",
            "menuitemradio",
            "option",
            "radio",
            "switch",
            "tab",
        ],
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => &["heading", "tab", "presentation"],
        "header" => &["banner", "group", "presentation"],
        "footer" => &["contentinfo", "group", "presentation"],
        "img" => &[
            "img",
            "button",
            "checkbox",
            "link",
            "menuitem",
            "menuitemcheckbox",
            "menuitemradio",
            "option",
            "progressbar",
            "radio",
            "scrollbar",
            "separator",
            "slider",
            "switch",
            "tab",
            "treeitem",
            "presentation",
        ],
        "li" => &[
            "listitem",
            "menuitem",
            "menuitemcheckbox",
            "menuitemradio",
            "option",
            "presentation",
            "radio",
            "separator",
            "tab",
            "treeitem",
        ],
        "main" => &["main"],
        "nav" => &["navigation", "presentation"],
        "ol" | "ul" => &[
            "list",
            "directory",
            "group",
            "listbox",
            "menu",
            "menubar",
            "presentation",
            "radiogroup",
            "tablist",
            "toolbar",
            "tree",
        ],
        "option" => &["option"],
        "select" => &["combobox", "listbox", "menu"],
        "summary" => &[],
        "table" => &["table", "grid", "treegrid", "presentation"],
        "textarea" => &["textbox"],
        "time" => &[],
        _ => return true,
    };
    permitted.contains(&role)
}

fn implicit_role(element: &ElementRef, document: &Html) -> Option<Role> {
    let tag = dom::tag_name(element);

    if dom::is_svg_scoped(element) {
        return svg_role(element, tag);
    }

    let role = match tag {
        "button" => Role::Button,
        "a" => return anchor_role(element),
        "input" => input_role(element),
        "select" => Role::ComboBox,
        "textarea" => Role::TextBox,
        "img" => Role::Img,
        "form" => Role::Form,
        "table" => Role::Table,
        "th" => Role::ColumnHeader,
        "td" => cell_role(element),
        "thead" | "tbody" | "tfoot" => Role::RowGroup,
        "tr" => Role::Row,
        "ul" | "ol" | "menu" => Role::List,
        "li" => list_item_role(element),
        "option" => option_role(element),
        "optgroup" => option_group_role(element),
        "nav" => Role::Navigation,
        "article" => Role::Article,
        "aside" => Role::Complementary,
        "footer" => Role::ContentInfo,
        "header" => Role::Banner,
        "main" => Role::Main,
        "section" => section_role(element, document),
        "fieldset" => Role::Group,
        "dialog" => Role::Dialog,
        "hr" => Role::Separator,
        "iframe" => Role::Document,
        "code" => Role::Code,
        "strong" => Role::Strong,
        "em" => Role::Emphasis,
        "dt" | "dfn" => Role::Term,
        "del" => Role::Deletion,
        "ins" => Role::Insertion,
        "mark" => Role::Mark,
        "sub" => Role::Subscript,
        "sup" => Role::Superscript,
        "time" => Role::Time,
        "p" => Role::Paragraph,
        "h1" => Role::Heading(1),
        "h2" => Role::Heading(2),
        "h3" => Role::Heading(3),
        "h4" => Role::Heading(4),
        "h5" => Role::Heading(5),
        "h6" => Role::Heading(6),
        _ => return None,
    };
    Some(role)
}

/// `<a>` is a link only when it actually carries a non-empty `href`.
fn anchor_role(element: &ElementRef) -> Option<Role> {
    match element.value().attr("href") {
        Some(href) if !href.trim().is_empty() => Some(Role::Link),
        _ => None,
    }
}

fn input_role(element: &ElementRef) -> Role {
    match element.value().attr("type") {
        Some("button") | Some("submit") | Some("reset") | Some("image") => Role::Button,
        Some("checkbox") => Role::Checkbox,
        Some("radio") => Role::Radio,
        Some("range") => Role::Slider,
        // Most input types read as textboxes.
        _ => Role::TextBox,
    }
}

/// `<td>` resolves to `gridcell` when an ancestor table-like container is an
/// explicit grid, plain `cell` otherwise.
fn cell_role(element: &ElementRef) -> Role {
    let container = dom::search_ancestors(element, |el| {
        dom::tag_name(el) == "table" || has_grid_role(el)
    });
    match container {
        Some(el) if has_grid_role(&el) => Role::GridCell,
        _ => Role::Cell,
    }
}

fn has_grid_role(element: &ElementRef) -> bool {
    matches!(
        explicit_role_attr(element).map(str::to_lowercase).as_deref(),
        Some("grid") | Some("treegrid")
    )
}

/// `<li>` is a listitem only directly under a list container.
fn list_item_role(element: &ElementRef) -> Role {
    match dom::parent_element(element) {
        Some(parent) if matches!(dom::tag_name(&parent), "ul" | "ol" | "menu") => Role::ListItem,
        _ => Role::Generic,
    }
}

fn option_role(element: &ElementRef) -> Role {
    match dom::parent_element(element) {
        Some(parent) if matches!(dom::tag_name(&parent), "select" | "optgroup" | "datalist") => {
            Role::Option
        }
        _ => Role::Generic,
    }
}

fn option_group_role(element: &ElementRef) -> Role {
    match dom::parent_element(element) {
        Some(parent) if dom::tag_name(&parent) == "select" => Role::Group,
        _ => Role::Generic,
    }
}

/// `<section>` is a `region` landmark only when nominally labelled; an
/// unlabelled section is just a generic container.
fn section_role(element: &ElementRef, document: &Html) -> Role {
    let el = element.value();
    if let Some(label) = el.attr("aria-label") {
        if !label.trim().is_empty() {
            return Role::Region;
        }
    }
    if let Some(labelledby) = el.attr("aria-labelledby") {
        let labelled = labelledby
            .split_whitespace()
            .filter_map(|id| dom::lookup_by_id(document, id))
            .any(|target| !dom::element_text(&target).is_empty());
        if labelled {
            return Role::Region;
        }
    }
    Role::Generic
}

fn svg_role(element: &ElementRef, tag: &str) -> Option<Role> {
    let role = match tag {
        "svg" => Role::GraphicsDocument,
        "image" => Role::Img,
        "a" => return anchor_role(element),
        "g" => Role::Group,
        "path" | "circle" | "rect" | "ellipse" | "line" | "polygon" | "polyline" => {
            Role::GraphicsSymbol
        }
        _ => return None,
    };
    Some(role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = scraper::Selector::parse(css).expect("valid selector");
        document.select(&selector).next().expect("element present")
    }

    fn role(html: &str, css: &str) -> Option<Role> {
        let d = doc(html);
        role_of(&first(&d, css), &d)
    }

    #[test]
    fn anchor_needs_href() {
        assert_eq!(role("<body><a>plain</a></body>", "a"), None);
        assert_eq!(
            role(r#"<body><a href="  ">blank</a></body>"#, "a"),
            None
        );
        assert_eq!(
            role(r##"<body><a href="#top">go</a></body>"##, "a"),
            Some(Role::Link)
        );
    }

    #[test]
    fn input_types_map() {
        let html = r#"<body>
            <input type="submit"><input type="checkbox"><input type="radio">
            <input type="range"><input type="email"><input>
        </body>"#;
        let d = doc(html);
        let inputs: Vec<_> = dom::find_all(&d, |el| dom::tag_name(el) == "input");
        let roles: Vec<_> = inputs.iter().map(|el| role_of(el, &d).unwrap()).collect();
        assert_eq!(
            roles,
            vec![
                Role::Button,
                Role::Checkbox,
                Role::Radio,
                Role::Slider,
                Role::TextBox,
                Role::TextBox
            ]
        );
    }

    #[test]
    fn explicit_role_wins_over_tag() {
        assert_eq!(
            role(r#"<body><span role="button">x</span></body>"#, "span"),
            Some(Role::Button)
        );
    }

    #[test]
    fn explicit_none_means_no_role() {
        assert_eq!(role(r#"<body><img role="none"></body>"#, "img"), None);
    }

    #[test]
    fn aria_role_attribute_is_a_fallback() {
        assert_eq!(
            role(r#"<body><span aria-role="link">x</span></body>"#, "span"),
            Some(Role::Link)
        );
        // `role` wins when both are present.
        assert_eq!(
            role(
                r#"<body><span role="button" aria-role="link">x</span></body>"#,
                "span"
            ),
            Some(Role::Button)
        );
    }

    #[test]
    fn invalid_explicit_role_still_wins_but_flags_minor() {
        let d = doc(r#"<body><time role="button">now</time></body>"#);
        let mut diags = Vec::new();
        let r = resolve_role(&first(&d, "time"), &d, &mut diags);
        assert_eq!(r, Some(Role::Button));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Minor);
        assert_eq!(diags[0].issue, "invalid role for this element");
    }

    #[test]
    fn valid_explicit_role_on_unrestricted_tag_is_quiet() {
        let d = doc(r#"<body><span role="button">x</span></body>"#);
        let mut diags = Vec::new();
        let r = resolve_role(&first(&d, "span"), &d, &mut diags);
        assert_eq!(r, Some(Role::Button));
        assert!(diags.is_empty());
    }

    #[test]
    fn td_in_grid_is_gridcell() {
        assert_eq!(
            role(
                r#"<body><table role="grid"><tr><td>x</td></tr></table></body>"#,
                "td"
            ),
            Some(Role::GridCell)
        );
        assert_eq!(
            role("<body><table><tr><td>x</td></tr></table></body>", "td"),
            Some(Role::Cell)
        );
    }

    #[test]
    fn li_outside_list_is_generic() {
        assert_eq!(
            role("<body><ul><li>x</li></ul></body>", "li"),
            Some(Role::ListItem)
        );
        assert_eq!(
            role("<body><div><li>x</li></div></body>", "li"),
            Some(Role::Generic)
        );
    }

    #[test]
    fn section_region_requires_label() {
        assert_eq!(
            role("<body><section>x</section></body>", "section"),
            Some(Role::Generic)
        );
        assert_eq!(
            role(
                r#"<body><section aria-label="News">x</section></body>"#,
                "section"
            ),
            Some(Role::Region)
        );
        assert_eq!(
            role(
                r#"<body><h2 id="t">News</h2><section aria-labelledby="t">x</section></body>"#,
                "section"
            ),
            Some(Role::Region)
        );
        assert_eq!(
            role(
                r#"<body><section aria-labelledby="missing">x</section></body>"#,
                "section"
            ),
            Some(Role::Generic)
        );
    }

    #[test]
    fn svg_shape_table() {
        let html = r#"<body><svg><g></g><circle></circle><image></image></svg></body>"#;
        assert_eq!(role(html, "svg"), Some(Role::GraphicsDocument));
        assert_eq!(role(html, "g"), Some(Role::Group));
        assert_eq!(role(html, "circle"), Some(Role::GraphicsSymbol));
        assert_eq!(role(html, "image"), Some(Role::Img));
    }

    #[test]
    fn text_level_tags_have_text_roles() {
        assert_eq!(role("<body><code>x</code></body>", "code"), Some(Role::Code));
        assert_eq!(role("<body><p>x</p></body>", "p"), Some(Role::Paragraph));
        assert_eq!(
            role("<body><time>x</time></body>", "time"),
            Some(Role::Time)
        );
    }

    #[test]
    fn unknown_tag_has_no_role() {
        assert_eq!(role("<body><div>x</div></body>", "div"), None);
        assert_eq!(role("<body><span>x</span></body>", "span"), None);
    }

    #[test]
    fn role_sets() {
        assert!(Role::Button.named_from_content());
        assert!(Role::Heading(3).named_from_content());
        assert!(!Role::TextBox.named_from_content());
        assert!(!Role::Presentation.supports_label());
        assert!(!Role::Code.supports_label());
        assert!(Role::Button.supports_label());
        assert!(Role::Dialog.requires_label());
        assert!(!Role::Button.requires_label());
    }

    #[test]
    fn role_display_round_trip() {
        assert_eq!(Role::Button.to_string(), "button");
        assert_eq!(Role::ColumnHeader.to_string(), "columnheader");
        assert_eq!(Role::Heading(4).to_string(), "heading[4]");
        assert_eq!(Role::GraphicsDocument.to_string(), "graphics-document");
        assert_eq!(Role::Other("doc-abstract".into()).to_string(), "doc-abstract");
    }
}
