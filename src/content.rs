//! Name from descendant content.
//!
//! Recursive descent over an element's children: text nodes contribute their
//! raw text, element children contribute their own resolved accessible name.
//! Fragments are joined with single spaces and whitespace-collapsed once at
//! the end, so surrounding markup never changes the final text.
//!
//! Re-entering a node already under traversal (a `<label>` wrapping the
//! control it names is the common case) is detected with a visited set owned
//! by the outermost traversal and torn down when it returns.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node};

use crate::dom;
use crate::name::{self, NameContext, Resolution};
use crate::roles::{self, Role};

/// Result of a content traversal. `Visited` means the starting element was
/// already on the traversal stack.
#[derive(Debug, PartialEq, Eq)]
pub enum ContentText {
    New(String),
    Visited,
}

/// Whether step 3 applies to a focus target, and if so which subtree to
/// leave out of the traversal.
#[derive(Debug, PartialEq, Eq)]
pub enum ContentGate {
    Skip,
    Take { exclude: Option<NodeId> },
}

/// Decide whether `element` names itself from its content. Only roles whose
/// name comes from author content qualify; two of them additionally exclude
/// their popup container so a menu item is not named after its submenu.
pub fn content_gate(element: &ElementRef, document: &Html) -> ContentGate {
    let Some(role) = roles::role_of(element, document) else {
        return ContentGate::Skip;
    };
    if !role.named_from_content() {
        return ContentGate::Skip;
    }
    let exclude = match role {
        Role::MenuItem => {
            dom::find_descendant(element, &|el| dom::tag_name(el) == "menu").map(|el| el.id())
        }
        Role::TreeItem => dom::find_descendant(element, &|el| {
            roles::role_of(el, document) == Some(Role::Group)
        })
        .map(|el| el.id()),
        _ => None,
    };
    ContentGate::Take { exclude }
}

/// Gather the text content of `element`, resolving each element child's own
/// accessible name. The first traversal of an invocation creates the visited
/// set (seeded with `exclude` when given) and clears it on the way out;
/// nested traversals reuse it, which is what makes cycles observable.
pub fn text_from_content(
    element: &ElementRef,
    ctx: &mut NameContext,
    exclude: Option<NodeId>,
) -> ContentText {
    let is_owner = ctx.visited.is_none();
    let visited = ctx.visited.get_or_insert_with(Default::default);
    if let Some(id) = exclude {
        visited.insert(id);
    }
    if !visited.insert(element.id()) {
        return ContentText::Visited;
    }

    let mut fragments: Vec<String> = Vec::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if !text.trim().is_empty() {
                    fragments.push(text.to_string());
                }
            }
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                // A cycle below a child aborts that child only; siblings may
                // still contribute.
                if let Resolution::Found(accname) = name::resolve(&child_el, ctx, false) {
                    if !accname.text.is_empty() {
                        fragments.push(accname.text);
                    }
                }
            }
            _ => {}
        }
    }

    if is_owner {
        ctx.visited = None;
    }
    ContentText::New(dom::collapse_whitespace(&fragments.join(" ")))
}
