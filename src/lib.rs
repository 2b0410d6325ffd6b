//! accscope computes the ARIA role and accessible name of HTML elements the
//! way assistive technologies do, reporting structured diagnostics for the
//! markup patterns that break screen readers.
//!
//! The entry point is [`inspect::inspect`]: give it a parsed document, an
//! element, and a visibility oracle, and it returns an
//! [`inspect::ElementInfo`] with the resolved role, name, tab index, and
//! every finding discovered along the way.

pub mod content;
pub mod diagnostics;
pub mod dom;
pub mod host;
pub mod inspect;
pub mod label;
pub mod name;
pub mod roles;
pub mod serialize;

pub use diagnostics::{Diagnostic, Severity};
pub use dom::{HiddenOracle, StyleHidden};
pub use inspect::{focusable_elements, inspect, ElementInfo};
pub use name::{AccessibleName, NameSource};
pub use roles::Role;
