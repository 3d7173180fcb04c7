//! Mutable HTML document model used by the navigation and hydration layers.
//!
//! Pages are parsed with `scraper` (html5ever) and copied into an
//! arena-backed [`Document`] that supports the edits a live page needs:
//! attribute and class changes, subtree insertion and removal, `innerHTML`
//! replacement, and importing a subtree from another document.
//!
//! - [`Document`] / [`NodeId`]: the tree and its handles
//! - [`Selector`]: a small CSS selector matcher for the tree
//! - [`PageFragment`]: the parsed result of a soft-navigation fetch

mod document;
mod fragment;
mod node;
mod selector;
mod serialize;

pub use document::{Document, NodeId};
pub use fragment::PageFragment;
pub use node::{ElementData, Node};
pub use selector::Selector;
pub use serialize::escape_text;
