#![warn(clippy::pedantic)]
//! Typed syntax tree of the lattice simulation language.
//!
//! Every node carries a unique `id` and a source `location`. Downstream
//! passes never mutate the tree; they key their results by node id.
pub mod builder;
pub mod nodes;
pub(crate) mod nodes_impl;
