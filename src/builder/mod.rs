//! Item builder module
//!
//! Builds a [`GrapplerItem`] from a meta-graph: the graph analyses run over,
//! plus the fetch / feed / init / queue / saver node sets.
//!
//! - [`item`]: [`AnalysisPolicy`], [`GrapplerItem`], [`build_item`]
//! - [`fields`]: metadata extraction from collections and signatures
//! - [`cleanup`]: policy application on the item's graph copy
//!
//! # Example
//!
//! ```ignore
//! use grappler_item::builder::{build_item, AnalysisPolicy};
//!
//! let item = build_item(&meta, AnalysisPolicy::default())?;
//! println!("fetching {:?}", item.fetch);
//! ```

pub mod cleanup;
pub mod fields;
pub mod item;

pub use item::{build_item, AnalysisPolicy, GrapplerItem};
