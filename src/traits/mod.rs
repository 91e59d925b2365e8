//! Core traits for grappler-item
//!
//! Defines the boundary between a [`GraphItem`](crate::item::GraphItem) and
//! the engine that actually analyses the graph.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::Status;

/// Engine that builds analysis handles from serialized meta-graphs
///
/// The item only ever hands the backend canonical `MetaGraphDef` bytes and
/// the two policy flags; everything the backend returns is plain data.
///
/// # Example
///
/// ```ignore
/// struct NullBackend;
///
/// impl AnalysisBackend for NullBackend {
///     type Handle = ();
///
///     fn build_analysis(&self, _: &[u8], _: bool, _: bool) -> Result<(), Status> {
///         Ok(())
///     }
///     // ...
/// }
/// ```
pub trait AnalysisBackend {
    /// Opaque analysis state built from one snapshot
    type Handle;

    /// Build a handle from encoded `MetaGraphDef` bytes
    ///
    /// # Arguments
    /// * `metagraph` - Canonical encoding of the snapshot
    /// * `ignore_colocation` - Drop colocation constraints before analysis
    /// * `ignore_user_placement` - Drop device placement before analysis
    ///
    /// # Returns
    /// * `Err(Status)` when the graph is incomplete or invalid
    fn build_analysis(
        &self,
        metagraph: &[u8],
        ignore_colocation: bool,
        ignore_user_placement: bool,
    ) -> Result<Self::Handle, Status>;

    /// Names of the ops the graph's outputs depend on
    fn identify_important_ops(&self, handle: &Self::Handle, sort_topologically: bool)
        -> Vec<String>;

    /// Encoded `TensorProperties` records per op, one per output
    fn op_properties(&self, handle: &Self::Handle) -> IndexMap<String, Vec<Vec<u8>>>;

    /// Groups of ops constrained to the same device
    fn colocation_groups(&self, handle: &Self::Handle) -> Vec<Vec<String>>;
}

impl<B: AnalysisBackend + ?Sized> AnalysisBackend for Arc<B> {
    type Handle = B::Handle;

    fn build_analysis(
        &self,
        metagraph: &[u8],
        ignore_colocation: bool,
        ignore_user_placement: bool,
    ) -> Result<Self::Handle, Status> {
        (**self).build_analysis(metagraph, ignore_colocation, ignore_user_placement)
    }

    fn identify_important_ops(
        &self,
        handle: &Self::Handle,
        sort_topologically: bool,
    ) -> Vec<String> {
        (**self).identify_important_ops(handle, sort_topologically)
    }

    fn op_properties(&self, handle: &Self::Handle) -> IndexMap<String, Vec<Vec<u8>>> {
        (**self).op_properties(handle)
    }

    fn colocation_groups(&self, handle: &Self::Handle) -> Vec<Vec<String>> {
        (**self).colocation_groups(handle)
    }
}
