//! Python bindings for grappler-item using PyO3
//!
//! Exposes [`GraphItem`] as the `Item` class.
//!
//! # Usage from Python
//!
//! ```python
//! import grappler_item
//!
//! item = grappler_item.Item(meta_graph.SerializeToString())
//! important = item.IdentifyImportantOps(sort_topologically=True)
//!
//! for op, outputs in item.GetOpProperties().items():
//!     props = [op_info_pb2.OpInfo.TensorProperties.FromString(o) for o in outputs]
//!
//! item.metagraph = edited.SerializeToString()  # rebuilt on the next query
//! ```

use prost::Message;
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};

use crate::builder::AnalysisPolicy;
use crate::error::ItemError;
use crate::io::load_metagraph_from_bytes;
use crate::item::GraphItem;

fn to_py_err(err: ItemError) -> PyErr {
    match err {
        ItemError::Validation { .. } | ItemError::InvalidMetaGraph(_) | ItemError::ProtoDecode(_) => {
            PyValueError::new_err(err.to_string())
        }
        ItemError::Io(_) => PyIOError::new_err(err.to_string()),
        ItemError::Decode { .. } => PyRuntimeError::new_err(err.to_string()),
    }
}

// ============================================================================
// Item class
// ============================================================================

/// Analysable snapshot of a serialized `MetaGraphDef`.
///
/// Raises:
///     ValueError: If the graph is invalid or has no fetch nodes
#[pyclass(name = "Item")]
pub struct PyItem {
    inner: GraphItem,
}

#[pymethods]
impl PyItem {
    #[new]
    #[pyo3(signature = (metagraph, ignore_colocation = true, ignore_user_placement = false))]
    fn new(metagraph: &[u8], ignore_colocation: bool, ignore_user_placement: bool) -> PyResult<Self> {
        let meta = load_metagraph_from_bytes(metagraph).map_err(to_py_err)?;
        let policy = AnalysisPolicy {
            ignore_colocation,
            ignore_user_placement,
        };
        let inner = GraphItem::from_metagraph(meta, policy).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Names of the ops the graph's outputs depend on.
    #[pyo3(name = "IdentifyImportantOps", signature = (sort_topologically = false))]
    fn identify_important_ops(&mut self, sort_topologically: bool) -> PyResult<Vec<String>> {
        if sort_topologically {
            self.inner.identify_important_ops_sorted().map_err(to_py_err)
        } else {
            let ops = self.inner.identify_important_ops().map_err(to_py_err)?;
            Ok(ops.into_iter().collect())
        }
    }

    /// Map of op name to the serialized `TensorProperties` of each output.
    #[pyo3(name = "GetOpProperties")]
    fn get_op_properties<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let properties = self.inner.op_properties().map_err(to_py_err)?;

        let dict = PyDict::new_bound(py);
        for (op, outputs) in &properties {
            let records = PyList::new_bound(
                py,
                outputs
                    .iter()
                    .map(|p| PyBytes::new_bound(py, &p.encode_to_vec())),
            );
            dict.set_item(op, records)?;
        }
        Ok(dict)
    }

    /// Groups of ops constrained to the same device.
    #[pyo3(name = "GetColocationGroups")]
    fn get_colocation_groups(&mut self) -> PyResult<Vec<Vec<String>>> {
        self.inner.colocation_groups().map_err(to_py_err)
    }

    /// Serialized `MetaGraphDef` the item tracks.
    #[getter]
    fn metagraph<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        let bytes = self.inner.metagraph().read(|meta| meta.encode_to_vec());
        PyBytes::new_bound(py, &bytes)
    }

    #[setter]
    fn set_metagraph(&mut self, metagraph: &[u8]) -> PyResult<()> {
        let meta = load_metagraph_from_bytes(metagraph).map_err(to_py_err)?;
        self.inner.set_metagraph(meta);
        Ok(())
    }

    fn __repr__(&self) -> String {
        let policy = self.inner.policy();
        format!(
            "Item(nodes={}, ignore_colocation={}, ignore_user_placement={})",
            self.inner
                .snapshot()
                .graph_def
                .as_ref()
                .map_or(0, |g| g.node.len()),
            policy.ignore_colocation,
            policy.ignore_user_placement
        )
    }
}

/// Get the version of this library.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// Module registration
// ============================================================================

/// Python module for meta-graph analysis.
#[pymodule]
#[pyo3(name = "grappler_item")]
fn grappler_item_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyItem>()?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
