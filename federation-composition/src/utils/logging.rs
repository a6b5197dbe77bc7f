/// This macro is a wrapper around `tracing::trace!` that tags an event with the name of the data
/// structure it captures, so that a log reader can follow how the federated graph and the error
/// list evolve over the passes of a composition run.
///
/// The data must implement the tracing crate's `Value` trait; ideally, it is a string
/// representation of the data being captured. EX:
/// ```ignore
/// snapshot!("FederatedGraph", graph.to_string(), "merged subgraphs");
/// // Generates:
/// // trace!(snapshot = "FederatedGraph", data = graph.to_string(), "merged subgraphs");
/// ```
macro_rules! snapshot {
    ($name:literal, $value:expr, $msg:literal) => {
        #[cfg(feature = "snapshot_tracing")]
        tracing::trace!(snapshot = $name, data = $value, $msg);
    };
}

pub(crate) use snapshot;
