use itertools::Itertools;

/// Joins items as an English enumeration: `a`, `a and b`, `a, b and c`.
pub(crate) fn human_readable_list(items: impl IntoIterator<Item = String>) -> String {
    let mut items = items.into_iter().collect_vec();
    match items.len() {
        0 => String::new(),
        1 => items.remove(0),
        _ => {
            let last = items.pop().unwrap_or_default();
            format!("{} and {last}", items.join(", "))
        }
    }
}

/// Renders subgraph names for error messages, e.g. `subgraphs "a" and "b"`.
pub(crate) fn human_readable_subgraph_names<T: AsRef<str>>(
    names: impl IntoIterator<Item = T>,
) -> String {
    let names = names
        .into_iter()
        .map(|name| format!("\"{}\"", name.as_ref()))
        .collect_vec();
    let prefix = if names.len() == 1 {
        "subgraph"
    } else {
        "subgraphs"
    };
    format!("{prefix} {}", human_readable_list(names))
}
