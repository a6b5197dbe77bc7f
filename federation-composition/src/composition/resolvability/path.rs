use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;

/// Where the resolvability walk currently is, e.g. `Query.humans ... on Friend pets`.
///
/// Paths are immutable and share their prefix, so sibling branches of the walk each extend
/// their parent without copying it.
#[derive(Debug, Clone)]
pub(crate) struct ResolvabilityPath(Arc<PathSegment>);

#[derive(Debug)]
enum PathSegment {
    Root {
        type_name: Name,
        field_name: Name,
    },
    Field {
        parent: ResolvabilityPath,
        field_name: Name,
    },
    Fragment {
        parent: ResolvabilityPath,
        type_condition: Name,
    },
}

impl ResolvabilityPath {
    pub(crate) fn root(type_name: &Name, field_name: &Name) -> Self {
        Self(Arc::new(PathSegment::Root {
            type_name: type_name.clone(),
            field_name: field_name.clone(),
        }))
    }

    pub(crate) fn field(&self, field_name: &Name) -> Self {
        Self(Arc::new(PathSegment::Field {
            parent: self.clone(),
            field_name: field_name.clone(),
        }))
    }

    pub(crate) fn fragment(&self, type_condition: &Name) -> Self {
        Self(Arc::new(PathSegment::Fragment {
            parent: self.clone(),
            type_condition: type_condition.clone(),
        }))
    }

    fn ends_with_fragment(&self) -> bool {
        matches!(*self.0, PathSegment::Fragment { .. })
    }
}

impl fmt::Display for ResolvabilityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            PathSegment::Root {
                type_name,
                field_name,
            } => write!(f, "{type_name}.{field_name}"),
            PathSegment::Field { parent, field_name } => {
                write!(f, "{parent}")?;
                // A field selected inside an inline fragment is separated by a space.
                if parent.ends_with_fragment() {
                    write!(f, " {field_name}")
                } else {
                    write!(f, ".{field_name}")
                }
            }
            PathSegment::Fragment {
                parent,
                type_condition,
            } => {
                write!(f, "{parent} ... on {type_condition}")
            }
        }
    }
}
