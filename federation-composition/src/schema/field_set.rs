use std::fmt;

use apollo_compiler::Name;
use apollo_compiler::ast;

/// A parsed `fields` argument of `@key`, `@provides` or `@requires`, e.g. `"id org { id }"`.
///
/// Only plain fields (optionally with a sub-selection) and inline fragments are allowed; the
/// selection is not bound to a schema, callers check it against the types it applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldSet {
    pub selections: Vec<FieldSetSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldSetSelection {
    Field {
        name: Name,
        selections: FieldSet,
    },
    InlineFragment {
        type_condition: Option<Name>,
        selections: FieldSet,
    },
}

impl FieldSet {
    pub fn parse(source: &str) -> Result<Self, String> {
        if source.trim().is_empty() {
            return Err("the field set is empty".to_owned());
        }
        let document = ast::Document::parse(format!("{{ {source} }}"), "field_set.graphql")
            .map_err(|with_errors| {
                format!("the field set \"{source}\" is invalid: {}", with_errors.errors)
            })?;
        let mut operations = document.definitions.iter().filter_map(|definition| {
            if let ast::Definition::OperationDefinition(operation) = definition {
                Some(operation)
            } else {
                None
            }
        });
        match (operations.next(), operations.next()) {
            (Some(operation), None) if document.definitions.len() == 1 => {
                Self::from_selections(source, &operation.selection_set)
            }
            _ => Err(format!(
                "the field set \"{source}\" must be a single selection set"
            )),
        }
    }

    fn from_selections(source: &str, selections: &[ast::Selection]) -> Result<Self, String> {
        let mut field_set = Self::default();
        for selection in selections {
            let selection = match selection {
                ast::Selection::Field(field) => {
                    if field.alias.is_some() {
                        return Err(format!(
                            "the field set \"{source}\" cannot use aliases (\"{}\")",
                            field.name
                        ));
                    }
                    if !field.arguments.is_empty() {
                        return Err(format!(
                            "the field set \"{source}\" cannot select field \"{}\" with arguments",
                            field.name
                        ));
                    }
                    if !field.directives.is_empty() {
                        return Err(format!(
                            "the field set \"{source}\" cannot apply directives to field \"{}\"",
                            field.name
                        ));
                    }
                    FieldSetSelection::Field {
                        name: field.name.clone(),
                        selections: Self::from_selections(source, &field.selection_set)?,
                    }
                }
                ast::Selection::InlineFragment(fragment) => FieldSetSelection::InlineFragment {
                    type_condition: fragment.type_condition.clone(),
                    selections: Self::from_selections(source, &fragment.selection_set)?,
                },
                ast::Selection::FragmentSpread(spread) => {
                    return Err(format!(
                        "the field set \"{source}\" cannot use the named fragment \"{}\"",
                        spread.fragment_name
                    ));
                }
            };
            field_set.selections.push(selection);
        }
        Ok(field_set)
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Names of the fields selected directly on the parent type.
    pub fn top_level_field_names(&self) -> Vec<&Name> {
        let mut names = Vec::new();
        for selection in &self.selections {
            match selection {
                FieldSetSelection::Field { name, .. } => names.push(name),
                FieldSetSelection::InlineFragment {
                    type_condition: None,
                    selections,
                } => names.extend(selections.top_level_field_names()),
                FieldSetSelection::InlineFragment { .. } => {}
            }
        }
        names
    }

    /// Returns the merged sub-selection of every selection of `field_name`, or `None` if the
    /// field is not selected at all.
    pub fn selection_for_field(&self, field_name: &str) -> Option<Self> {
        let mut found = None;
        for selection in &self.selections {
            match selection {
                FieldSetSelection::Field { name, selections } if name.as_str() == field_name => {
                    found
                        .get_or_insert_with(Self::default)
                        .extend(selections.clone());
                }
                FieldSetSelection::InlineFragment {
                    type_condition: None,
                    selections,
                } => {
                    if let Some(nested) = selections.selection_for_field(field_name) {
                        found.get_or_insert_with(Self::default).extend(nested);
                    }
                }
                _ => {}
            }
        }
        found
    }

    /// Flattens a selection made on an abstract type into the part that applies to one of its
    /// possible object types.
    pub fn for_possible_type(&self, abstract_name: &str, object_name: &str) -> Self {
        let mut result = Self::default();
        for selection in &self.selections {
            match selection {
                FieldSetSelection::Field { .. } => result.selections.push(selection.clone()),
                FieldSetSelection::InlineFragment {
                    type_condition,
                    selections,
                } => {
                    let applies = type_condition.as_ref().is_none_or(|condition| {
                        condition.as_str() == abstract_name || condition.as_str() == object_name
                    });
                    if applies {
                        result.extend(selections.for_possible_type(abstract_name, object_name));
                    }
                }
            }
        }
        result
    }

    pub fn extend(&mut self, other: Self) {
        self.selections.extend(other.selections);
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, selection) in self.selections.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            match selection {
                FieldSetSelection::Field { name, selections } => {
                    f.write_str(name)?;
                    if !selections.is_empty() {
                        write!(f, " {{ {selections} }}")?;
                    }
                }
                FieldSetSelection::InlineFragment {
                    type_condition,
                    selections,
                } => {
                    f.write_str("...")?;
                    if let Some(condition) = type_condition {
                        write!(f, " on {condition}")?;
                    }
                    write!(f, " {{ {selections} }}")?;
                }
            }
        }
        Ok(())
    }
}
