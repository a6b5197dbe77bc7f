//! Validation and canonicalization of one subgraph document.
//!
//! Extensions are folded into whole definitions, root operation types get their canonical
//! names, federation plumbing is stripped, and every federation directive is checked for
//! placement and parsed. Any error here is fatal to the whole composition batch.

use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::collections::HashSet;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::name;
use indexmap::map::Entry;

use crate::error::CompositionError;
use crate::schema::EntityKey;
use crate::schema::FieldSet;
use crate::schema::FieldSetSelection;
use crate::schema::TypeKind;
use crate::subgraph::Subgraph;
use crate::subgraph::spec::DirectiveTarget;
use crate::subgraph::spec::EXTENDS_DIRECTIVE_NAME;
use crate::subgraph::spec::EXTERNAL_DIRECTIVE_NAME;
use crate::subgraph::spec::FEDERATION_QUERY_FIELD_NAMES;
use crate::subgraph::spec::FEDERATION_V2_LINK_PREFIX;
use crate::subgraph::spec::FIELDS_ARGUMENT_NAME;
use crate::subgraph::spec::FROM_ARGUMENT_NAME;
use crate::subgraph::spec::FederationVersion;
use crate::subgraph::spec::KEY_DIRECTIVE_NAME;
use crate::subgraph::spec::LINK_DIRECTIVE_NAME;
use crate::subgraph::spec::NON_REPEATABLE_DIRECTIVE_NAMES;
use crate::subgraph::spec::OVERRIDE_DIRECTIVE_NAME;
use crate::subgraph::spec::PROVIDES_DIRECTIVE_NAME;
use crate::subgraph::spec::QUERY_TYPE_NAME;
use crate::subgraph::spec::REQUIRES_DIRECTIVE_NAME;
use crate::subgraph::spec::RESOLVABLE_ARGUMENT_NAME;
use crate::subgraph::spec::SHAREABLE_DIRECTIVE_NAME;
use crate::subgraph::spec::URL_ARGUMENT_NAME;
use crate::subgraph::spec::canonical_directive_name;
use crate::subgraph::spec::federation_directive;
use crate::subgraph::spec::is_built_in_scalar;
use crate::subgraph::spec::is_federation_type_name;
use crate::subgraph::spec::is_root_type_name;

/// A subgraph whose document has been validated and canonicalized.
#[derive(Debug, Clone)]
pub struct NormalizedSubgraph {
    pub name: Arc<str>,
    pub url: String,
    pub version: FederationVersion,
    pub types: IndexMap<Name, NormalizedType>,
}

/// One named type of a subgraph, with all of its extensions folded in.
#[derive(Debug, Clone)]
pub struct NormalizedType {
    pub name: Name,
    pub kind: TypeKind,
    pub description: Option<Node<str>>,
    /// Type-level directives of the definition and of every extension.
    pub directives: ast::DirectiveList,
    pub implements_interfaces: Vec<Name>,
    pub fields: IndexMap<Name, NormalizedField>,
    pub union_members: Vec<Name>,
    pub enum_values: Vec<Node<ast::EnumValueDefinition>>,
    pub input_fields: Vec<Node<ast::InputValueDefinition>>,
    pub keys: Vec<EntityKey>,
}

impl NormalizedType {
    fn new(kind: TypeKind, name: Name) -> Self {
        Self {
            name,
            kind,
            description: None,
            directives: Default::default(),
            implements_interfaces: Vec::new(),
            fields: Default::default(),
            union_members: Vec::new(),
            enum_values: Vec::new(),
            input_fields: Vec::new(),
            keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedField {
    pub definition: Node<ast::FieldDefinition>,
    /// `@shareable` on the field, or on the definition block declaring the field.
    pub shareable: bool,
    /// `@external` on the field, or on the definition block declaring the field.
    pub external: bool,
    pub provides: Option<FieldSet>,
    pub requires: Option<FieldSet>,
    pub override_from: Option<String>,
}

#[derive(Default)]
struct FieldAnnotations {
    provides: Option<FieldSet>,
    requires: Option<FieldSet>,
    override_from: Option<String>,
}

/// A type definition or extension, before it is folded with its siblings.
struct TypeBlock {
    kind: TypeKind,
    name: Name,
    description: Option<Node<str>>,
    directives: ast::DirectiveList,
    implements_interfaces: Vec<Name>,
    fields: Vec<Node<ast::FieldDefinition>>,
    union_members: Vec<Name>,
    enum_values: Vec<Node<ast::EnumValueDefinition>>,
    input_fields: Vec<Node<ast::InputValueDefinition>>,
    is_extension: bool,
}

impl TypeBlock {
    fn new(
        kind: TypeKind,
        name: &Name,
        directives: &ast::DirectiveList,
        is_extension: bool,
    ) -> Self {
        Self {
            kind,
            name: name.clone(),
            description: None,
            directives: directives.clone(),
            implements_interfaces: Vec::new(),
            fields: Vec::new(),
            union_members: Vec::new(),
            enum_values: Vec::new(),
            input_fields: Vec::new(),
            is_extension,
        }
    }

    fn from_definition(definition: &ast::Definition) -> Option<Self> {
        use ast::Definition;

        let block = match definition {
            Definition::ObjectTypeDefinition(def) => Self {
                description: def.description.clone(),
                implements_interfaces: def.implements_interfaces.clone(),
                fields: def.fields.clone(),
                ..Self::new(TypeKind::Object, &def.name, &def.directives, false)
            },
            Definition::ObjectTypeExtension(ext) => Self {
                implements_interfaces: ext.implements_interfaces.clone(),
                fields: ext.fields.clone(),
                ..Self::new(TypeKind::Object, &ext.name, &ext.directives, true)
            },
            Definition::InterfaceTypeDefinition(def) => Self {
                description: def.description.clone(),
                implements_interfaces: def.implements_interfaces.clone(),
                fields: def.fields.clone(),
                ..Self::new(TypeKind::Interface, &def.name, &def.directives, false)
            },
            Definition::InterfaceTypeExtension(ext) => Self {
                implements_interfaces: ext.implements_interfaces.clone(),
                fields: ext.fields.clone(),
                ..Self::new(TypeKind::Interface, &ext.name, &ext.directives, true)
            },
            Definition::UnionTypeDefinition(def) => Self {
                description: def.description.clone(),
                union_members: def.members.clone(),
                ..Self::new(TypeKind::Union, &def.name, &def.directives, false)
            },
            Definition::UnionTypeExtension(ext) => Self {
                union_members: ext.members.clone(),
                ..Self::new(TypeKind::Union, &ext.name, &ext.directives, true)
            },
            Definition::ScalarTypeDefinition(def) => Self {
                description: def.description.clone(),
                ..Self::new(TypeKind::Scalar, &def.name, &def.directives, false)
            },
            Definition::ScalarTypeExtension(ext) => {
                Self::new(TypeKind::Scalar, &ext.name, &ext.directives, true)
            }
            Definition::EnumTypeDefinition(def) => Self {
                description: def.description.clone(),
                enum_values: def.values.clone(),
                ..Self::new(TypeKind::Enum, &def.name, &def.directives, false)
            },
            Definition::EnumTypeExtension(ext) => Self {
                enum_values: ext.values.clone(),
                ..Self::new(TypeKind::Enum, &ext.name, &ext.directives, true)
            },
            Definition::InputObjectTypeDefinition(def) => Self {
                description: def.description.clone(),
                input_fields: def.fields.clone(),
                ..Self::new(TypeKind::InputObject, &def.name, &def.directives, false)
            },
            Definition::InputObjectTypeExtension(ext) => Self {
                input_fields: ext.fields.clone(),
                ..Self::new(TypeKind::InputObject, &ext.name, &ext.directives, true)
            },
            _ => return None,
        };
        Some(block)
    }
}

/// Normalizes every subgraph of a composition batch.
///
/// All errors of all subgraphs are collected before failing, so a caller sees every
/// malformed subgraph at once.
pub fn normalize_subgraphs(
    subgraphs: &[Subgraph],
) -> Result<Vec<NormalizedSubgraph>, Vec<CompositionError>> {
    let mut errors = validate_subgraph_names(subgraphs);
    let normalized: Vec<NormalizedSubgraph> = subgraphs
        .iter()
        .map(normalize_subgraph)
        .filter_map(|r| r.map_err(|e| errors.extend(e)).ok())
        .collect();
    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}

fn validate_subgraph_names(subgraphs: &[Subgraph]) -> Vec<CompositionError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::default();
    for (index, subgraph) in subgraphs.iter().enumerate() {
        if subgraph.name.trim().is_empty() {
            errors.push(CompositionError::InvalidSubgraphName {
                message: format!("The subgraph at position {index} has an empty name"),
            });
        } else if !seen.insert(subgraph.name.as_str()) {
            errors.push(CompositionError::InvalidSubgraphName {
                message: format!(
                    "The subgraph name \"{}\" is used by more than one subgraph",
                    subgraph.name
                ),
            });
        }
    }
    errors
}

pub fn normalize_subgraph(
    subgraph: &Subgraph,
) -> Result<NormalizedSubgraph, Vec<CompositionError>> {
    let mut normalizer = Normalizer {
        subgraph,
        errors: Vec::new(),
        links_federation_v2: false,
        uses_v2_directive: false,
    };
    let renames = normalizer.root_type_renames();
    let blocks = normalizer.collect_blocks(&renames);
    let mut types = normalizer.assemble_types(blocks);
    normalizer.validate_references(&types);
    normalizer.apply_federation_directives(&mut types);
    if !normalizer.errors.is_empty() {
        return Err(normalizer.errors);
    }

    let version = if normalizer.links_federation_v2 || normalizer.uses_v2_directive {
        FederationVersion::V2
    } else {
        FederationVersion::V1
    };
    tracing::debug!(
        subgraph = %subgraph.name,
        %version,
        types = types.len(),
        "normalized subgraph"
    );
    Ok(NormalizedSubgraph {
        name: Arc::from(subgraph.name.as_str()),
        url: subgraph.url.clone(),
        version,
        types,
    })
}

struct Normalizer<'a> {
    subgraph: &'a Subgraph,
    errors: Vec<CompositionError>,
    links_federation_v2: bool,
    uses_v2_directive: bool,
}

impl Normalizer<'_> {
    fn error(&mut self, message: String) {
        self.errors
            .push(CompositionError::parse(&self.subgraph.name, message));
    }

    fn directive_error(&mut self, message: String) {
        self.errors
            .push(CompositionError::directive_usage(&self.subgraph.name, message));
    }

    /// Maps root operation types declared under another name to their canonical name.
    fn root_type_renames(&mut self) -> IndexMap<Name, Name> {
        let mut renames: IndexMap<Name, Name> = IndexMap::default();
        for definition in &self.subgraph.document.definitions {
            let (root_operations, directives) = match definition {
                ast::Definition::SchemaDefinition(def) => (&def.root_operations, &def.directives),
                ast::Definition::SchemaExtension(ext) => (&ext.root_operations, &ext.directives),
                _ => continue,
            };
            self.check_directives(directives, DirectiveTarget::Schema, "schema");
            let links_v2 = directives.iter().any(|directive| {
                canonical_directive_name(&directive.name) == LINK_DIRECTIVE_NAME
                    && directive_argument(directive, URL_ARGUMENT_NAME)
                        .and_then(|url| url.as_str())
                        .is_some_and(|url| url.contains(FEDERATION_V2_LINK_PREFIX))
            });
            self.links_federation_v2 |= links_v2;

            for root_operation in root_operations {
                let (operation_type, type_name) = &**root_operation;
                let canonical = match operation_type {
                    ast::OperationType::Query => name!("Query"),
                    ast::OperationType::Mutation => name!("Mutation"),
                    ast::OperationType::Subscription => name!("Subscription"),
                };
                if *type_name != canonical {
                    renames.insert(type_name.clone(), canonical);
                }
            }
        }
        renames
    }

    fn collect_blocks(&mut self, renames: &IndexMap<Name, Name>) -> Vec<TypeBlock> {
        let mut blocks = Vec::new();
        for definition in &self.subgraph.document.definitions {
            if matches!(
                definition,
                ast::Definition::OperationDefinition(_) | ast::Definition::FragmentDefinition(_)
            ) {
                self.error("Executable definitions are not allowed in a subgraph schema".to_owned());
                continue;
            }
            let Some(mut block) = TypeBlock::from_definition(definition) else {
                continue;
            };
            if is_federation_type_name(&block.name) {
                continue;
            }

            if let Some(canonical) = renames.get(&block.name) {
                block.name = canonical.clone();
            } else if let Some((renamed, _)) = renames
                .iter()
                .find(|(_, canonical)| **canonical == block.name)
            {
                self.error(format!(
                    "Type \"{}\" conflicts with root operation type \"{renamed}\", which is composed as \"{}\"",
                    block.name, block.name
                ));
                continue;
            }
            if !renames.is_empty() {
                for field in &mut block.fields {
                    let ty = rename_type(&field.ty, renames);
                    field.make_mut().ty = ty;
                }
                for member in &mut block.union_members {
                    if let Some(canonical) = renames.get(member) {
                        *member = canonical.clone();
                    }
                }
            }
            if block.name.as_str() == QUERY_TYPE_NAME {
                block
                    .fields
                    .retain(|field| !FEDERATION_QUERY_FIELD_NAMES.contains(&field.name.as_str()));
            }
            blocks.push(block);
        }
        blocks
    }

    fn assemble_types(&mut self, blocks: Vec<TypeBlock>) -> IndexMap<Name, NormalizedType> {
        let mut types: IndexMap<Name, NormalizedType> = IndexMap::default();
        let mut defined: HashSet<Name> = HashSet::default();
        for block in blocks {
            let is_definition =
                !block.is_extension && !has_directive(&block.directives, EXTENDS_DIRECTIVE_NAME);
            if is_definition && !defined.insert(block.name.clone()) {
                self.error(format!("Type \"{}\" is defined more than once", block.name));
                continue;
            }
            let block_shareable = has_directive(&block.directives, SHAREABLE_DIRECTIVE_NAME);
            let block_external = has_directive(&block.directives, EXTERNAL_DIRECTIVE_NAME);

            let ty = match types.entry(block.name.clone()) {
                Entry::Vacant(entry) => entry.insert(NormalizedType::new(block.kind, block.name)),
                Entry::Occupied(entry) => {
                    let existing = entry.into_mut();
                    if existing.kind != block.kind {
                        self.error(format!(
                            "Type \"{}\" is declared both as {} type and as {} type",
                            existing.name, existing.kind, block.kind
                        ));
                        continue;
                    }
                    existing
                }
            };

            if ty.description.is_none() {
                ty.description = block.description;
            }
            ty.directives.extend(block.directives.iter().cloned());
            for interface in block.implements_interfaces {
                if !ty.implements_interfaces.contains(&interface) {
                    ty.implements_interfaces.push(interface);
                }
            }
            for field in block.fields {
                if ty.fields.contains_key(&field.name) {
                    self.error(format!(
                        "Field \"{}.{}\" is defined more than once",
                        ty.name, field.name
                    ));
                    continue;
                }
                let mut argument_names = HashSet::default();
                for argument in &field.arguments {
                    if !argument_names.insert(&argument.name) {
                        self.error(format!(
                            "Argument \"{}.{}({}:)\" is defined more than once",
                            ty.name, field.name, argument.name
                        ));
                    }
                }
                let shareable =
                    block_shareable || has_directive(&field.directives, SHAREABLE_DIRECTIVE_NAME);
                let external =
                    block_external || has_directive(&field.directives, EXTERNAL_DIRECTIVE_NAME);
                ty.fields.insert(
                    field.name.clone(),
                    NormalizedField {
                        definition: field,
                        shareable,
                        external,
                        provides: None,
                        requires: None,
                        override_from: None,
                    },
                );
            }
            for member in block.union_members {
                if !ty.union_members.contains(&member) {
                    ty.union_members.push(member);
                }
            }
            for value in block.enum_values {
                if ty.enum_values.iter().any(|v| v.value == value.value) {
                    self.error(format!(
                        "Enum value \"{}.{}\" is defined more than once",
                        ty.name, value.value
                    ));
                    continue;
                }
                ty.enum_values.push(value);
            }
            for input_field in block.input_fields {
                if ty.input_fields.iter().any(|f| f.name == input_field.name) {
                    self.error(format!(
                        "Input field \"{}.{}\" is defined more than once",
                        ty.name, input_field.name
                    ));
                    continue;
                }
                ty.input_fields.push(input_field);
            }
        }

        // Root types only made of federation plumbing carry nothing to compose.
        types.retain(|name, ty| {
            !(is_root_type_name(name) && ty.kind == TypeKind::Object && ty.fields.is_empty())
        });
        types
    }

    fn validate_references(&mut self, types: &IndexMap<Name, NormalizedType>) {
        for ty in types.values() {
            match ty.kind {
                TypeKind::Object | TypeKind::Interface => {
                    if ty.fields.is_empty() {
                        self.error(format!(
                            "Type \"{}\" must define at least one field",
                            ty.name
                        ));
                    }
                    for field in ty.fields.values() {
                        let definition = &field.definition;
                        let coordinate = format!("{}.{}", ty.name, definition.name);
                        self.check_output_reference(
                            types,
                            &coordinate,
                            definition.ty.inner_named_type(),
                        );
                        for argument in &definition.arguments {
                            self.check_input_reference(
                                types,
                                &format!("{coordinate}({}:)", argument.name),
                                argument.ty.inner_named_type(),
                            );
                        }
                    }
                    for interface in &ty.implements_interfaces {
                        let is_interface = types
                            .get(interface)
                            .is_some_and(|target| target.kind == TypeKind::Interface);
                        if !is_interface {
                            self.error(format!(
                                "Type \"{}\" implements \"{interface}\", which is not an interface type defined in this subgraph",
                                ty.name
                            ));
                        }
                    }
                }
                TypeKind::Union => {
                    for member in &ty.union_members {
                        let is_object = types
                            .get(member)
                            .is_some_and(|target| target.kind == TypeKind::Object);
                        if !is_object {
                            self.error(format!(
                                "Union \"{}\" includes \"{member}\", which is not an object type defined in this subgraph",
                                ty.name
                            ));
                        }
                    }
                }
                TypeKind::InputObject => {
                    for input_field in &ty.input_fields {
                        self.check_input_reference(
                            types,
                            &format!("{}.{}", ty.name, input_field.name),
                            input_field.ty.inner_named_type(),
                        );
                    }
                }
                TypeKind::Scalar | TypeKind::Enum => {}
            }
        }
    }

    fn check_output_reference(
        &mut self,
        types: &IndexMap<Name, NormalizedType>,
        coordinate: &str,
        named_type: &Name,
    ) {
        if is_built_in_scalar(named_type) {
            return;
        }
        match types.get(named_type) {
            Some(target) if target.kind != TypeKind::InputObject => {}
            Some(_) => self.error(format!(
                "\"{coordinate}\" uses input object type \"{named_type}\" as an output type"
            )),
            None => self.error(format!(
                "\"{coordinate}\" references undefined type \"{named_type}\""
            )),
        }
    }

    fn check_input_reference(
        &mut self,
        types: &IndexMap<Name, NormalizedType>,
        coordinate: &str,
        named_type: &Name,
    ) {
        if is_built_in_scalar(named_type) {
            return;
        }
        match types.get(named_type) {
            Some(target) if target.kind.is_input() => {}
            Some(target) => self.error(format!(
                "\"{coordinate}\" uses {} type \"{named_type}\" as an input type",
                target.kind
            )),
            None => self.error(format!(
                "\"{coordinate}\" references undefined type \"{named_type}\""
            )),
        }
    }

    /// Checks placement of every federation directive and records keys, `@provides`,
    /// `@requires` and `@override` on the types they apply to.
    fn apply_federation_directives(&mut self, types: &mut IndexMap<Name, NormalizedType>) {
        let mut updates = Vec::with_capacity(types.len());
        for ty in types.values() {
            self.check_directives(&ty.directives, DirectiveTarget::for_type(ty.kind), &ty.name);
            let keys = self.entity_keys(types, ty);

            let mut field_annotations = Vec::with_capacity(ty.fields.len());
            for field in ty.fields.values() {
                let coordinate = format!("{}.{}", ty.name, field.definition.name);
                self.check_directives(
                    &field.definition.directives,
                    DirectiveTarget::for_field(ty.kind),
                    &coordinate,
                );
                for argument in &field.definition.arguments {
                    self.check_directives(
                        &argument.directives,
                        DirectiveTarget::Argument,
                        &format!("{coordinate}({}:)", argument.name),
                    );
                }
                field_annotations.push(self.field_annotations(types, ty, field, &coordinate));
            }
            for value in &ty.enum_values {
                self.check_directives(
                    &value.directives,
                    DirectiveTarget::EnumValue,
                    &format!("{}.{}", ty.name, value.value),
                );
            }
            for input_field in &ty.input_fields {
                self.check_directives(
                    &input_field.directives,
                    DirectiveTarget::InputField,
                    &format!("{}.{}", ty.name, input_field.name),
                );
            }
            updates.push((ty.name.clone(), keys, field_annotations));
        }

        for (type_name, keys, field_annotations) in updates {
            let Some(ty) = types.get_mut(&type_name) else {
                continue;
            };
            ty.keys = keys;
            for (field, annotations) in ty.fields.values_mut().zip(field_annotations) {
                field.provides = annotations.provides;
                field.requires = annotations.requires;
                field.override_from = annotations.override_from;
            }
        }
    }

    fn check_directives(
        &mut self,
        directives: &ast::DirectiveList,
        target: DirectiveTarget,
        coordinate: &str,
    ) {
        let mut applied: Vec<&str> = Vec::new();
        for directive in directives.iter() {
            let Some(spec) = federation_directive(&directive.name) else {
                continue;
            };
            if spec.v2_only {
                self.uses_v2_directive = true;
            }
            if !spec.supported {
                self.directive_error(format!(
                    "The directive \"@{}\" applied on {target} \"{coordinate}\" is not supported by composition",
                    spec.name
                ));
            } else if !spec.targets.contains(&target) {
                self.directive_error(format!(
                    "The directive \"@{}\" cannot be applied on {target} \"{coordinate}\"",
                    spec.name
                ));
            }
            if NON_REPEATABLE_DIRECTIVE_NAMES.contains(&spec.name) && applied.contains(&spec.name)
            {
                self.directive_error(format!(
                    "The directive \"@{}\" cannot be applied more than once on {target} \"{coordinate}\"",
                    spec.name
                ));
            }
            applied.push(spec.name);
        }
    }

    fn entity_keys(
        &mut self,
        types: &IndexMap<Name, NormalizedType>,
        ty: &NormalizedType,
    ) -> Vec<EntityKey> {
        let mut keys = Vec::new();
        if !ty.kind.has_fields() {
            return keys;
        }
        let key_directives = ty
            .directives
            .iter()
            .filter(|directive| canonical_directive_name(&directive.name) == KEY_DIRECTIVE_NAME);
        for directive in key_directives {
            let Some(fields) = self.field_set_argument(types, directive, &ty.name, &ty.name) else {
                continue;
            };
            let resolvable = match directive_argument(directive, RESOLVABLE_ARGUMENT_NAME) {
                None => true,
                Some(ast::Value::Boolean(resolvable)) => *resolvable,
                Some(_) => {
                    self.directive_error(format!(
                        "The \"{RESOLVABLE_ARGUMENT_NAME}\" argument of @key on type \"{}\" must be a boolean",
                        ty.name
                    ));
                    continue;
                }
            };
            keys.push(EntityKey { fields, resolvable });
        }
        keys
    }

    fn field_annotations(
        &mut self,
        types: &IndexMap<Name, NormalizedType>,
        ty: &NormalizedType,
        field: &NormalizedField,
        coordinate: &str,
    ) -> FieldAnnotations {
        let mut annotations = FieldAnnotations::default();
        if ty.kind != TypeKind::Object {
            return annotations;
        }
        for directive in field.definition.directives.iter() {
            match canonical_directive_name(&directive.name) {
                PROVIDES_DIRECTIVE_NAME => {
                    let return_type = field.definition.ty.inner_named_type();
                    let returns_composite = types
                        .get(return_type)
                        .is_some_and(|target| target.kind.is_composite());
                    if !returns_composite {
                        self.directive_error(format!(
                            "The directive \"@{PROVIDES_DIRECTIVE_NAME}\" on \"{coordinate}\" requires a composite return type, but the field returns \"{return_type}\""
                        ));
                        continue;
                    }
                    annotations.provides =
                        self.field_set_argument(types, directive, coordinate, return_type);
                }
                REQUIRES_DIRECTIVE_NAME => {
                    annotations.requires =
                        self.field_set_argument(types, directive, coordinate, &ty.name);
                }
                OVERRIDE_DIRECTIVE_NAME => {
                    match directive_argument(directive, FROM_ARGUMENT_NAME).and_then(|from| from.as_str()) {
                        Some(from) if from == self.subgraph.name => {
                            self.directive_error(format!(
                                "The directive \"@{OVERRIDE_DIRECTIVE_NAME}\" on \"{coordinate}\" cannot override its own subgraph \"{from}\""
                            ));
                        }
                        Some(from) => annotations.override_from = Some(from.to_owned()),
                        None => self.directive_error(format!(
                            "The directive \"@{OVERRIDE_DIRECTIVE_NAME}\" on \"{coordinate}\" requires a string \"{FROM_ARGUMENT_NAME}\" argument"
                        )),
                    }
                }
                _ => {}
            }
        }
        annotations
    }

    /// Parses the `fields` argument of `directive` and checks it against `target_type`.
    fn field_set_argument(
        &mut self,
        types: &IndexMap<Name, NormalizedType>,
        directive: &ast::Directive,
        coordinate: &str,
        target_type: &Name,
    ) -> Option<FieldSet> {
        let directive_name = canonical_directive_name(&directive.name);
        let Some(source) =
            directive_argument(directive, FIELDS_ARGUMENT_NAME).and_then(|value| value.as_str())
        else {
            self.directive_error(format!(
                "The directive \"@{directive_name}\" on \"{coordinate}\" requires a string \"{FIELDS_ARGUMENT_NAME}\" argument"
            ));
            return None;
        };
        let checked = FieldSet::parse(source).and_then(|field_set| {
            validate_field_set(types, target_type, &field_set)?;
            Ok(field_set)
        });
        match checked {
            Ok(field_set) => Some(field_set),
            Err(message) => {
                self.directive_error(format!(
                    "The directive \"@{directive_name}\" on \"{coordinate}\" is invalid: {message}"
                ));
                None
            }
        }
    }
}

fn validate_field_set(
    types: &IndexMap<Name, NormalizedType>,
    parent: &Name,
    field_set: &FieldSet,
) -> Result<(), String> {
    let Some(parent_type) = types.get(parent) else {
        return Err(format!("type \"{parent}\" is not defined"));
    };
    for selection in &field_set.selections {
        match selection {
            FieldSetSelection::Field { name, selections } => {
                let Some(field) = parent_type.fields.get(name) else {
                    return Err(format!("field \"{parent}.{name}\" does not exist"));
                };
                let child = field.definition.ty.inner_named_type();
                let child_is_composite = types
                    .get(child)
                    .is_some_and(|target| target.kind.is_composite());
                match (child_is_composite, selections.is_empty()) {
                    (true, true) => {
                        return Err(format!(
                            "field \"{parent}.{name}\" returns composite type \"{child}\" and needs a selection of subfields"
                        ));
                    }
                    (false, false) => {
                        return Err(format!(
                            "field \"{parent}.{name}\" returns leaf type \"{child}\" and cannot have a selection of subfields"
                        ));
                    }
                    (true, false) => validate_field_set(types, child, selections)?,
                    (false, true) => {}
                }
            }
            FieldSetSelection::InlineFragment {
                type_condition,
                selections,
            } => {
                let target = type_condition.as_ref().unwrap_or(parent);
                let is_composite = types
                    .get(target)
                    .is_some_and(|target| target.kind.is_composite());
                if !is_composite {
                    return Err(format!(
                        "type condition \"{target}\" is not a composite type"
                    ));
                }
                validate_field_set(types, target, selections)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn has_directive(directives: &ast::DirectiveList, name: &str) -> bool {
    directives
        .iter()
        .any(|directive| canonical_directive_name(&directive.name) == name)
}

fn directive_argument<'a>(directive: &'a ast::Directive, name: &str) -> Option<&'a ast::Value> {
    directive
        .arguments
        .iter()
        .find(|argument| argument.name.as_str() == name)
        .map(|argument| &*argument.value)
}

fn rename_type(ty: &ast::Type, renames: &IndexMap<Name, Name>) -> ast::Type {
    let rename = |name: &Name| renames.get(name).unwrap_or(name).clone();
    match ty {
        ast::Type::Named(name) => ast::Type::Named(rename(name)),
        ast::Type::NonNullNamed(name) => ast::Type::NonNullNamed(rename(name)),
        ast::Type::List(inner) => ast::Type::List(Box::new(rename_type(inner, renames))),
        ast::Type::NonNullList(inner) => {
            ast::Type::NonNullList(Box::new(rename_type(inner, renames)))
        }
    }
}
