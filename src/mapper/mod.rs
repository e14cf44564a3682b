//! Declaration-to-model mapping: one parsed package unit in, one package of
//! the documentation model out.

pub mod assembler;
pub mod renderer;

use std::collections::BTreeMap;

use crate::api::{Const, Enum, Field, Func, Package, Parameter, Stereotype, Type, Var};
use crate::decl::{DocPackage, FieldGroup, FuncDecl, TypeDecl, TypeExpr, TypeShape, ValueGroup};
use renderer::render;

/// Maps one parsed package unit onto the documentation model. Only exported
/// symbols are represented; the filter applies independently at every level.
pub fn map_package(unit: &DocPackage) -> Package {
    let mut package = Package {
        doc: unit.doc.clone(),
        name: unit.name.clone(),
        imports: unit.imports.clone(),
        ..Package::default()
    };

    if unit.name == "main" {
        package.stereotypes.insert(Stereotype::Executable);
    }

    for func in &unit.funcs {
        if !func.name.exported {
            continue;
        }
        package
            .functions
            .insert(func.name.name.clone(), map_func(func, None));
    }

    for decl in &unit.types {
        if !decl.name.exported {
            continue;
        }
        package.types.insert(decl.name.name.clone(), map_type(decl));
    }

    for group in &unit.consts {
        for (name, doc) in expand_values(group) {
            package.consts.insert(name, Const { doc, ..Const::default() });
        }
    }

    for group in &unit.vars {
        for (name, doc) in expand_values(group) {
            package.vars.insert(name, Var { doc, ..Var::default() });
        }
    }

    package
}

fn map_type(decl: &TypeDecl) -> Type {
    let mut ty = Type {
        doc: decl.doc.clone(),
        base_type: render(&decl.expr),
        ..Type::default()
    };

    match &decl.shape {
        TypeShape::Struct(fields) => {
            ty.stereotypes.insert(Stereotype::Struct);
            ty.stereotypes.insert(Stereotype::Class);
            for group in fields {
                for name in &group.names {
                    if !name.exported {
                        continue;
                    }
                    ty.fields.insert(name.name.clone(), map_field(group));
                }
            }
        }
        TypeShape::Interface => {
            ty.stereotypes.insert(Stereotype::Interface);
        }
        TypeShape::Other => {
            // An alias-like declaration inherits a stereotype named after the
            // referenced identifier.
            if let TypeExpr::Ident(name) = &decl.expr {
                ty.stereotypes.insert(Stereotype::Named(name.clone()));
            }
        }
    }

    if !decl.consts.is_empty() {
        ty.stereotypes.insert(Stereotype::Enum);
        for group in &decl.consts {
            for (name, doc) in expand_values(group) {
                ty.enumerals.insert(name, Enum { doc });
            }
        }
    }

    for func in &decl.factories {
        if !func.name.exported {
            continue;
        }
        ty.factories.insert(
            func.name.name.clone(),
            map_func(func, Some(Stereotype::Constructor)),
        );
    }

    for method in &decl.methods {
        if !method.name.exported {
            continue;
        }
        ty.methods.insert(
            method.name.name.clone(),
            map_func(method, Some(Stereotype::Method)),
        );
    }

    for group in &decl.vars {
        for (name, doc) in expand_values(group) {
            let mut var = Var { doc, ..Var::default() };
            var.stereotypes.insert(Stereotype::Singleton);
            ty.singletons.insert(name, var);
        }
    }

    ty
}

fn map_func(decl: &FuncDecl, role: Option<Stereotype>) -> Func {
    let mut func = Func {
        doc: decl.doc.clone(),
        ..Func::default()
    };
    if let Some(role) = role {
        func.stereotypes.insert(role);
    }
    insert_params(
        &mut func.params,
        &decl.params,
        &[Stereotype::Parameter, Stereotype::In],
    );
    insert_params(
        &mut func.results,
        &decl.results,
        &[Stereotype::Parameter, Stereotype::Out],
    );
    func
}

/// Expands positional parameter groups into named entries. A group may
/// declare several names for one shared type node; a group without names gets
/// the synthetic key `__<index>` derived from its position within its own
/// list, so map keys stay unique.
fn insert_params(
    dst: &mut BTreeMap<String, Parameter>,
    groups: &[FieldGroup],
    stereotypes: &[Stereotype],
) {
    for (index, group) in groups.iter().enumerate() {
        let base_type = render(&group.expr);
        if group.names.is_empty() {
            dst.insert(format!("__{index}"), parameter(group, &base_type, stereotypes));
            continue;
        }
        for name in &group.names {
            dst.insert(name.name.clone(), parameter(group, &base_type, stereotypes));
        }
    }
}

fn parameter(group: &FieldGroup, base_type: &str, stereotypes: &[Stereotype]) -> Parameter {
    Parameter {
        doc: group.doc.clone(),
        base_type: base_type.to_string(),
        stereotypes: stereotypes.iter().cloned().collect(),
    }
}

fn map_field(group: &FieldGroup) -> Field {
    let mut field = Field {
        doc: group.doc.clone(),
        base_type: render(&group.expr),
        ..Field::default()
    };
    field.stereotypes.insert(Stereotype::Property);
    field
}

/// Expands a grouped declaration into (name, doc) pairs for its exported
/// names. The doc is the group comment followed by the per-value comment,
/// whitespace-trimmed.
fn expand_values(group: &ValueGroup) -> Vec<(String, String)> {
    let mut values = Vec::new();
    for spec in &group.specs {
        for name in &spec.names {
            if !name.exported {
                continue;
            }
            let doc = format!("{}\n{}", group.doc, spec.doc).trim().to_string();
            values.push((name.name.clone(), doc));
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{DeclName, ValueSpec};

    fn ident(name: &str) -> TypeExpr {
        TypeExpr::Ident(name.to_string())
    }

    fn func(name: &str, exported: bool) -> FuncDecl {
        FuncDecl {
            doc: String::new(),
            name: DeclName::new(name, exported),
            params: Vec::new(),
            results: Vec::new(),
        }
    }

    fn group(doc: &str, specs: Vec<(&str, &str, bool)>) -> ValueGroup {
        ValueGroup {
            doc: doc.to_string(),
            specs: specs
                .into_iter()
                .map(|(name, doc, exported)| ValueSpec {
                    doc: doc.to_string(),
                    names: vec![DeclName::new(name, exported)],
                })
                .collect(),
        }
    }

    fn plain_type(name: &str, expr: TypeExpr, shape: TypeShape) -> TypeDecl {
        TypeDecl {
            doc: String::new(),
            name: DeclName::new(name, true),
            expr,
            shape,
            consts: Vec::new(),
            vars: Vec::new(),
            factories: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[test]
    fn test_main_package_carries_executable_stereotype() {
        let unit = DocPackage {
            name: "main".into(),
            ..DocPackage::default()
        };
        let package = map_package(&unit);
        assert!(package.stereotypes.contains(&Stereotype::Executable));
    }

    #[test]
    fn test_library_package_has_no_stereotypes() {
        let unit = DocPackage {
            name: "entity".into(),
            ..DocPackage::default()
        };
        assert!(map_package(&unit).stereotypes.is_empty());
    }

    #[test]
    fn test_unexported_function_is_dropped() {
        let unit = DocPackage {
            name: "entity".into(),
            funcs: vec![func("BestFunc", true), func("helper", false)],
            ..DocPackage::default()
        };
        let package = map_package(&unit);
        assert_eq!(package.functions.len(), 1);
        assert!(package.functions.contains_key("BestFunc"));
    }

    #[test]
    fn test_unexported_type_is_dropped_entirely() {
        let mut decl = plain_type(
            "hidden",
            TypeExpr::Struct,
            TypeShape::Struct(vec![FieldGroup {
                doc: String::new(),
                names: vec![DeclName::new("Visible", true)],
                expr: ident("string"),
            }]),
        );
        decl.name = DeclName::new("hidden", false);
        let unit = DocPackage {
            name: "entity".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        assert!(map_package(&unit).types.is_empty());
    }

    #[test]
    fn test_struct_type_maps_exported_fields_only() {
        let decl = plain_type(
            "Entity",
            TypeExpr::Struct,
            TypeShape::Struct(vec![
                FieldGroup {
                    doc: "A Name to tell about.".into(),
                    names: vec![DeclName::new("Name", true)],
                    expr: ident("string"),
                },
                FieldGroup {
                    doc: String::new(),
                    names: vec![DeclName::new("internal", false)],
                    expr: ident("int"),
                },
            ]),
        );
        let unit = DocPackage {
            name: "entity".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        let package = map_package(&unit);
        let ty = &package.types["Entity"];

        assert!(ty.stereotypes.contains(&Stereotype::Struct));
        assert!(ty.stereotypes.contains(&Stereotype::Class));
        assert_eq!(ty.base_type, "struct");
        assert_eq!(ty.fields.len(), 1);

        let field = &ty.fields["Name"];
        assert_eq!(field.base_type, "string");
        assert_eq!(field.doc, "A Name to tell about.");
        assert!(field.stereotypes.contains(&Stereotype::Property));
    }

    #[test]
    fn test_shared_type_node_yields_one_field_per_name() {
        let decl = plain_type(
            "Point",
            TypeExpr::Struct,
            TypeShape::Struct(vec![FieldGroup {
                doc: String::new(),
                names: vec![DeclName::new("X", true), DeclName::new("Y", true)],
                expr: ident("float64"),
            }]),
        );
        let unit = DocPackage {
            name: "geometry".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        let ty = &map_package(&unit).types["Point"];
        assert_eq!(ty.fields.len(), 2);
        assert_eq!(ty.fields["X"].base_type, "float64");
        assert_eq!(ty.fields["Y"].base_type, "float64");
    }

    #[test]
    fn test_alias_type_inherits_named_stereotype() {
        let decl = plain_type("Name", ident("string"), TypeShape::Other);
        let unit = DocPackage {
            name: "entity".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        let ty = &map_package(&unit).types["Name"];
        assert_eq!(ty.base_type, "string");
        assert!(ty.stereotypes.contains(&Stereotype::Named("string".into())));
    }

    #[test]
    fn test_interface_type_maps_methods() {
        let mut decl = plain_type("Behavior", TypeExpr::Interface, TypeShape::Interface);
        decl.methods.push(FuncDecl {
            doc: "DoIt does it well.".into(),
            name: DeclName::new("DoIt", true),
            params: Vec::new(),
            results: Vec::new(),
        });
        let unit = DocPackage {
            name: "entity".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        let ty = &map_package(&unit).types["Behavior"];
        assert_eq!(ty.base_type, "interface");
        assert!(ty.stereotypes.contains(&Stereotype::Interface));
        let method = &ty.methods["DoIt"];
        assert!(method.stereotypes.contains(&Stereotype::Method));
        assert_eq!(method.doc, "DoIt does it well.");
    }

    #[test]
    fn test_grouped_constants_become_enumerals() {
        let mut decl = plain_type("Direction", ident("int"), TypeShape::Other);
        decl.consts.push(group(
            "The possible directions.",
            vec![
                ("North", "Up on the map.", true),
                ("South", "", true),
                ("hiddenDirection", "", false),
            ],
        ));
        let unit = DocPackage {
            name: "compass".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        let ty = &map_package(&unit).types["Direction"];
        assert!(ty.stereotypes.contains(&Stereotype::Enum));
        assert_eq!(ty.enumerals.len(), 2);
        assert_eq!(
            ty.enumerals["North"].doc,
            "The possible directions.\nUp on the map."
        );
        assert_eq!(ty.enumerals["South"].doc, "The possible directions.");
    }

    #[test]
    fn test_type_without_constant_group_is_not_an_enum() {
        let decl = plain_type("Name", ident("string"), TypeShape::Other);
        let unit = DocPackage {
            name: "entity".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        let ty = &map_package(&unit).types["Name"];
        assert!(!ty.stereotypes.contains(&Stereotype::Enum));
        assert!(ty.enumerals.is_empty());
    }

    #[test]
    fn test_factories_and_methods_get_role_stereotypes() {
        let mut decl = plain_type("Entity", TypeExpr::Struct, TypeShape::Struct(Vec::new()));
        decl.factories.push(func("NewEntity", true));
        decl.methods.push(func("String", true));
        decl.methods.push(func("reset", false));
        let unit = DocPackage {
            name: "entity".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        let ty = &map_package(&unit).types["Entity"];
        assert!(ty.factories["NewEntity"]
            .stereotypes
            .contains(&Stereotype::Constructor));
        assert_eq!(ty.methods.len(), 1);
        assert!(ty.methods["String"].stereotypes.contains(&Stereotype::Method));
    }

    #[test]
    fn test_associated_variables_become_singletons() {
        let mut decl = plain_type("Registry", ident("int"), TypeShape::Other);
        decl.vars.push(group("", vec![("Default", "The shared one.", true)]));
        let unit = DocPackage {
            name: "registry".into(),
            types: vec![decl],
            ..DocPackage::default()
        };
        let ty = &map_package(&unit).types["Registry"];
        let var = &ty.singletons["Default"];
        assert!(var.stereotypes.contains(&Stereotype::Singleton));
        assert_eq!(var.doc, "The shared one.");
    }

    #[test]
    fn test_package_values_expand_group_and_value_docs() {
        let unit = DocPackage {
            name: "entity".into(),
            consts: vec![group("", vec![("AConstant", "AConstant here.", true)])],
            vars: vec![group("Hello to the world.", vec![("Hello", "", true)])],
            ..DocPackage::default()
        };
        let package = map_package(&unit);
        assert_eq!(package.consts["AConstant"].doc, "AConstant here.");
        assert_eq!(package.vars["Hello"].doc, "Hello to the world.");
    }

    #[test]
    fn test_parameter_direction_stereotypes() {
        let mut f = func("Sum", true);
        f.params.push(FieldGroup {
            doc: String::new(),
            names: vec![DeclName::new("a", false), DeclName::new("b", false)],
            expr: ident("int"),
        });
        f.results.push(FieldGroup {
            doc: String::new(),
            names: Vec::new(),
            expr: ident("int"),
        });
        let unit = DocPackage {
            name: "math".into(),
            funcs: vec![f],
            ..DocPackage::default()
        };
        let mapped = &map_package(&unit).functions["Sum"];

        assert_eq!(mapped.params.len(), 2);
        let a = &mapped.params["a"];
        assert!(a.stereotypes.contains(&Stereotype::Parameter));
        assert!(a.stereotypes.contains(&Stereotype::In));
        assert_eq!(a.base_type, "int");

        assert_eq!(mapped.results.len(), 1);
        let result = &mapped.results["__0"];
        assert!(result.stereotypes.contains(&Stereotype::Parameter));
        assert!(result.stereotypes.contains(&Stereotype::Out));
        assert_eq!(result.base_type, "int");
    }

    #[test]
    fn test_unnamed_slots_index_positionally_within_their_list() {
        let mut f = func("Pipe", true);
        f.params.push(FieldGroup {
            doc: String::new(),
            names: Vec::new(),
            expr: ident("int"),
        });
        f.params.push(FieldGroup {
            doc: String::new(),
            names: Vec::new(),
            expr: ident("string"),
        });
        f.results.push(FieldGroup {
            doc: String::new(),
            names: Vec::new(),
            expr: ident("error"),
        });
        let unit = DocPackage {
            name: "pipe".into(),
            funcs: vec![f],
            ..DocPackage::default()
        };
        let mapped = &map_package(&unit).functions["Pipe"];
        assert_eq!(mapped.params["__0"].base_type, "int");
        assert_eq!(mapped.params["__1"].base_type, "string");
        assert_eq!(mapped.results["__0"].base_type, "error");
    }
}
