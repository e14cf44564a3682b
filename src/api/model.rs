//! The documentation model serialized for downstream rendering.
//!
//! Every entity is built once during assembly and never mutated afterwards.
//! Name-keyed collections are ordered maps so two runs over an unchanged
//! source tree serialize byte-identically.

use std::collections::BTreeMap;

use serde::Serialize;

/// Role of a declaration as usually interpreted in context but not expressed
/// in the source language explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stereotype {
    Constructor,
    Method,
    Singleton,
    Enum,
    Executable,
    Struct,
    Class,
    Interface,
    Property,
    Parameter,
    In,
    Out,
    /// An alias-like type inherits a stereotype named after the referenced
    /// identifier, e.g. an alias to `string`.
    Named(String),
}

impl Stereotype {
    pub fn as_str(&self) -> &str {
        match self {
            Stereotype::Constructor => "constructor",
            Stereotype::Method => "method",
            Stereotype::Singleton => "singleton",
            Stereotype::Enum => "enum",
            Stereotype::Executable => "executable",
            Stereotype::Struct => "struct",
            Stereotype::Class => "class",
            Stereotype::Interface => "interface",
            Stereotype::Property => "property",
            Stereotype::Parameter => "parameter",
            Stereotype::In => "in",
            Stereotype::Out => "out",
            Stereotype::Named(name) => name,
        }
    }
}

impl Serialize for Stereotype {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ordered stereotype set: insertion order is preserved for deterministic
/// serialization, insertion is idempotent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Stereotypes(Vec<Stereotype>);

impl Stereotypes {
    pub fn insert(&mut self, stereotype: Stereotype) {
        if !self.0.contains(&stereotype) {
            self.0.push(stereotype);
        }
    }

    pub fn contains(&self, stereotype: &Stereotype) -> bool {
        self.0.contains(stereotype)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stereotype> {
        self.0.iter()
    }
}

impl FromIterator<Stereotype> for Stereotypes {
    fn from_iter<I: IntoIterator<Item = Stereotype>>(iter: I) -> Self {
        let mut set = Stereotypes::default();
        for stereotype in iter {
            set.insert(stereotype);
        }
        set
    }
}

/// The root entity, one per run. Owns every package.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Module {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub readme: String,

    pub module: String,

    /// Packages keyed by import path.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub packages: BTreeMap<String, Package>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Package {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub readme: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,

    pub name: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    #[serde(skip_serializing_if = "Stereotypes::is_empty")]
    pub stereotypes: Stereotypes,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, Type>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub consts: BTreeMap<String, Const>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, Var>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub functions: BTreeMap<String, Func>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Type {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,

    /// Canonical signature of the declared underlying shape.
    #[serde(rename = "baseType")]
    pub base_type: String,

    #[serde(skip_serializing_if = "Stereotypes::is_empty")]
    pub stereotypes: Stereotypes,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub factories: BTreeMap<String, Func>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub methods: BTreeMap<String, Func>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub singletons: BTreeMap<String, Var>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Field>,

    #[serde(rename = "enum", skip_serializing_if = "BTreeMap::is_empty")]
    pub enumerals: BTreeMap<String, Enum>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Func {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(skip_serializing_if = "Stereotypes::is_empty")]
    pub stereotypes: Stereotypes,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Parameter>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub results: BTreeMap<String, Parameter>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Field {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(rename = "baseType")]
    pub base_type: String,

    #[serde(skip_serializing_if = "Stereotypes::is_empty")]
    pub stereotypes: Stereotypes,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Parameter {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(rename = "baseType")]
    pub base_type: String,

    #[serde(skip_serializing_if = "Stereotypes::is_empty")]
    pub stereotypes: Stereotypes,
}

/// One member of a grouped constant declaration associated with a type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Enum {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Const {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(skip_serializing_if = "Stereotypes::is_empty")]
    pub stereotypes: Stereotypes,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Var {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(skip_serializing_if = "Stereotypes::is_empty")]
    pub stereotypes: Stereotypes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereotype_tags() {
        assert_eq!(Stereotype::Constructor.as_str(), "constructor");
        assert_eq!(Stereotype::Executable.as_str(), "executable");
        assert_eq!(Stereotype::In.as_str(), "in");
        assert_eq!(Stereotype::Named("string".into()).as_str(), "string");
    }

    #[test]
    fn test_stereotypes_insert_idempotent() {
        let mut set = Stereotypes::default();
        set.insert(Stereotype::Struct);
        set.insert(Stereotype::Class);
        set.insert(Stereotype::Struct);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_stereotypes_keep_insertion_order() {
        let mut set = Stereotypes::default();
        set.insert(Stereotype::Struct);
        set.insert(Stereotype::Class);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["struct","class"]"#);
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let module = Module {
            module: "example.com/mod".into(),
            ..Module::default()
        };
        let json = serde_json::to_string(&module).unwrap();
        assert_eq!(json, r#"{"module":"example.com/mod"}"#);
    }

    #[test]
    fn test_package_omits_empty_maps() {
        let package = Package {
            name: "entity".into(),
            ..Package::default()
        };
        let json = serde_json::to_string(&package).unwrap();
        assert_eq!(json, r#"{"name":"entity"}"#);
    }

    #[test]
    fn test_type_serializes_base_type_and_enum_keys() {
        let mut ty = Type {
            base_type: "string".into(),
            ..Type::default()
        };
        ty.enumerals.insert("North".into(), Enum { doc: String::new() });
        let json = serde_json::to_string(&ty).unwrap();
        assert!(json.contains(r#""baseType":"string""#));
        assert!(json.contains(r#""enum":{"North":{}}"#));
    }

    #[test]
    fn test_packages_serialize_in_key_order() {
        let mut module = Module {
            module: "m".into(),
            ..Module::default()
        };
        module.packages.insert("m/b".into(), Package::default());
        module.packages.insert("m/a".into(), Package::default());
        let json = serde_json::to_string(&module).unwrap();
        assert!(json.find("m/a").unwrap() < json.find("m/b").unwrap());
    }
}
