//! Lowers Go source files into the language-agnostic declaration tree.
//!
//! One package directory becomes one [`DocPackage`]: declarations keep their
//! attached comment text and per-name exported flags, and associated
//! constants, variables, factories, and methods are grouped under their type
//! the way a reader of the documentation expects them.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use tree_sitter::Node;

use crate::decl::{
    ChanDir, DeclName, DocPackage, FieldGroup, FuncDecl, TypeDecl, TypeExpr, TypeShape, ValueGroup,
    ValueSpec,
};
use crate::error::{ExtractError, Result};

/// Go grammar shared by every parse.
static GO: Lazy<tree_sitter::Language> = Lazy::new(|| tree_sitter_go::LANGUAGE.into());

/// Parses every buildable Go source file of one directory into a single
/// aggregated package unit.
pub fn parse_package_dir(dir: &Path) -> Result<DocPackage> {
    let files = super::walker::go_files(dir)?;
    let mut builder = PackageBuilder::default();
    for file in &files {
        let source = fs::read_to_string(file)?;
        let parsed = parse_source(&source, file)?;
        builder.add_file(&parsed)?;
    }
    Ok(builder.finish())
}

/// Lowers a single in-memory source file into a package unit.
pub fn parse_source_unit(source: &str, path: &Path) -> Result<DocPackage> {
    let parsed = parse_source(source, path)?;
    let mut builder = PackageBuilder::default();
    builder.add_file(&parsed)?;
    Ok(builder.finish())
}

struct ParsedFile {
    tree: tree_sitter::Tree,
    source: String,
    file: String,
}

impl ParsedFile {
    fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

fn parse_source(source: &str, path: &Path) -> Result<ParsedFile> {
    let file = path.display().to_string();

    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&GO).map_err(|e| ExtractError::Parse {
        file: file.clone(),
        message: e.to_string(),
    })?;

    let tree = parser.parse(source, None).ok_or_else(|| ExtractError::Parse {
        file: file.clone(),
        message: "failed to parse source".to_string(),
    })?;

    // Malformed source aborts the run; partial extraction of a broken
    // package is not attempted.
    if tree.root_node().has_error() {
        return Err(ExtractError::Parse {
            file,
            message: "syntax error".to_string(),
        });
    }

    Ok(ParsedFile {
        tree,
        source: source.to_string(),
        file,
    })
}

/// Accumulates lowered declarations across the files of one directory, then
/// resolves receiver/result associations in [`PackageBuilder::finish`].
#[derive(Default)]
struct PackageBuilder {
    name: String,
    docs: Vec<String>,
    imports: BTreeSet<String>,
    funcs: Vec<FuncDecl>,
    types: Vec<TypeDecl>,
    methods: Vec<(String, FuncDecl)>,
    consts: Vec<(ValueGroup, Option<String>)>,
    vars: Vec<(ValueGroup, Option<String>)>,
}

impl PackageBuilder {
    fn add_file(&mut self, parsed: &ParsedFile) -> Result<()> {
        let root = parsed.root();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => {
                    if let Some(ident) = node.named_child(0) {
                        self.name = parsed.text(ident).to_string();
                    }
                    let doc = doc_comment(parsed, node);
                    if !doc.is_empty() {
                        self.docs.push(doc);
                    }
                }
                "import_declaration" => self.add_imports(parsed, node),
                "function_declaration" => {
                    self.funcs.push(lower_function(parsed, node)?);
                }
                "method_declaration" => {
                    if let Some(receiver) = receiver_base(parsed, node) {
                        self.methods.push((receiver, lower_function(parsed, node)?));
                    }
                }
                "type_declaration" => self.add_types(parsed, node)?,
                "const_declaration" => {
                    self.consts.push(lower_value_group(parsed, node));
                }
                "var_declaration" => {
                    self.vars.push(lower_value_group(parsed, node));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn add_imports(&mut self, parsed: &ParsedFile, node: Node) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => self.push_import(parsed, child),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() == "import_spec" {
                            self.push_import(parsed, spec);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn push_import(&mut self, parsed: &ParsedFile, spec: Node) {
        if let Some(path) = spec.child_by_field_name("path") {
            let text = parsed.text(path).trim_matches('"').trim_matches('`');
            self.imports.insert(text.to_string());
        }
    }

    fn add_types(&mut self, parsed: &ParsedFile, node: Node) -> Result<()> {
        let decl_doc = doc_comment(parsed, node);
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if spec.kind() != "type_spec" && spec.kind() != "type_alias" {
                continue;
            }
            let name_node = field(parsed, spec, "name")?;
            let type_node = field(parsed, spec, "type")?;
            let name = parsed.text(name_node).to_string();

            // A spec inside a grouped declaration carries its own comment;
            // a single spec inherits the declaration comment.
            let spec_doc = doc_comment(parsed, spec);
            let doc = if spec_doc.is_empty() {
                decl_doc.clone()
            } else {
                spec_doc
            };

            let (expr, shape) = lower_type_decl(parsed, type_node)?;
            let methods = if type_node.kind() == "interface_type" {
                lower_interface_methods(parsed, type_node)?
            } else {
                Vec::new()
            };

            self.types.push(TypeDecl {
                doc,
                name: decl_name(&name),
                expr,
                shape,
                consts: Vec::new(),
                vars: Vec::new(),
                factories: Vec::new(),
                methods,
            });
        }
        Ok(())
    }

    fn finish(self) -> DocPackage {
        let mut types = self.types;
        let index: HashMap<String, usize> = types
            .iter()
            .enumerate()
            .map(|(i, decl)| (decl.name.name.clone(), i))
            .collect();

        for (receiver, method) in self.methods {
            if let Some(&i) = index.get(&receiver) {
                types[i].methods.push(method);
            }
        }

        let mut funcs = Vec::new();
        for func in self.funcs {
            match factory_target(&func, &index) {
                Some(i) => types[i].factories.push(func),
                None => funcs.push(func),
            }
        }

        let mut consts = Vec::new();
        for (group, assoc) in self.consts {
            match assoc.as_deref().and_then(|name| index.get(name)) {
                Some(&i) => types[i].consts.push(group),
                None => consts.push(group),
            }
        }

        let mut vars = Vec::new();
        for (group, assoc) in self.vars {
            match assoc.as_deref().and_then(|name| index.get(name)) {
                Some(&i) => types[i].vars.push(group),
                None => vars.push(group),
            }
        }

        DocPackage {
            name: self.name,
            doc: self.docs.join("\n\n"),
            imports: self.imports.into_iter().collect(),
            funcs,
            types,
            consts,
            vars,
        }
    }
}

/// A receiver-less function whose first result resolves to a type declared
/// in the same package is that type's factory.
fn factory_target(func: &FuncDecl, index: &HashMap<String, usize>) -> Option<usize> {
    let first = func.results.first()?;
    let name = first.expr.base_ident()?;
    index.get(name).copied()
}

fn lower_function(parsed: &ParsedFile, node: Node) -> Result<FuncDecl> {
    let name = parsed.text(field(parsed, node, "name")?).to_string();

    let params = match node.child_by_field_name("parameters") {
        Some(list) => lower_parameter_list(parsed, list)?,
        None => Vec::new(),
    };
    let results = match node.child_by_field_name("result") {
        Some(result) => lower_result(parsed, result)?,
        None => Vec::new(),
    };

    Ok(FuncDecl {
        doc: doc_comment(parsed, node),
        name: decl_name(&name),
        params,
        results,
    })
}

fn lower_parameter_list(parsed: &ParsedFile, list: Node) -> Result<Vec<FieldGroup>> {
    let mut groups = Vec::new();
    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "parameter_declaration" => {
                let expr = lower_type(parsed, field(parsed, child, "type")?)?;
                groups.push(FieldGroup {
                    doc: String::new(),
                    names: named_fields(parsed, child),
                    expr,
                });
            }
            "variadic_parameter_declaration" => {
                let elem = lower_type(parsed, field(parsed, child, "type")?)?;
                groups.push(FieldGroup {
                    doc: String::new(),
                    names: named_fields(parsed, child),
                    expr: TypeExpr::Variadic(Box::new(elem)),
                });
            }
            _ => {}
        }
    }
    Ok(groups)
}

/// A result position is either a full parameter list or one bare type.
fn lower_result(parsed: &ParsedFile, node: Node) -> Result<Vec<FieldGroup>> {
    if node.kind() == "parameter_list" {
        lower_parameter_list(parsed, node)
    } else {
        Ok(vec![FieldGroup {
            doc: String::new(),
            names: Vec::new(),
            expr: lower_type(parsed, node)?,
        }])
    }
}

/// The base type name of a method receiver, with pointer, parenthesis, and
/// type-parameter wrappers stripped.
fn receiver_base(parsed: &ParsedFile, node: Node) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let decl = receiver
        .named_children(&mut cursor)
        .find(|child| child.kind() == "parameter_declaration")?;
    let mut ty = decl.child_by_field_name("type")?;
    loop {
        match ty.kind() {
            "pointer_type" | "parenthesized_type" => ty = ty.named_child(0)?,
            "generic_type" => ty = ty.child_by_field_name("type")?,
            _ => break,
        }
    }
    if ty.kind() == "type_identifier" {
        Some(parsed.text(ty).to_string())
    } else {
        None
    }
}

fn lower_type_decl(parsed: &ParsedFile, node: Node) -> Result<(TypeExpr, TypeShape)> {
    match node.kind() {
        "struct_type" => Ok((
            TypeExpr::Struct,
            TypeShape::Struct(lower_struct_fields(parsed, node)?),
        )),
        "interface_type" => Ok((TypeExpr::Interface, TypeShape::Interface)),
        _ => Ok((lower_type(parsed, node)?, TypeShape::Other)),
    }
}

fn lower_struct_fields(parsed: &ParsedFile, node: Node) -> Result<Vec<FieldGroup>> {
    let mut fields = Vec::new();
    let mut cursor = node.walk();
    let Some(list) = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "field_declaration_list")
    else {
        return Ok(fields);
    };

    let mut inner = list.walk();
    for child in list.named_children(&mut inner) {
        if child.kind() != "field_declaration" {
            continue;
        }
        let names = named_fields(parsed, child);
        if names.is_empty() {
            // embedded field, no entry of its own
            continue;
        }
        let expr = lower_type(parsed, field(parsed, child, "type")?)?;
        fields.push(FieldGroup {
            doc: doc_comment(parsed, child),
            names,
            expr,
        });
    }
    Ok(fields)
}

fn lower_interface_methods(parsed: &ParsedFile, node: Node) -> Result<Vec<FuncDecl>> {
    let mut methods = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "method_elem" | "method_spec" => {
                let name = parsed.text(field(parsed, child, "name")?).to_string();
                let params = match child.child_by_field_name("parameters") {
                    Some(list) => lower_parameter_list(parsed, list)?,
                    None => Vec::new(),
                };
                let results = match child.child_by_field_name("result") {
                    Some(result) => lower_result(parsed, result)?,
                    None => Vec::new(),
                };
                methods.push(FuncDecl {
                    doc: doc_comment(parsed, child),
                    name: decl_name(&name),
                    params,
                    results,
                });
            }
            // embedded interfaces and type unions contribute no signatures
            _ => {}
        }
    }
    Ok(methods)
}

/// Lowers a const/var declaration into a value group plus the explicit type
/// identifier used for type association, if any spec names one.
fn lower_value_group(parsed: &ParsedFile, node: Node) -> (ValueGroup, Option<String>) {
    let mut specs = Vec::new();
    let mut assoc = None;
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        if spec.kind() != "const_spec" && spec.kind() != "var_spec" {
            continue;
        }
        let names = named_fields(parsed, spec);
        if assoc.is_none() {
            if let Some(ty) = spec.child_by_field_name("type") {
                if ty.kind() == "type_identifier" {
                    assoc = Some(parsed.text(ty).to_string());
                }
            }
        }
        specs.push(ValueSpec {
            doc: doc_comment(parsed, spec),
            names,
        });
    }
    let group = ValueGroup {
        doc: doc_comment(parsed, node),
        specs,
    };
    (group, assoc)
}

fn lower_type(parsed: &ParsedFile, node: Node) -> Result<TypeExpr> {
    match node.kind() {
        "type_identifier" | "identifier" | "field_identifier" => {
            Ok(TypeExpr::Ident(parsed.text(node).to_string()))
        }
        "qualified_type" => Ok(TypeExpr::Qualified {
            package: parsed.text(field(parsed, node, "package")?).to_string(),
            name: parsed.text(field(parsed, node, "name")?).to_string(),
        }),
        "pointer_type" => {
            let elem = node.named_child(0).ok_or_else(|| missing(parsed, node))?;
            Ok(TypeExpr::Pointer(Box::new(lower_type(parsed, elem)?)))
        }
        "slice_type" => Ok(TypeExpr::Array {
            len: None,
            elem: Box::new(lower_type(parsed, field(parsed, node, "element")?)?),
        }),
        "array_type" => Ok(TypeExpr::Array {
            len: Some(parsed.text(field(parsed, node, "length")?).to_string()),
            elem: Box::new(lower_type(parsed, field(parsed, node, "element")?)?),
        }),
        "implicit_length_array_type" => Ok(TypeExpr::Array {
            len: Some("...".to_string()),
            elem: Box::new(lower_type(parsed, field(parsed, node, "element")?)?),
        }),
        "map_type" => Ok(TypeExpr::Map {
            key: Box::new(lower_type(parsed, field(parsed, node, "key")?)?),
            value: Box::new(lower_type(parsed, field(parsed, node, "value")?)?),
        }),
        "channel_type" => Ok(TypeExpr::Chan {
            dir: channel_dir(node),
            elem: Box::new(lower_type(parsed, field(parsed, node, "value")?)?),
        }),
        "generic_type" => {
            let base = lower_type(parsed, field(parsed, node, "type")?)?;
            let arguments = field(parsed, node, "type_arguments")?;
            let mut args = Vec::new();
            let mut cursor = arguments.walk();
            for arg in arguments.named_children(&mut cursor) {
                args.push(lower_type(parsed, arg)?);
            }
            Ok(TypeExpr::Generic {
                base: Box::new(base),
                args,
            })
        }
        "struct_type" => Ok(TypeExpr::Struct),
        "interface_type" => Ok(TypeExpr::Interface),
        // `type_elem` is a transparent wrapper the grammar inserts around each
        // entry of a `type_arguments` list; it holds exactly one type, so pass through.
        "parenthesized_type" | "type_elem" => {
            let inner = node.named_child(0).ok_or_else(|| missing(parsed, node))?;
            lower_type(parsed, inner)
        }
        kind => Err(ExtractError::UnsupportedTypeExpr {
            kind: kind.to_string(),
            file: parsed.file.clone(),
        }),
    }
}

/// `chan<- T` sends, `<-chan T` receives; the token order decides.
fn channel_dir(node: Node) -> ChanDir {
    let mut cursor = node.walk();
    let mut saw_chan = false;
    for child in node.children(&mut cursor) {
        match child.kind() {
            "chan" => saw_chan = true,
            "<-" => {
                return if saw_chan {
                    ChanDir::Send
                } else {
                    ChanDir::Recv
                }
            }
            _ => break,
        }
    }
    ChanDir::Both
}

/// All `name` fields of a declaration node, with their exported flags.
fn named_fields(parsed: &ParsedFile, node: Node) -> Vec<DeclName> {
    let mut cursor = node.walk();
    node.children_by_field_name("name", &mut cursor)
        .map(|name| decl_name(parsed.text(name)))
        .collect()
}

fn decl_name(name: &str) -> DeclName {
    DeclName::new(name, is_exported(name))
}

/// Go visibility rule: a name is exported when its first character is upper
/// case.
fn is_exported(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

fn field<'t>(parsed: &ParsedFile, node: Node<'t>, name: &str) -> Result<Node<'t>> {
    node.child_by_field_name(name).ok_or_else(|| ExtractError::Parse {
        file: parsed.file.clone(),
        message: format!("missing `{name}` in {}", node.kind()),
    })
}

fn missing(parsed: &ParsedFile, node: Node) -> ExtractError {
    ExtractError::Parse {
        file: parsed.file.clone(),
        message: format!("empty {}", node.kind()),
    }
}

/// Collects the contiguous comment block ending on the line directly above
/// `node`. A comment trailing an earlier declaration on that declaration's
/// own line is not part of the block, and directive comments (`//go:...`)
/// are dropped.
fn doc_comment(parsed: &ParsedFile, node: Node) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(prev) = current {
        if prev.kind() != "comment" {
            break;
        }
        if prev.end_position().row + 1 < row {
            break;
        }
        if let Some(before) = prev.prev_sibling() {
            if before.kind() != "comment" && before.end_position().row == prev.start_position().row
            {
                break;
            }
        }

        let raw = parsed.text(prev).trim().to_string();
        if !is_directive(&raw) {
            lines.push(comment_text(&raw));
        }
        row = prev.start_position().row;
        current = prev.prev_sibling();
    }

    lines.reverse();
    lines.join("\n").trim().to_string()
}

/// A directive comment (`//go:generate`, `//line`, ...) is tooling input,
/// not documentation.
fn is_directive(raw: &str) -> bool {
    let Some(rest) = raw.strip_prefix("//") else {
        return false;
    };
    let Some(first) = rest.chars().next() else {
        return false;
    };
    if !first.is_ascii_lowercase() {
        return false;
    }
    match rest.split_whitespace().next() {
        Some(word) => word.contains(':'),
        None => false,
    }
}

fn comment_text(raw: &str) -> String {
    if let Some(line) = raw.strip_prefix("//") {
        return line.strip_prefix(' ').unwrap_or(line).to_string();
    }
    let body = raw
        .strip_prefix("/*")
        .and_then(|text| text.strip_suffix("*/"))
        .unwrap_or(raw);
    body.trim().to_string()
}
