//! Canonical textual signatures for type expressions.

use crate::decl::{ChanDir, TypeExpr};

/// Renders a type expression to its canonical signature string.
///
/// Rendering is structural: the operator token of the node kind plus the
/// recursively rendered operands. Anonymous struct and interface shapes stay
/// unexpanded; their members are the mapper's concern. The match is
/// exhaustive over the closed grammar, so there is no runtime failure path.
pub fn render(expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::Ident(name) => name.clone(),
        TypeExpr::Qualified { package, name } => format!("{package}.{name}"),
        TypeExpr::Pointer(elem) => format!("*{}", render(elem)),
        TypeExpr::Array { len, elem } => {
            format!("[{}]{}", len.as_deref().unwrap_or(""), render(elem))
        }
        TypeExpr::Map { key, value } => format!("map[{}]{}", render(key), render(value)),
        TypeExpr::Chan { dir, elem } => match dir {
            ChanDir::Send => format!("chan<-{}", render(elem)),
            ChanDir::Recv => format!("chan->{}", render(elem)),
            ChanDir::Both => format!("chan {}", render(elem)),
        },
        TypeExpr::Generic { base, args } => {
            let args: Vec<String> = args.iter().map(render).collect();
            format!("{}[{}]", render(base), args.join(","))
        }
        TypeExpr::Struct => "struct".to_string(),
        TypeExpr::Interface => "interface".to_string(),
        TypeExpr::Variadic(elem) => format!("...{}", render(elem)),
    }
}
