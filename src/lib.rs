pub mod api;
pub mod decl;
pub mod error;
pub mod golang;
pub mod mapper;

pub use api::{encode, Module, OutputFormat, Package, Stereotype, Stereotypes};
pub use decl::{DocPackage, TypeExpr};
pub use error::{ExtractError, Result};
pub use golang::extract;
pub use mapper::{map_package, renderer::render};
