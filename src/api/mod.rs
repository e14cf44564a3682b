//! Documentation model and its encoded forms.

pub mod model;

pub use model::{
    Const, Enum, Field, Func, Module, Package, Parameter, Stereotype, Stereotypes, Type, Var,
};

use crate::error::Result;

/// Output encoding for the assembled model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

/// Encodes the module to a single output byte sequence. Absent optional
/// fields are not emitted.
pub fn encode(module: &Module, format: OutputFormat) -> Result<Vec<u8>> {
    let buf = match format {
        OutputFormat::Json => serde_json::to_vec_pretty(module)?,
        OutputFormat::Yaml => serde_yaml::to_string(module)?.into_bytes(),
    };
    Ok(buf)
}
