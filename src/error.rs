use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no go.mod found above {0}")]
    ModuleRootNotFound(String),

    #[error("no module directive in {0}")]
    ModulePath(String),

    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// A type expression outside the renderer grammar. This is a defect in
    /// grammar coverage, not invalid input, and aborts the run.
    #[error("unsupported type expression `{kind}` in {file}")]
    UnsupportedTypeExpr { kind: String, file: String },

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encode error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
