/// Error while loading a grammar description.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("grammar JSON parse error: {0}")]
    Json(#[source] serde_json::Error),

    /// A rule object that is not what its `type` promises.
    #[error("invalid grammar at `{path}`: {reason}")]
    Shape { path: String, reason: String },

    #[error("grammar `{grammar}` defines no rules, so it has no start rule")]
    NoRules { grammar: String },

    #[error("grammar binary decode error: {0}")]
    Binary(#[source] postcard::Error),
}

impl LoadError {
    pub(crate) fn shape(path: &str, reason: impl Into<String>) -> Self {
        Self::Shape {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}
