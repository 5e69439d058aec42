//! Pipeline configuration errors.

use thiserror::Error;

/// Error raised while assembling a dispatcher or a view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineError {
    /// No built-in parser has this name.
    #[error("unknown parser `{0}`")]
    UnknownParser(String),

    /// No built-in renderer has this name.
    #[error("unknown renderer `{0}`")]
    UnknownRenderer(String),

    /// The view's metadata lacks a capability it needs.
    #[error("{view}: `{capability}` is required")]
    MissingCapability {
        /// View class name.
        view: String,
        /// Missing metadata key.
        capability: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            PipelineError::UnknownParser("xml".into()).to_string(),
            "unknown parser `xml`"
        );
        assert_eq!(
            PipelineError::MissingCapability {
                view: "ThingList".into(),
                capability: "model",
            }
            .to_string(),
            "ThingList: `model` is required"
        );
    }
}
