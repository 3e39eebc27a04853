//! Error types for registry construction, context building and rendering

use thiserror::Error;

/// Errors produced by the Trellis core
#[derive(Debug, Error)]
pub enum TrellisError {
    /// No view is registered under the requested logical path
    #[error("View not found: {path}")]
    ViewNotFound { path: String },

    /// A host enrichment function failed while building the render context
    #[error("Context enrichment '{enricher}' failed: {message}")]
    ContextEnrichment { enricher: String, message: String },

    /// A layout or page failed to render
    #[error("Render failed in '{identifier}': {message}")]
    Render { identifier: String, message: String },

    /// The host's request handler failed before rendering started
    #[error("Handler for '{view}' failed: {message}")]
    Handler { view: String, message: String },

    /// Props or context could not be serialized for hydration
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Two views were registered under the same path
    #[error("Duplicate view registration: {path}")]
    DuplicateView { path: String },

    /// Two layouts share an identifier
    #[error("Duplicate layout identifier: {id}")]
    DuplicateLayout { id: String },

    /// Two layouts claim the same scope
    #[error("Layouts '{first}' and '{second}' both claim scope '{scope}'")]
    LayoutScopeConflict {
        scope: String,
        first: String,
        second: String,
    },

    /// A layout identifier collides with a view path
    #[error("Identifier '{id}' is used by both a layout and a view")]
    IdentifierCollision { id: String },

    /// A path or scope is not a valid logical path
    #[error("Invalid logical path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The manifest references a component export the catalog does not provide
    #[error("Unknown component export '{export}' referenced by '{referenced_by}'")]
    UnknownComponent {
        export: String,
        referenced_by: String,
    },

    /// The registry manifest could not be read or parsed
    #[error("Manifest error: {0}")]
    Manifest(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, TrellisError>;

impl TrellisError {
    /// Create a render error for a layout or view identifier
    pub fn render(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// True for errors that mean "nothing to render here" rather than a fault
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ViewNotFound { .. })
    }

    /// True for errors raised while building or loading the registry
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateView { .. }
                | Self::DuplicateLayout { .. }
                | Self::LayoutScopeConflict { .. }
                | Self::IdentifierCollision { .. }
                | Self::InvalidPath { .. }
                | Self::UnknownComponent { .. }
                | Self::Manifest(_)
        )
    }

    /// Short category name used as a structured field when reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::ViewNotFound { .. } => "view_not_found",
            Self::ContextEnrichment { .. } => "context_enrichment",
            Self::Render { .. } => "render",
            Self::Handler { .. } => "handler",
            Self::Serialization(_) => "serialization",
            Self::DuplicateView { .. } => "duplicate_view",
            Self::DuplicateLayout { .. } => "duplicate_layout",
            Self::LayoutScopeConflict { .. } => "layout_scope_conflict",
            Self::IdentifierCollision { .. } => "identifier_collision",
            Self::InvalidPath { .. } => "invalid_path",
            Self::UnknownComponent { .. } => "unknown_component",
            Self::Manifest(_) => "manifest",
        }
    }
}

impl From<serde_json::Error> for TrellisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrellisError::render("AdminLayout", "template exploded");
        assert_eq!(
            err.to_string(),
            "Render failed in 'AdminLayout': template exploded"
        );

        let err = TrellisError::ViewNotFound {
            path: "/does-not-exist".to_string(),
        };
        assert_eq!(err.to_string(), "View not found: /does-not-exist");
    }

    #[test]
    fn test_error_classification() {
        let err = TrellisError::ViewNotFound {
            path: "/x".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_build_error());

        let err = TrellisError::DuplicateView {
            path: "/x".to_string(),
        };
        assert!(err.is_build_error());
        assert_eq!(err.category(), "duplicate_view");
    }
}
