use crate::ast::NodeKind;

/// Errors that can occur while rendering or converting a document.
///
/// Malformed input DOM is never an error: the transducer repairs or discards
/// what it cannot place.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A renderer met a node kind it has no handler for.
    #[error("no renderer for node [kind={kind}, tokens={tokens}]")]
    NoRenderer { kind: NodeKind, tokens: String },

    /// A conversion panicked; the panic was caught at the API boundary.
    #[error("PANIC RECOVERED: {message}\n{backtrace}")]
    Panic { message: String, backtrace: String },

    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
