//! Descriptor error types

/// Errors raised while handling resource descriptors
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Descriptor could not be canonicalized for identity comparison
    #[error("failed to canonicalize descriptor {uri:?}: {source}")]
    Marshal {
        /// Locator of the offending descriptor
        uri: String,
        /// Underlying serializer error
        #[source]
        source: serde_json::Error,
    },
}
