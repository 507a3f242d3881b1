//! Client options: which documents the client serves and where its
//! diagnostic trace output goes.

use lsp_types::{DocumentFilter, DocumentSelector};
use serde::Serialize;
use tracing::info;

/// Log target for trace channel output.
pub(crate) const TRACE_TARGET: &str = "nml_client::trace";

/// URI scheme of documents on the local filesystem.
pub const FILE_SCHEME: &str = "file";

/// Diagnostic-only output sink named `"<extension> trace"`.
///
/// Lines written to the channel become `tracing` events carrying the channel
/// name and language identifier. Nothing functional depends on the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceChannel {
    name: String,
    language_id: String,
}

impl TraceChannel {
    /// Creates the trace channel for an extension.
    #[must_use]
    pub fn for_extension(extension_name: &str, language_id: impl Into<String>) -> Self {
        Self {
            name: format!("{extension_name} trace"),
            language_id: language_id.into(),
        }
    }

    /// Channel name shown to the user.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Language identifier the channel is tagged with.
    #[must_use]
    pub fn language_id(&self) -> &str {
        self.language_id.as_str()
    }

    /// Appends a human-readable line to the channel.
    pub fn append_line(&self, line: &str) {
        info!(
            target: TRACE_TARGET,
            channel = %self.name,
            language = %self.language_id,
            "{line}"
        );
    }
}

/// Options the client library is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientOptions {
    document_selector: DocumentSelector,
    trace_channel: Option<TraceChannel>,
}

impl ClientOptions {
    /// Selects local-file documents with the given language identifier.
    #[must_use]
    pub fn for_language(language_id: &str) -> Self {
        Self {
            document_selector: vec![DocumentFilter {
                language: Some(language_id.to_owned()),
                scheme: Some(FILE_SCHEME.to_owned()),
                pattern: None,
            }],
            trace_channel: None,
        }
    }

    /// Attaches a trace channel.
    #[must_use]
    pub fn with_trace_channel(mut self, channel: TraceChannel) -> Self {
        self.trace_channel = Some(channel);
        self
    }

    /// Filters deciding which documents the client applies to.
    #[must_use]
    pub fn document_selector(&self) -> &[DocumentFilter] {
        &self.document_selector
    }

    /// Optional diagnostic sink.
    #[must_use]
    pub const fn trace_channel(&self) -> Option<&TraceChannel> {
        self.trace_channel.as_ref()
    }

    /// Whether a document with `scheme` and `language_id` falls under the
    /// selector. Unset filter fields match anything.
    #[must_use]
    pub fn applies_to(&self, scheme: &str, language_id: &str) -> bool {
        self.document_selector.iter().any(|filter| {
            filter.scheme.as_deref().is_none_or(|wanted| wanted == scheme)
                && filter
                    .language
                    .as_deref()
                    .is_none_or(|wanted| wanted == language_id)
        })
    }
}
