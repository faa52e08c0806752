//! Model-name resolution.
//!
//! Maps whatever identifier a client sends to the concrete tag the backend
//! knows, plus the context window configured for that model family.
//! Resolution is total: every input string produces an output, and
//! resolving an already-canonical tag is the identity.

/// Tag used when the caller sends no model at all.
pub const DEFAULT_TAG: &str = "llama3.2:3b";

/// Context window for families without a table entry.
pub const DEFAULT_CONTEXT_WINDOW: u64 = 4096;

/// Bare family aliases and their default concrete tags.
const FAMILY_DEFAULTS: &[(&str, &str)] = &[
    ("llama3", "llama3:8b"),
    ("llama3.1", "llama3.1:8b"),
    ("llama3.2", "llama3.2:3b"),
    ("mistral", "mistral:7b"),
    ("phi3", "phi3:mini"),
    ("gemma2", "gemma2:9b"),
    ("qwen2.5", "qwen2.5:7b"),
    ("nomic-embed-text", "nomic-embed-text:v1.5"),
];

/// Per-family context window sizes.
const CONTEXT_WINDOWS: &[(&str, u64)] = &[
    ("llama3", 8192),
    ("llama3.1", 32768),
    ("llama3.2", 32768),
    ("mistral", 8192),
    ("phi3", 4096),
    ("gemma2", 8192),
    ("qwen2.5", 32768),
    ("nomic-embed-text", 2048),
];

/// Outcome of model resolution: the tag to send to the backend and the
/// context window to request for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub tag: String,
    pub context_window: u64,
}

/// Resolve a requested model identifier.
///
/// - blank input resolves to [`DEFAULT_TAG`];
/// - a bare family alias (no `:`) resolves to that family's default tag;
/// - `family:latest` is rewritten to the family default when the family is
///   known, and passed through unchanged otherwise;
/// - anything else passes through as-is.
#[must_use]
pub fn resolve(requested: &str) -> ResolvedModel {
    let requested = requested.trim();

    let tag = if requested.is_empty() {
        DEFAULT_TAG.to_string()
    } else {
        match requested.split_once(':') {
            None => family_default(requested)
                .map_or_else(|| requested.to_string(), str::to_string),
            Some((family, "latest")) => family_default(family)
                .map_or_else(|| requested.to_string(), str::to_string),
            Some(_) => requested.to_string(),
        }
    };

    let context_window = context_window_for(family_of(&tag));
    ResolvedModel {
        tag,
        context_window,
    }
}

fn family_default(family: &str) -> Option<&'static str> {
    FAMILY_DEFAULTS
        .iter()
        .find(|(name, _)| *name == family)
        .map(|(_, tag)| *tag)
}

fn context_window_for(family: &str) -> u64 {
    CONTEXT_WINDOWS
        .iter()
        .find(|(name, _)| *name == family)
        .map_or(DEFAULT_CONTEXT_WINDOW, |(_, size)| *size)
}

/// The family portion of a tag (everything before the first `:`).
fn family_of(tag: &str) -> &str {
    tag.split_once(':').map_or(tag, |(family, _)| family)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_resolves_to_default() {
        assert_eq!(resolve("").tag, DEFAULT_TAG);
        assert_eq!(resolve("   ").tag, DEFAULT_TAG);
    }

    #[test]
    fn bare_alias_gets_default_version() {
        let resolved = resolve("llama3");
        assert_eq!(resolved.tag, "llama3:8b");
        assert_eq!(resolved.context_window, 8192);
    }

    #[test]
    fn latest_rewrites_to_family_default() {
        assert_eq!(resolve("mistral:latest").tag, "mistral:7b");
    }

    #[test]
    fn latest_passes_through_for_unknown_family() {
        assert_eq!(resolve("smollm:latest").tag, "smollm:latest");
    }

    #[test]
    fn unknown_bare_name_passes_through() {
        let resolved = resolve("custom-finetune");
        assert_eq!(resolved.tag, "custom-finetune");
        assert_eq!(resolved.context_window, DEFAULT_CONTEXT_WINDOW);
    }

    #[test]
    fn resolution_is_idempotent_on_canonical_tags() {
        for (_, tag) in FAMILY_DEFAULTS {
            let first = resolve(tag);
            let second = resolve(&first.tag);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn concrete_tag_keeps_family_window() {
        assert_eq!(resolve("qwen2.5:32b").context_window, 32768);
    }
}
