//! Context aggregation
//!
//! Reference material retrieved for one validation request, merged into a
//! single weighted block for the prompt. Contexts are built fresh per
//! request and discarded after prompt assembly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a piece of reference context came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// External knowledge server (resource read or tool query)
    RemoteServer,
    /// User-uploaded document in the local store
    LocalStore,
    /// Built-in material injected by the pipeline itself
    System,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceType::RemoteServer => "remote",
            SourceType::LocalStore => "local",
            SourceType::System => "system",
        };
        f.write_str(name)
    }
}

/// One retrieved piece of reference text plus its trust weight.
///
/// Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceContext {
    pub source_name: String,
    pub source_type: SourceType,
    pub content: String,
    /// 0-100; higher sorts first and is surfaced to the model as a
    /// priority signal
    pub weight: u8,
    pub uri: Option<String>,
}

impl SourceContext {
    pub fn new(
        source_name: impl Into<String>,
        source_type: SourceType,
        content: impl Into<String>,
        weight: u8,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            source_type,
            content: content.into(),
            weight: weight.min(100),
            uri: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// Merge remote and local context pools into one ordered block.
///
/// Remote sources precede local ones, then a stable descending sort by
/// weight: among equal weights the concatenation order is preserved.
pub fn merge(remote: Vec<SourceContext>, local: Vec<SourceContext>) -> Vec<SourceContext> {
    let mut merged = remote;
    merged.extend(local);
    merged.sort_by(|a, b| b.weight.cmp(&a.weight));
    merged
}

/// Render sources into the prompt's context block.
///
/// Empty input renders the empty string; the prompt template must then
/// omit the context section entirely rather than show a vacuous header.
pub fn render(sources: &[SourceContext]) -> String {
    let blocks: Vec<String> = sources
        .iter()
        .map(|source| {
            format!(
                "[Source: {} | type: {} | weight: {}/100]\n{}",
                source.source_name, source.source_type, source.weight, source.content
            )
        })
        .collect();
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(name: &str, source_type: SourceType, weight: u8) -> SourceContext {
        SourceContext::new(name, source_type, format!("content of {name}"), weight)
    }

    #[test]
    fn test_merge_sorts_descending_by_weight() {
        let remote = vec![
            ctx("r1", SourceType::RemoteServer, 30),
            ctx("r2", SourceType::RemoteServer, 90),
        ];
        let local = vec![ctx("l1", SourceType::LocalStore, 60)];

        let merged = merge(remote, local);
        let names: Vec<&str> = merged.iter().map(|c| c.source_name.as_str()).collect();
        assert_eq!(names, vec!["r2", "l1", "r1"]);
        for pair in merged.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
    }

    #[test]
    fn test_merge_ties_keep_remote_before_local() {
        let remote = vec![
            ctx("r1", SourceType::RemoteServer, 50),
            ctx("r2", SourceType::RemoteServer, 50),
        ];
        let local = vec![
            ctx("l1", SourceType::LocalStore, 50),
            ctx("l2", SourceType::LocalStore, 50),
        ];

        let merged = merge(remote, local);
        let names: Vec<&str> = merged.iter().map(|c| c.source_name.as_str()).collect();
        assert_eq!(names, vec!["r1", "r2", "l1", "l2"]);
    }

    #[test]
    fn test_render_empty_is_empty_string() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_includes_header_and_content() {
        let sources = vec![ctx("IATA table", SourceType::RemoteServer, 80)];
        let rendered = render(&sources);
        assert!(rendered.contains("[Source: IATA table | type: remote | weight: 80/100]"));
        assert!(rendered.contains("content of IATA table"));
    }

    #[test]
    fn test_weight_clamped_to_100() {
        let source = SourceContext::new("x", SourceType::System, "y", 255);
        assert_eq!(source.weight, 100);
    }
}
