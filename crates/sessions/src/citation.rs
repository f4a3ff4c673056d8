//! Citation placeholder numbering.
//!
//! The generator writes `[]` wherever it cites retrieved material.  For
//! display each placeholder becomes `[1]`, `[2]`, ... in order of
//! appearance.  Numbering is recomputed on every render and never stored.

use std::ops::Range;

/// The literal citation placeholder.
pub const PLACEHOLDER: &str = "[]";

/// A citation assigned while numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// 1-based index, as displayed.
    pub index: usize,
    /// Byte range of the whole `[n]` marker in the rendered text.
    pub span: Range<usize>,
}

/// Replace each `[]` in `content`, left to right, with `[1]`, `[2]`, ...
///
/// Content without placeholders comes back unchanged, so applying this to
/// already numbered text is a no-op.
pub fn numbered(content: &str) -> String {
    numbered_with_citations(content).0
}

/// Like [`numbered`], also returning the markers it assigned.
///
/// Bracketed numbers the generator wrote itself (`[2019]`, `[2]`) are not
/// citations and are not reported.
pub fn numbered_with_citations(content: &str) -> (String, Vec<Citation>) {
    let mut out = String::with_capacity(content.len() + 8);
    let mut citations = Vec::new();
    let mut rest = content;

    while let Some(pos) = rest.find(PLACEHOLDER) {
        out.push_str(&rest[..pos]);
        let index = citations.len() + 1;
        let start = out.len();
        out.push('[');
        out.push_str(&index.to_string());
        out.push(']');
        citations.push(Citation {
            index,
            span: start..out.len(),
        });
        rest = &rest[pos + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    (out, citations)
}

/// Number of unnumbered placeholders in `content`.
pub fn placeholder_count(content: &str) -> usize {
    content.matches(PLACEHOLDER).count()
}

/// Pair each citation with the chunk it refers to, if there is one.
///
/// Indices past the end of `chunks` (or `0`) resolve to `None`; they are
/// not clamped or dropped.
pub fn resolve<'a>(citations: &[Citation], chunks: &'a [String]) -> Vec<(usize, Option<&'a str>)> {
    let resolved: Vec<(usize, Option<&'a str>)> = citations
        .iter()
        .map(|c| {
            let chunk = c.index.checked_sub(1).and_then(|i| chunks.get(i));
            (c.index, chunk.map(String::as_str))
        })
        .collect();

    let unresolved = resolved.iter().filter(|(_, chunk)| chunk.is_none()).count();
    if unresolved > 0 {
        tracing::debug!(
            citations = citations.len(),
            chunks = chunks.len(),
            unresolved,
            "citations without a matching chunk"
        );
    }
    resolved
}
