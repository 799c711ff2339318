pub mod fixtures;

use html::{Document, NodeId};

/// Parse `markup` as the page at `url`.
pub fn page(markup: &str, url: &str) -> Document {
    let mut doc = Document::parse(markup);
    doc.set_url(url);
    doc
}

/// Element with the given `id` attribute. Panics when there is none, which
/// in a test means the fixture and the test disagree.
pub fn by_id(doc: &Document, id: &str) -> NodeId {
    try_by_id(doc, id).unwrap_or_else(|| panic!("fixture has no element with id {id:?}"))
}

pub fn try_by_id(doc: &Document, id: &str) -> Option<NodeId> {
    doc.descendants(Document::ROOT)
        .find(|n| doc.attr(*n, "id") == Some(id))
}

/// `id` attributes of `nodes`, `"?"` for nodes without one.
pub fn ids(doc: &Document, nodes: impl IntoIterator<Item = NodeId>) -> Vec<String> {
    nodes
        .into_iter()
        .map(|n| doc.attr(n, "id").unwrap_or("?").to_string())
        .collect()
}

/// Build detached markup and append it under `parent`, returning the
/// inserted top-level nodes.
pub fn insert_markup(doc: &mut Document, parent: NodeId, markup: &str) -> Vec<NodeId> {
    let nodes = html::parse_fragment(doc, markup);
    for node in &nodes {
        doc.append_child(parent, *node)
            .unwrap_or_else(|err| panic!("cannot insert fixture markup: {err}"));
    }
    nodes
}

/// Compare the outline of `root` against `expected`, printing the first
/// mismatch with context.
pub fn assert_outline(doc: &Document, root: NodeId, expected: &[&str]) {
    let actual = html::dom_utils::outline(doc, root, 10_000);
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        panic!("outline mismatch\n{}", diff_lines(&expected, &actual));
    }
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;

    let max = expected.len().max(actual.len());
    let missing = "<missing>";
    let line = |lines: &[String], i: usize| lines.get(i).map(String::as_str).unwrap_or(missing).to_string();
    let mut out = String::new();
    let mismatch = (0..max).find(|i| line(expected, *i) != line(actual, *i));
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for idx in start..end {
            let marker = if idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", idx + 1, line(expected, idx));
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", idx + 1, line(actual, idx));
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_parse_with_expected_rows() {
        let doc = page(fixtures::LISTING, fixtures::LISTING_URL);
        for id in ["p1", "p2", "p3", "p4", "p5"] {
            assert!(doc.has_class(by_id(&doc, id), "thing"));
        }
        let doc = page(fixtures::THREAD, fixtures::THREAD_URL);
        for id in ["c1", "c2", "c3", "c4", "c5"] {
            assert!(doc.has_class(by_id(&doc, id), "comment"));
        }
        let doc = page(fixtures::SEARCH, fixtures::SEARCH_URL);
        assert!(doc.has_class(by_id(&doc, "s2"), "search-result-link"));
    }

    #[test]
    fn diff_points_at_first_mismatch() {
        let expected = vec!["a".to_string(), "b".to_string()];
        let actual = vec!["a".to_string(), "c".to_string(), "d".to_string()];
        let report = diff_lines(&expected, &actual);
        assert!(report.contains("first mismatch at line 2"));
        assert!(report.contains("expected 2 lines, actual 3 lines"));
    }
}
