use crate::{Document, NodeId, NodeKind};

/// Text content with runs of whitespace collapsed to single spaces.
pub fn normalized_text(doc: &Document, node: NodeId) -> String {
    doc.text_content(node)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Indented one-line-per-node rendering of a subtree, capped at `cap` lines.
pub fn outline(doc: &Document, root: NodeId, cap: usize) -> Vec<String> {
    fn walk(doc: &Document, node: NodeId, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        match doc.kind(node) {
            Some(NodeKind::Document) => out.push(format!("{indent}#document")),
            Some(NodeKind::Element { name, .. }) => {
                let mut line = format!("{indent}<{name}");
                if let Some(id) = doc.attr(node, "id") {
                    line.push_str(&format!(r#" id="{id}""#));
                }
                if let Some(class) = doc.attr(node, "class").filter(|c| !c.is_empty()) {
                    line.push_str(&format!(r#" class="{class}""#));
                }
                line.push('>');
                out.push(line);
            }
            Some(NodeKind::Text { text }) => {
                let t = text.replace('\n', " ").trim().to_string();
                if !t.is_empty() {
                    let show = match t.char_indices().nth(40) {
                        Some((cut, _)) => format!("{}…", &t[..cut]),
                        None => t,
                    };
                    out.push(format!("{indent}\"{show}\""));
                }
            }
            Some(NodeKind::Comment { text }) => {
                out.push(format!("{indent}<!-- {} -->", text.replace('\n', " ")));
            }
            None => {}
        }
        for c in doc.children(node) {
            walk(doc, *c, depth + 1, out, left);
        }
    }
    let mut out = Vec::new();
    let mut left = cap;
    walk(doc, root, 0, &mut out, &mut left);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_shows_classes_and_text() {
        let doc = Document::parse(r#"<div class="thing link"><a class=title>Hello   world</a></div>"#);
        let lines = outline(&doc, Document::ROOT, 10);
        assert_eq!(
            lines,
            [
                "#document",
                r#"  <div class="thing link">"#,
                r#"    <a class="title">"#,
                r#"      "Hello   world""#,
            ]
        );
    }

    #[test]
    fn normalized_text_collapses_whitespace() {
        let doc = Document::parse("<p> 12\n  points </p>");
        assert_eq!(normalized_text(&doc, Document::ROOT), "12 points");
    }
}
