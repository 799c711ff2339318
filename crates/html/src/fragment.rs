//! Small markup reader for page fixtures and captured listings.
//!
//! Known limitations (intentional):
//! - No HTML5 tree-construction recovery: an end tag closes the nearest open
//!   element with the same name, and stray end tags are ignored.
//! - Whitespace-only text between tags is dropped.
//! - `<script>`/`<style>` bodies are not treated as raw text.
//! - Only a handful of named entities plus numeric references are decoded.
use crate::{Document, NodeId, NodeKind};
use memchr::memchr;

#[derive(Debug, PartialEq, Eq)]
enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
    Comment(String),
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

fn decode_entities(s: &str) -> String {
    if memchr(b'&', s.as_bytes()).is_none() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';').filter(|pos| *pos < 10) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        let body = &tail[1..semi];
        let decoded = match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| body.strip_prefix('#').and_then(|d| d.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            let end = memchr(b'<', &bytes[i..]).map_or(bytes.len(), |rel| i + rel);
            let text = &input[i..end];
            if !text.trim().is_empty() {
                out.push(Token::Text(decode_entities(text)));
            }
            i = end;
            continue;
        }
        if input[i..].starts_with("<!--") {
            let body_start = i + 4;
            match input[body_start..].find("-->") {
                Some(rel) => {
                    out.push(Token::Comment(input[body_start..body_start + rel].to_string()));
                    i = body_start + rel + 3;
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    break;
                }
            }
            continue;
        }
        if bytes.get(i + 1) == Some(&b'!') || bytes.get(i + 1) == Some(&b'?') {
            // doctype / processing instruction: skip to '>'
            i = memchr(b'>', &bytes[i..]).map_or(bytes.len(), |rel| i + rel + 1);
            continue;
        }
        let closing = bytes.get(i + 1) == Some(&b'/');
        let name_start = if closing { i + 2 } else { i + 1 };
        let mut j = name_start;
        while j < bytes.len() && is_name_byte(bytes[j]) {
            j += 1;
        }
        if j == name_start {
            // lone '<' is text
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = input[name_start..j].to_ascii_lowercase();
        if closing {
            i = memchr(b'>', &bytes[j..]).map_or(bytes.len(), |rel| j + rel + 1);
            out.push(Token::EndTag(name));
            continue;
        }

        let mut attributes = Vec::new();
        let mut self_closing = false;
        loop {
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            match bytes.get(j) {
                None => break,
                Some(b'>') => {
                    j += 1;
                    break;
                }
                Some(b'/') => {
                    self_closing = true;
                    j += 1;
                    continue;
                }
                _ => {}
            }
            let attr_start = j;
            while j < bytes.len()
                && !bytes[j].is_ascii_whitespace()
                && !matches!(bytes[j], b'=' | b'>' | b'/')
            {
                j += 1;
            }
            if j == attr_start {
                j += 1;
                continue;
            }
            let attr_name = input[attr_start..j].to_ascii_lowercase();
            let mut value = String::new();
            if bytes.get(j) == Some(&b'=') {
                j += 1;
                match bytes.get(j) {
                    Some(&q @ (b'"' | b'\'')) => {
                        let v_start = j + 1;
                        let v_end = memchr(q, &bytes[v_start..]).map_or(bytes.len(), |rel| v_start + rel);
                        value = decode_entities(&input[v_start..v_end]);
                        j = (v_end + 1).min(bytes.len());
                    }
                    _ => {
                        let v_start = j;
                        while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                            j += 1;
                        }
                        value = decode_entities(&input[v_start..j]);
                    }
                }
            }
            attributes.push((attr_name, value));
        }
        out.push(Token::StartTag {
            name,
            attributes,
            self_closing,
        });
        i = j;
    }
    out
}

/// Parse `markup` into detached nodes owned by `doc` and return the
/// top-level nodes in source order.
pub fn parse_fragment(doc: &mut Document, markup: &str) -> Vec<NodeId> {
    let journal_mark = doc.journal_len();
    let mut top = Vec::new();
    let mut open: Vec<(String, NodeId)> = Vec::new();

    let mut attach = |doc: &mut Document, open: &[(String, NodeId)], node: NodeId| {
        match open.last() {
            Some((_, parent)) => {
                if let Err(err) = doc.append_child(*parent, node) {
                    log::debug!(target: "html.fragment", "dropping node: {err}");
                }
            }
            None => top.push(node),
        }
    };

    for token in tokenize(markup) {
        match token {
            Token::Text(text) => {
                let node = doc.push(NodeKind::Text { text });
                attach(doc, &open, node);
            }
            Token::Comment(text) => {
                let node = doc.push(NodeKind::Comment { text });
                attach(doc, &open, node);
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let void = is_void_element(&name);
                let node = doc.push(NodeKind::Element {
                    name: name.clone(),
                    attributes,
                });
                attach(doc, &open, node);
                if !self_closing && !void {
                    open.push((name, node));
                }
            }
            Token::EndTag(name) => {
                if let Some(pos) = open.iter().rposition(|(n, _)| *n == name) {
                    open.truncate(pos);
                }
            }
        }
    }
    // Building detached nodes is not a page mutation.
    doc.truncate_journal(journal_mark);
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_attributes_in_all_quoting_styles() {
        let tokens = tokenize(r#"<a href="/r/x" class='title may-blank' data-rank=3 hidden>"#);
        assert_eq!(
            tokens,
            vec![Token::StartTag {
                name: "a".to_string(),
                attributes: vec![
                    ("href".to_string(), "/r/x".to_string()),
                    ("class".to_string(), "title may-blank".to_string()),
                    ("data-rank".to_string(), "3".to_string()),
                    ("hidden".to_string(), String::new()),
                ],
                self_closing: false,
            }]
        );
    }

    #[test]
    fn builds_nested_tree_with_void_elements() {
        let mut doc = Document::new();
        let top = parse_fragment(
            &mut doc,
            "<div class=thing><img src=x.png><p>a &amp; b</p></div><span>tail</span>",
        );
        assert_eq!(top.len(), 2);
        let div = top[0];
        let kids: Vec<_> = doc.children(div).iter().map(|c| doc.name(*c)).collect();
        assert_eq!(kids, [Some("img"), Some("p")]);
        assert_eq!(doc.text_content(div), "a & b");
        assert!(!doc.has_pending_mutations());
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let mut doc = Document::new();
        let top = parse_fragment(&mut doc, "<div></span><b>x</b></div>");
        assert_eq!(top.len(), 1);
        assert_eq!(doc.text_content(top[0]), "x");
    }

    #[test]
    fn numeric_entities_decode() {
        assert_eq!(decode_entities("&#172; &#x41;&bogus;"), "\u{ac} A&bogus;");
    }
}
