use crate::syntax::{AttrOp, Combinator, Complex, Compound, Selector, Simple};
use html::{Document, NodeId};

fn matches_simple(doc: &Document, node: NodeId, simple: &Simple) -> bool {
    match simple {
        Simple::Class(want) => doc.has_class(node, want),
        Simple::Id(want) => doc.attr(node, "id") == Some(want.as_str()),
        Simple::Attr { name, op } => match (doc.attr(node, name), op) {
            (None, _) => false,
            (Some(_), AttrOp::Exists) => true,
            (Some(v), AttrOp::Equals(want)) => v == want,
            (Some(v), AttrOp::Includes(want)) => v.split_ascii_whitespace().any(|t| t == want),
        },
        Simple::Not(inner) => !matches(doc, node, inner),
    }
}

fn matches_compound(doc: &Document, node: NodeId, compound: &Compound) -> bool {
    let Some(name) = doc.name(node) else {
        return false;
    };
    if let Some(tag) = &compound.tag {
        if tag != name {
            return false;
        }
    }
    compound.parts.iter().all(|p| matches_simple(doc, node, p))
}

// Match `steps` (right to left) starting from the element `node` that already
// matched the compound to the right of `steps[0]`.
fn matches_ancestors(doc: &Document, node: NodeId, steps: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, compound), rest)) = steps.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => doc
            .parent_element(node)
            .is_some_and(|p| matches_compound(doc, p, compound) && matches_ancestors(doc, p, rest)),
        Combinator::Descendant => doc
            .ancestors(node)
            .filter(|a| doc.is_element(*a))
            .any(|a| matches_compound(doc, a, compound) && matches_ancestors(doc, a, rest)),
    }
}

fn matches_complex(doc: &Document, node: NodeId, complex: &Complex) -> bool {
    matches_compound(doc, node, &complex.subject) && matches_ancestors(doc, node, &complex.ancestors)
}

/// Whether the element `node` matches any alternative of `selector`.
/// Ancestors outside any query scope take part in matching, like `Element.matches`.
pub fn matches(doc: &Document, node: NodeId, selector: &Selector) -> bool {
    selector
        .alternatives
        .iter()
        .any(|c| matches_complex(doc, node, c))
}

/// Nearest inclusive ancestor of `node` matching `selector`.
pub fn closest(doc: &Document, node: NodeId, selector: &Selector) -> Option<NodeId> {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .find(|n| doc.is_element(*n) && matches(doc, *n, selector))
}

/// First descendant of `scope` (excluding `scope`) in document order matching `selector`.
pub fn query_selector(doc: &Document, scope: NodeId, selector: &Selector) -> Option<NodeId> {
    doc.descendants(scope)
        .find(|n| doc.is_element(*n) && matches(doc, *n, selector))
}

/// All descendants of `scope` (excluding `scope`) in document order matching `selector`.
pub fn query_selector_all(doc: &Document, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
    doc.descendants(scope)
        .filter(|n| doc.is_element(*n) && matches(doc, *n, selector))
        .collect()
}
