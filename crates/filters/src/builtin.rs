//! Cases shipped with the engine, and the collaborators some of them consult.

use crate::case::{CaseDef, Evaluator, Field};
use crate::engine::CaseEngine;
use crate::error::CaseError;
use core_types::ThingKind;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::{Value, json};
use std::rc::Rc;
use things::{Post, Thing};

/// Media kinds an expando can show.
pub const EXPANDO_TYPES: &[&str] = &["image", "gallery", "text", "video", "audio", "iframe", "generic"];

/// Browser history lookup.
pub trait VisitedLinks {
    fn is_visited(&self, url: &str) -> LocalBoxFuture<'static, bool>;
}

/// An inline media viewer attached to a thing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandoInfo {
    /// Still loading; treated as absent.
    pub ready: bool,
    pub types: Vec<String>,
}

pub trait ExpandoSource {
    /// The post's entry expando, or every expando in a comment's text.
    fn expandos(&self, thing: &Thing<'_>) -> Vec<ExpandoInfo>;
}

pub trait ReadComments {
    fn is_running(&self) -> bool;
    fn is_read(&self, thing: &Thing<'_>) -> bool;
}

/// Stand-in collaborator: nothing visited, no expandos, read tracking off.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nothing;

impl VisitedLinks for Nothing {
    fn is_visited(&self, _url: &str) -> LocalBoxFuture<'static, bool> {
        async { false }.boxed_local()
    }
}

impl ExpandoSource for Nothing {
    fn expandos(&self, _thing: &Thing<'_>) -> Vec<ExpandoInfo> {
        Vec::new()
    }
}

impl ReadComments for Nothing {
    fn is_running(&self) -> bool {
        false
    }

    fn is_read(&self, _thing: &Thing<'_>) -> bool {
        false
    }
}

#[derive(Clone)]
pub struct Collaborators {
    pub visited: Rc<dyn VisitedLinks>,
    pub expandos: Rc<dyn ExpandoSource>,
    pub read_comments: Rc<dyn ReadComments>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            visited: Rc::new(Nothing),
            expandos: Rc::new(Nothing),
            read_comments: Rc::new(Nothing),
        }
    }
}

fn post<'a>(thing: &Thing<'a>, case: &str) -> Result<Post<'a>, CaseError> {
    thing.as_post().ok_or_else(|| CaseError::NotApplicable {
        case: case.to_string(),
        kind: thing.kind(),
    })
}

fn post_flag(name: &'static str, text: &str, description: &str, flag: fn(&Post<'_>) -> bool) -> CaseDef {
    CaseDef::new(
        name,
        &[ThingKind::Post],
        Evaluator::sync(move |thing, _| post(thing, name).map(|p| flag(&p))),
    )
    .text(text)
    .field(Field::Text(description.to_string()))
    .unique()
}

const POST_KINDS: [(&str, &str); 2] = [("link post", "link"), ("self post", "self")];

fn post_kind(config: &Value) -> Option<&str> {
    config.get("kind").and_then(Value::as_str)
}

fn post_type() -> CaseDef {
    CaseDef::new(
        "postType",
        &[ThingKind::Post],
        Evaluator::sync(|thing, config| {
            let post = post(thing, "postType")?;
            Ok(match post_kind(config) {
                Some("link") => post.is_link_post(),
                Some("self") => post.is_self_post(),
                _ => false,
            })
        }),
    )
    .text("Post type")
    .field(Field::Text("post is a ".into()))
    .field(Field::Select {
        id: "kind".into(),
        options: POST_KINDS
            .iter()
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect(),
    })
    .defaults(json!({ "kind": "link" }))
    .pattern("(link|self)")
    .parse_with(|input| json!({ "kind": input.trim() }))
    .validate_with(|config| post_kind(config).is_some_and(|k| POST_KINDS.iter().any(|(_, v)| *v == k)))
    .label_with(|config| format!("type {}", post_kind(config).unwrap_or("?")))
}

fn comments_opened(visited: Rc<dyn VisitedLinks>) -> CaseDef {
    CaseDef::new(
        "commentsOpened",
        &[ThingKind::Post],
        Evaluator::asynchronous(move |thing, _| {
            let url = post(thing, "commentsOpened").map(|p| p.comments_url());
            match url {
                Ok(Some(url)) => visited.is_visited(&url).map(Ok).boxed_local(),
                Ok(None) => async { Ok(false) }.boxed_local(),
                Err(err) => async move { Err(err) }.boxed_local(),
            }
        }),
    )
    .text("Comments opened")
    .field(Field::Text("comments page has been visited".into()))
    .slow(2)
    .unique()
    .label_with(|_| "comments opened".into())
}

fn expando_types(config: &Value) -> Vec<&str> {
    config
        .get("types")
        .and_then(Value::as_array)
        .map(|types| types.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// No wanted types matches any expando; otherwise the type lists must
/// intersect.
fn matches_types(wanted: &[&str], types: &[String]) -> bool {
    wanted.is_empty() || types.iter().any(|t| wanted.contains(&t.as_str()))
}

fn has_expando(source: Rc<dyn ExpandoSource>) -> CaseDef {
    let describe = Rc::clone(&source);
    CaseDef::new(
        "hasExpando",
        &[ThingKind::Post, ThingKind::Comment],
        Evaluator::sync(move |thing, config| {
            let wanted = expando_types(config);
            Ok(source
                .expandos(thing)
                .iter()
                .any(|e| e.ready && matches_types(&wanted, &e.types)))
        }),
    )
    .text("Expando")
    .field(Field::Text(
        "post has expando, and (if specified) expando types intersects with ".into(),
    ))
    .field(Field::Checkset {
        id: "types".into(),
        items: EXPANDO_TYPES.iter().map(|t| t.to_string()).collect(),
    })
    .slow(9)
    .defaults(json!({ "types": [] }))
    .pattern(format!("[({})]", EXPANDO_TYPES.join("|")))
    .parse_with(|input| {
        let types: Vec<&str> = input
            .split(|c: char| c.is_whitespace() || c == '|')
            .filter(|s| !s.is_empty())
            .collect();
        json!({ "types": types })
    })
    .serialize_with(move |thing| {
        describe
            .expandos(thing)
            .first()
            .map(|e| e.types.join(" & "))
            .unwrap_or_default()
    })
    .validate_with(|config| {
        config.get("types").is_some_and(Value::is_array)
            && expando_types(config).iter().all(|t| EXPANDO_TYPES.contains(t))
    })
    .label_with(|config| {
        let types = expando_types(config);
        if types.is_empty() {
            "expando".into()
        } else {
            format!("expando {}", types.join("|"))
        }
    })
}

fn is_deleted() -> CaseDef {
    CaseDef::new(
        "isDeleted",
        &[ThingKind::Comment],
        Evaluator::sync(|thing, _| Ok(thing.is_deleted())),
    )
    .text("Deleted")
    .field(Field::Text("comment is deleted".into()))
    .unique()
}

fn is_read(read: Rc<dyn ReadComments>) -> CaseDef {
    let running = Rc::clone(&read);
    CaseDef::new(
        "isRead",
        &[ThingKind::Comment],
        Evaluator::sync(move |thing, _| Ok(read.is_read(thing))),
    )
    .text("Read")
    .field(Field::Text("comment is read".into()))
    .unique()
    .disabled_when(move || !running.is_running())
}

/// Register every built-in case.
pub fn register_builtins(engine: &mut CaseEngine, collaborators: &Collaborators) -> Result<(), CaseError> {
    let cases = [
        post_flag("isNSFW", "NSFW", "post is marked NSFW", |p| p.is_nsfw()),
        post_flag("isSpoiler", "Spoiler", "post is marked spoiler", |p| p.is_spoiler()),
        post_flag("isLocked", "Locked", "post is locked", |p| p.is_locked()),
        post_type(),
        comments_opened(Rc::clone(&collaborators.visited)),
        has_expando(Rc::clone(&collaborators.expandos)),
        is_deleted(),
        is_read(Rc::clone(&collaborators.read_comments)),
    ];
    for case in cases {
        engine.register_case(case)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_lists_intersect() {
        let types = vec!["image".to_string(), "gallery".to_string()];
        assert!(matches_types(&[], &types));
        assert!(matches_types(&["video", "gallery"], &types));
        assert!(!matches_types(&["video"], &types));
    }

    #[test]
    fn criteria_parse_into_configs() {
        let mut engine = CaseEngine::new();
        register_builtins(&mut engine, &Collaborators::default()).unwrap();
        let expando = engine.get("hasExpando").unwrap();
        let config = expando.parse_criterion("image | video");
        assert_eq!(config, json!({ "types": ["image", "video"] }));
        assert!(expando.is_valid(&config));
        assert!(!expando.is_valid(&json!({ "types": ["hologram"] })));
        assert_eq!(expando.true_text(&config), "expando image|video");
        assert_eq!(expando.false_text(&json!({ "types": [] })), "¬ expando");

        let post_type = engine.get("postType").unwrap();
        assert!(post_type.is_valid(&post_type.parse_criterion("self")));
        assert!(!post_type.is_valid(&json!({ "kind": "video" })));
        assert_eq!(engine.get("isNSFW").unwrap().true_text(&Value::Null), "nsfw");
    }
}
