use html::Document;
use html_test_support::fixtures::{LISTING, LISTING_URL, THREAD, THREAD_URL};
use html_test_support::{by_id, ids, page};
use std::rc::Rc;
use things::{Direction, FilterPayload, ThingError, ThingKind, Things, Visibility};

#[test]
fn resolving_the_same_element_twice_yields_one_thing() {
    let doc = page(LISTING, LISTING_URL);
    let mut things = Things::new();

    let from_row = things.resolve(&doc, by_id(&doc, "p2")).unwrap();
    let again = things.resolve(&doc, by_id(&doc, "p2")).unwrap();
    assert_eq!(from_row, again);
    assert_eq!(things.len(), 1);
}

#[test]
fn any_descendant_resolves_to_its_row() {
    let doc = page(LISTING, LISTING_URL);
    let mut things = Things::new();
    let row = things.resolve(&doc, by_id(&doc, "p1")).unwrap();
    let title_link = doc
        .descendants(by_id(&doc, "p1"))
        .find(|n| doc.has_class(*n, "title") && doc.name(*n) == Some("a"))
        .unwrap();
    assert_eq!(things.resolve(&doc, title_link), Some(row));
}

#[test]
fn resolving_a_thing_is_the_identity() {
    let doc = page(LISTING, LISTING_URL);
    let mut things = Things::new();
    let id = things.resolve(&doc, by_id(&doc, "p3")).unwrap();
    assert_eq!(things.resolve(&doc, id), Some(id));
    assert_eq!(things.resolve_or_fail(&doc, id), Ok(id));
}

#[test]
fn node_outside_any_thing_resolves_to_nothing() {
    let doc = page(LISTING, LISTING_URL);
    let mut things = Things::new();
    let container = by_id(&doc, "siteTable");
    assert_eq!(things.resolve(&doc, container), None);
    assert_eq!(
        things.resolve_or_fail(&doc, container),
        Err(ThingError::Construction { node: container })
    );
    assert!(things.is_empty());
}

#[test]
fn classification_follows_marker_classes() {
    let doc = page(THREAD, THREAD_URL);
    let mut things = Things::new();
    let post = things.resolve(&doc, by_id(&doc, "p1")).unwrap();
    let comment = things.resolve(&doc, by_id(&doc, "c4")).unwrap();
    assert_eq!(things.get(&doc, post).unwrap().kind(), ThingKind::Post);
    assert_eq!(things.get(&doc, comment).unwrap().kind(), ThingKind::Comment);
}

#[test]
fn find_things_includes_the_container_itself() {
    let doc = page(THREAD, THREAD_URL);
    let mut things = Things::new();
    let found = things.find_things(&doc, by_id(&doc, "c1"));
    let elements: Vec<_> = found
        .iter()
        .map(|id| things.get(&doc, *id).unwrap().element())
        .collect();
    assert_eq!(ids(&doc, elements), ["c1", "c2", "c3", "c4"]);
}

#[test]
fn listing_order_and_container() {
    let doc = page(LISTING, LISTING_URL);
    let mut things = Things::new();
    let all = things.all(&doc);
    let elements: Vec<_> = all
        .iter()
        .map(|id| things.get(&doc, *id).unwrap().element())
        .collect();
    assert_eq!(ids(&doc, elements), ["p1", "p2", "p3", "p4", "p5"]);
    let body = doc.body().unwrap();
    assert_eq!(
        Things::things_container(&doc, body),
        Some(by_id(&doc, "siteTable"))
    );
}

#[test]
fn get_next_skips_filtered_things() {
    let mut doc = page(LISTING, LISTING_URL);
    let mut things = Things::new();
    let all = things.all(&doc);
    things
        .set_filter(&mut doc, all[1], Some(Rc::new("nsfw") as FilterPayload))
        .unwrap();
    assert!(doc.has_class(by_id(&doc, "p2"), "RESFiltered"));

    let first = things.get(&doc, all[0]).unwrap();
    assert_eq!(first.get_next(Direction::Down, &all, None), Some(all[2]));
    assert_eq!(first.get_next(Direction::Up, &all, None), None);
    assert_eq!(
        first.get_next(Direction::Down, &all, Some(ThingKind::Comment)),
        None
    );
    let last = things.get(&doc, all[4]).unwrap();
    assert_eq!(last.get_next(Direction::Up, &all, None), Some(all[3]));

    // Not part of the collection: nothing to step from.
    assert_eq!(first.get_next(Direction::Down, &all[1..], None), None);

    let filtered = things.get(&doc, all[1]).unwrap();
    assert!(!filtered.is_visible());
    assert!(filtered.filter().is_some());
    assert_eq!(things.closest_visible(&doc, all[1], true), Some(all[2]));

    things.set_filter(&mut doc, all[1], None).unwrap();
    assert!(!doc.has_class(by_id(&doc, "p2"), "RESFiltered"));
    assert_eq!(things.closest_visible(&doc, all[1], true), Some(all[1]));
}

#[test]
fn prune_reclaims_detached_things() {
    let mut doc = page(LISTING, LISTING_URL);
    let mut things = Things::new();
    let all = things.all(&doc);
    let p4 = by_id(&doc, "p4");
    doc.remove(p4).unwrap();
    assert_eq!(things.prune(&doc), 1);
    assert_eq!(things.len(), 4);
    assert_eq!(things.resolve(&doc, all[3]), None);
    assert!(things.get(&doc, all[3]).is_none());

    // Re-inserted, the element is wrapped afresh.
    doc.append_child(by_id(&doc, "siteTable"), p4).unwrap();
    let fresh = things.resolve(&doc, p4).unwrap();
    assert_ne!(fresh, all[3]);
}

#[test]
fn empty_document_has_no_things() {
    let doc = Document::new();
    let mut things = Things::new();
    assert!(things.all(&doc).is_empty());
    assert_eq!(things.resolve(&doc, Document::ROOT), None);
}
