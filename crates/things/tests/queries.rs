use html_test_support::by_id;
use html_test_support::fixtures::{
    GENERIC_ROWS, LISTING, LISTING_URL, SEARCH, SEARCH_URL, THREAD, THREAD_URL,
};
use html_test_support::page;
use std::rc::Rc;
use things::{Direction, FilterPayload, Post, ThingId, ThingKind, Things, Visibility};

fn post<'a>(doc: &'a html::Document, things: &'a Things, id: ThingId) -> Post<'a> {
    things.get(doc, id).and_then(|t| t.as_post()).unwrap()
}

#[test]
fn listing_post_queries() {
    let doc = page(LISTING, LISTING_URL);
    let mut things = Things::new();
    let all = things.all(&doc);
    let p1 = post(&doc, &things, all[0]);
    assert!(p1.is_self_post());
    assert_eq!(p1.score(), 120);
    assert_eq!(p1.title(), "Hello from Rust");
    assert_eq!(p1.flair_text().as_deref(), Some("Discussion"));
    assert_eq!(p1.subreddit(), Some("rust"));
    assert_eq!(p1.domain(), "self.rust");
    assert_eq!(p1.comment_count(), 12);
    assert_eq!(p1.rank(), Some(1));
    assert_eq!(p1.author().as_deref(), Some("ferris"));
    assert_eq!(
        p1.post_url().as_deref(),
        Some("https://www.reddit.com/r/rust/comments/p1/hello/")
    );
    assert!(p1.is_unvoted());
    assert!(!p1.is_selected());
    assert_eq!(p1.user_flair_text().as_deref(), Some("crab"));
    assert_eq!(
        p1.title_url().as_deref(),
        Some("https://www.reddit.com/r/rust/comments/p1/hello/")
    );
    let rank = p1.rank_element().unwrap();
    assert_eq!(doc.text_content(rank), "1");

    let p2 = post(&doc, &things, all[1]);
    assert!(p2.is_link_post());
    assert!(p2.is_nsfw());
    assert_eq!(p2.score(), 57);
    assert_eq!(p2.subreddit(), Some("programming"));
    assert_eq!(p2.domain(), "example.com");
    assert_eq!(p2.domain_url(), "https://www.reddit.com/domain/example.com/");
    assert_eq!(p2.author().as_deref(), Some("quinn"));
    assert_eq!(
        p2.thumbnail_url().as_deref(),
        Some("https://b.thumbs.example/p2.jpg")
    );
    assert_eq!(p2.all_score_elements().len(), 1);
    assert!(p2.is_upvoted());

    let p3 = post(&doc, &things, all[2]);
    assert!(p3.is_spoiler() && p3.is_locked() && p3.is_crosspost());
    assert!(!p3.is_nsfw());
    assert_eq!(p3.comment_count(), 41);
    assert_eq!(p3.flair_text().as_deref(), Some("Meta"));
    assert_eq!(p3.rank_element(), None);

    let p4 = post(&doc, &things, all[3]);
    assert_eq!(p4.score(), 0);
    assert_eq!(p4.comment_count(), 0);
    assert_eq!(p4.flair_text(), None);

    let p5 = post(&doc, &things, all[4]);
    assert_eq!(p5.domain(), "docs.rs");
    assert_eq!(p5.domain_url(), "/domain/docs.rs/");
}

#[test]
fn subreddit_falls_back_to_the_page() {
    let doc = page(
        r#"<body><div class="linklisting"><div class="thing link" id="bare"><div class="entry"></div></div></div></body>"#,
        "https://www.reddit.com/r/learnrust/new/",
    );
    let mut things = Things::new();
    let id = things.resolve(&doc, by_id(&doc, "bare")).unwrap();
    let post = things.get(&doc, id).unwrap().as_post().unwrap();
    assert_eq!(post.subreddit(), Some("learnrust"));
    assert_eq!(post.domain(), "self.learnrust");
}

#[test]
fn search_rows_use_the_compact_layout() {
    let doc = page(SEARCH, SEARCH_URL);
    let mut things = Things::new();
    let all = things.all(&doc);
    assert_eq!(all.len(), 2);
    let body = doc.body().unwrap();
    assert_eq!(Things::things_container(&doc, body), Some(by_id(&doc, "posts")));

    let s1 = things.get(&doc, all[0]).unwrap().as_post().unwrap();
    assert_ne!(s1.entry(), s1.element());
    assert!(doc.has_class(s1.entry(), "search-result-body"));
    assert_eq!(s1.title(), "Rust in production");
    assert_eq!(s1.score(), 42);
    assert_eq!(s1.author().as_deref(), Some("carol"));
    assert_eq!(s1.subreddit(), Some("rust"));
    assert!(s1.is_nsfw() && !s1.is_spoiler() && !s1.is_locked());
    assert!(s1.is_link_post());
    assert_eq!(
        s1.comments_url().as_deref(),
        Some("https://www.reddit.com/r/rust/comments/s1/x/")
    );

    let s2 = things.get(&doc, all[1]).unwrap().as_post().unwrap();
    assert!(s2.is_self_post());
    assert!(s2.is_spoiler() && s2.is_locked());
    assert_eq!(s2.subreddit(), Some("learnrust"));
}

#[test]
fn generic_rows_have_no_specialisation() {
    let doc = page(GENERIC_ROWS, LISTING_URL);
    let mut things = Things::new();
    let found = things.find_things(&doc, by_id(&doc, "siteTable"));
    assert_eq!(found.len(), 2);
    for id in found {
        let thing = things.get(&doc, id).unwrap();
        assert_eq!(thing.kind(), ThingKind::Generic);
        assert!(thing.as_post().is_none() && thing.as_comment().is_none());
        assert!(thing.is_visible());
    }
}

#[test]
fn comment_tree_links_are_inverse() {
    let doc = page(THREAD, THREAD_URL);
    let mut things = Things::new();
    let body = doc.body().unwrap();
    let comments: Vec<_> = things
        .find_things(&doc, body)
        .into_iter()
        .filter(|id| things.get(&doc, *id).unwrap().kind() == ThingKind::Comment)
        .collect();
    assert_eq!(comments.len(), 5);

    for id in &comments {
        let c = things.get(&doc, *id).unwrap().as_comment().unwrap();
        if let Some(parent) = c.parent() {
            assert!(parent.child_ids().contains(id));
        }
        for child in c.children() {
            assert_eq!(child.parent_id(), Some(*id));
        }
    }

    let c1 = things.get(&doc, comments[0]).unwrap().as_comment().unwrap();
    assert!(c1.is_top_level());
    assert_eq!(c1.child_ids(), [comments[1], comments[3]]);
    assert!(c1.permalink().is_some() && c1.toggle_element().is_some());
    assert_eq!(c1.score(), 5);

    let c2 = things.get(&doc, comments[1]).unwrap().as_comment().unwrap();
    assert_eq!(c2.score(), -2);
    let c4 = things.get(&doc, comments[3]).unwrap();
    assert!(c4.is_deleted());

    let c5 = things.get(&doc, comments[4]).unwrap().as_comment().unwrap();
    assert!(c5.is_collapsed());
    assert_eq!(c5.number_of_children(), 2);
    // Collapsed, but its own row still shows.
    assert!(c5.is_visible() && !c5.is_content_visible());
}

#[test]
fn filtered_comment_with_visible_child_stays_visible() {
    let mut doc = page(THREAD, THREAD_URL);
    let mut things = Things::new();
    let c2 = things.resolve(&doc, by_id(&doc, "c2")).unwrap();
    let c3 = things.resolve(&doc, by_id(&doc, "c3")).unwrap();

    things
        .set_filter(&mut doc, c2, Some(Rc::new(()) as FilterPayload))
        .unwrap();
    things.invalidate_child_visibility(c2);
    things.flush_child_visibility(&mut doc);

    assert!(doc.has_class(by_id(&doc, "c2"), "res-thing-has-visible-child"));
    let comment = things.get(&doc, c2).unwrap().as_comment().unwrap();
    assert!(!comment.is_filtered());
    assert!(comment.is_filtered_with(false));
    assert!(comment.is_visible());
    assert!(!comment.is_content_visible());
    assert!(things.get(&doc, c3).unwrap().is_visible());

    // Filtering the only child closes the parent.
    things
        .set_filter(&mut doc, c3, Some(Rc::new(()) as FilterPayload))
        .unwrap();
    assert!(things.has_stale_child_visibility());
    assert_eq!(things.flush_child_visibility(&mut doc), 2);
    let comment = things.get(&doc, c2).unwrap();
    assert!(comment.is_filtered() && !comment.is_visible());
    assert!(!things.get(&doc, c3).unwrap().is_visible());
}

#[test]
fn filtered_comment_hiding_its_children_stays_hidden() {
    let mut doc = page(THREAD, THREAD_URL);
    let mut things = Things::new();
    let c2 = things.resolve(&doc, by_id(&doc, "c2")).unwrap();
    let c3 = things.resolve(&doc, by_id(&doc, "c3")).unwrap();

    doc.add_class(by_id(&doc, "c2"), "res-children-hidden");
    things
        .set_filter(&mut doc, c2, Some(Rc::new(()) as FilterPayload))
        .unwrap();
    things.invalidate_child_visibility(c2);
    things.flush_child_visibility(&mut doc);

    assert!(!doc.has_class(by_id(&doc, "c2"), "res-thing-has-visible-child"));
    let comment = things.get(&doc, c2).unwrap();
    assert!(comment.is_filtered() && !comment.is_visible());
    let reply = things.get(&doc, c3).unwrap();
    assert!(!reply.is_filtered() && !reply.is_visible());

    // Showing the children again reopens the parent.
    doc.remove_class(by_id(&doc, "c2"), "res-children-hidden");
    things.invalidate_child_visibility(c2);
    things.flush_child_visibility(&mut doc);
    assert!(things.get(&doc, c2).unwrap().is_visible());
    assert!(things.get(&doc, c3).unwrap().is_visible());
}

#[test]
fn comment_siblings_step_over_hidden_ones() {
    let mut doc = page(THREAD, THREAD_URL);
    let mut things = Things::new();
    let c2 = things.resolve(&doc, by_id(&doc, "c2")).unwrap();
    let c4 = things.resolve(&doc, by_id(&doc, "c4")).unwrap();
    assert_eq!(things.next_sibling(&doc, c2, Direction::Down), Some(c4));
    assert_eq!(things.next_sibling(&doc, c4, Direction::Up), Some(c2));
    assert_eq!(things.next_sibling(&doc, c4, Direction::Down), None);

    doc.add_class(by_id(&doc, "c4"), "RESFiltered");
    assert_eq!(things.next_sibling(&doc, c2, Direction::Down), None);
}
