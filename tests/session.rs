use filters::{Collaborators, ExpandoInfo, ExpandoSource, ReadComments, VisitedLinks};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use html_test_support::fixtures::{LISTING, LISTING_URL, THREAD, THREAD_URL};
use html_test_support::{assert_outline, by_id, insert_markup};
use std::cell::RefCell;
use std::rc::Rc;
use things::{Thing, ThingKind};
use thingwatch::{AppError, PageConfig, PageReport, ThingReport, announce_page, open_page, run_page};

fn config(toml: &str) -> PageConfig {
    PageConfig::from_toml_str(toml).unwrap()
}

fn report_for<'a>(report: &'a PageReport, fullname: &str) -> &'a ThingReport {
    report
        .things
        .iter()
        .find(|t| t.fullname == fullname)
        .unwrap_or_else(|| panic!("no thing {fullname} in report"))
}

#[test]
fn listing_posts_are_filtered_by_the_configured_expression() {
    let config = config(
        r#"
        [filters.posts]
        combine = "any"
        cases = [{ case = "isNSFW" }, { case = "postType", criterion = "self" }]
        "#,
    );
    let report = run_page(LISTING, Some(LISTING_URL), &config).unwrap();
    assert_eq!(report.passes, 1);
    assert_eq!(report.turns, 5);
    assert_eq!(report.things.len(), 5);

    let p1 = report_for(&report, "t3_p1");
    assert_eq!(p1.kind, ThingKind::Post);
    assert!(!p1.visible);
    assert_eq!(p1.filter.as_deref(), Some("nsfw | type self"));
    assert!(!report_for(&report, "t3_p2").visible);
    for fullname in ["t3_p3", "t3_p4", "t3_p5"] {
        let post = report_for(&report, fullname);
        assert!(post.visible && post.filter.is_none(), "{fullname}");
    }

    let printed = report.to_string();
    assert!(printed.starts_with("5 thing(s), 1 pass(es), 5 turn(s)"));
    assert!(printed.contains("hidden by nsfw | type self"));
}

#[test]
fn comment_pages_announce_each_outer_listing() {
    let config = config(
        r#"
        groups_per_turn = 4
        [filters.comments]
        cases = [{ case = "isDeleted" }]
        "#,
    );
    let report = run_page(THREAD, Some(THREAD_URL), &config).unwrap();
    assert_eq!(report.passes, 2);
    assert_eq!(report.things.len(), 6);
    assert!(!report_for(&report, "t1_c4").visible);
    assert_eq!(report_for(&report, "t1_c4").filter.as_deref(), Some("deleted"));
    for fullname in ["t3_p1", "t1_c1", "t1_c2", "t1_c3", "t1_c5"] {
        assert!(report_for(&report, fullname).filter.is_none(), "{fullname}");
    }
}

struct Tracker;

impl ReadComments for Tracker {
    fn is_running(&self) -> bool {
        true
    }

    fn is_read(&self, thing: &Thing<'_>) -> bool {
        thing.fullname() == Some("t1_c2")
    }
}

#[test]
fn a_filtered_comment_with_a_visible_reply_stays_visible() {
    let config = config(
        r#"
        [filters.comments]
        cases = [{ case = "isRead" }]
        "#,
    );
    let collaborators = Collaborators {
        read_comments: Rc::new(Tracker),
        ..Collaborators::default()
    };
    let mut page = open_page(THREAD, Some(THREAD_URL), &config, &collaborators).unwrap();
    let passes = announce_page(&mut page).len();
    let turns = page.run_until_idle();
    let report = PageReport::collect(&mut page, passes, turns);

    let c2 = report_for(&report, "t1_c2");
    assert_eq!(c2.filter.as_deref(), Some("read"));
    assert!(c2.visible);
    assert!(page.doc.has_class(by_id(&page.doc, "c2"), "res-thing-has-visible-child"));
    assert!(report_for(&report, "t1_c3").visible);
}

struct History(&'static str);

impl VisitedLinks for History {
    fn is_visited(&self, url: &str) -> LocalBoxFuture<'static, bool> {
        let visited = url == self.0;
        async move { visited }.boxed_local()
    }
}

#[test]
fn asynchronous_verdicts_are_applied_once_resolved() {
    let config = config(
        r#"
        [filters.posts]
        cases = [{ case = "commentsOpened" }]
        "#,
    );
    let collaborators = Collaborators {
        visited: Rc::new(History("https://www.reddit.com/r/rust/comments/p1/hello/")),
        ..Collaborators::default()
    };
    let mut page = open_page(LISTING, Some(LISTING_URL), &config, &collaborators).unwrap();
    announce_page(&mut page);
    page.run_until_idle();
    let report = PageReport::collect(&mut page, 1, 0);
    assert_eq!(report_for(&report, "t3_p1").filter.as_deref(), Some("comments opened"));
    assert!(!report_for(&report, "t3_p1").visible);
    assert!(report_for(&report, "t3_p2").visible);
}

/// Reports an image on `p2` and remembers which things were asked about.
#[derive(Default)]
struct Media(RefCell<Vec<String>>);

impl ExpandoSource for Media {
    fn expandos(&self, thing: &Thing<'_>) -> Vec<ExpandoInfo> {
        let id = thing.document().attr(thing.element(), "id").unwrap_or_default();
        self.0.borrow_mut().push(id.to_string());
        if id == "p2" {
            vec![ExpandoInfo {
                ready: true,
                types: vec!["image".into()],
            }]
        } else {
            Vec::new()
        }
    }
}

#[test]
fn cheaper_asynchronous_cases_settle_before_slower_ones_run() {
    let config = config(
        r#"
        [filters.posts]
        combine = "any"
        cases = [{ case = "hasExpando" }, { case = "commentsOpened" }]
        "#,
    );
    let media = Rc::new(Media::default());
    let collaborators = Collaborators {
        visited: Rc::new(History("https://www.reddit.com/r/rust/comments/p1/hello/")),
        expandos: Rc::clone(&media) as Rc<dyn ExpandoSource>,
        ..Collaborators::default()
    };
    let mut page = open_page(LISTING, Some(LISTING_URL), &config, &collaborators).unwrap();
    announce_page(&mut page);
    page.run_until_idle();
    assert_eq!(page.futures_in_flight(), 0);
    let report = PageReport::collect(&mut page, 1, 0);

    let label = Some("expando | comments opened");
    assert_eq!(report_for(&report, "t3_p1").filter.as_deref(), label);
    assert_eq!(report_for(&report, "t3_p2").filter.as_deref(), label);
    assert!(report_for(&report, "t3_p3").visible);
    // `p1` was decided by its visited comments page alone.
    assert!(!media.0.borrow().iter().any(|id| id == "p1"));
    assert!(media.0.borrow().iter().any(|id| id == "p2"));
}

#[test]
fn comments_loaded_later_are_filtered_too() {
    let config = config(
        r#"
        [filters.comments]
        cases = [{ case = "isDeleted" }]
        "#,
    );
    let mut page = open_page(THREAD, Some(THREAD_URL), &config, &Collaborators::default()).unwrap();
    announce_page(&mut page);
    page.run_until_idle();

    let listing = by_id(&page.doc, "siteTable_comments");
    insert_markup(
        &mut page.doc,
        listing,
        r#"<div class="thing comment deleted" id="c9" data-fullname="t1_c9"><div class="entry"></div><div class="child"></div></div>"#,
    );
    page.run_until_idle();
    let report = PageReport::collect(&mut page, 2, 0);
    assert!(!report_for(&report, "t1_c9").visible);
    assert_outline(
        &page.doc,
        by_id(&page.doc, "c9"),
        &[
            r#"<div id="c9" class="thing comment deleted RESFiltered">"#,
            r#"  <div class="entry">"#,
            r#"  <div class="child">"#,
        ],
    );
}

#[test]
fn unknown_cases_fail_to_open() {
    let config = config(
        r#"
        [filters.posts]
        cases = [{ case = "isHaunted" }]
        "#,
    );
    let err = open_page(LISTING, Some(LISTING_URL), &config, &Collaborators::default())
        .err()
        .unwrap();
    assert!(matches!(err, AppError::Case(_)));
}
