//! Captured page shapes, trimmed to the markup the thing queries look at.

pub const LISTING_URL: &str = "https://www.reddit.com/r/rust/";

/// Subreddit front page: five posts in `#siteTable`, ids `p1`..`p5`.
///
/// - `p1`: self post, every `data-*` attribute present.
/// - `p2`: NSFW link post; subreddit and domain come from links.
/// - `p3`: spoiler, locked crosspost with a flair label.
/// - `p4`: score shown as `•`, no comments button.
/// - `p5`: link post with only a `.domain` text span.
pub const LISTING: &str = r#"<!doctype html>
<html><head><title>rust</title></head>
<body>
<div class="content">
<div id="siteTable" class="sitetable linklisting">
  <div class="thing link self" id="p1" data-fullname="t3_p1" data-author="ferris" data-subreddit="rust" data-domain="self.rust" data-rank="1" data-url="/r/rust/comments/p1/hello/">
    <span class="rank">1</span>
    <div class="midcol unvoted"><div class="arrow up"></div><div class="score unvoted" title="120">120</div><div class="arrow down"></div></div>
    <div class="entry unvoted">
      <p class="title"><a class="title may-blank" href="/r/rust/comments/p1/hello/">Hello from Rust</a> <span class="linkflairlabel">Discussion</span></p>
      <p class="tagline">submitted <time datetime="2024-03-01T10:00:00+00:00">3 hours ago</time> by <a class="author" href="/user/ferris">ferris</a> <span class="flair">crab</span></p>
      <ul class="flat-list buttons"><li class="first"><a class="comments" href="/r/rust/comments/p1/hello/">12 comments</a></li></ul>
    </div>
  </div>
  <div class="thing link over18" id="p2" data-fullname="t3_p2" data-rank="2">
    <span class="rank">2</span>
    <div class="midcol likes"><div class="arrow upmod"></div><div class="score likes" title="57">57</div><div class="arrow down"></div></div>
    <a class="thumbnail may-blank" href="https://example.com/article"><img src="//b.thumbs.example/p2.jpg"></a>
    <div class="entry likes">
      <p class="title"><a class="title may-blank" href="https://example.com/article">An article</a> <span class="domain">(<a href="/domain/example.com/">example.com</a>)</span></p>
      <p class="tagline">submitted <time datetime="2024-03-01T09:00:00+00:00">4 hours ago</time> by <a class="author" href="https://www.reddit.com/user/quinn">quinn</a> to <a class="subreddit hover may-blank" href="https://www.reddit.com/r/programming/">r/programming</a></p>
      <ul class="flat-list buttons"><li class="first"><a class="comments" href="/r/programming/comments/p2/an_article/">3 comments</a></li></ul>
    </div>
  </div>
  <div class="thing link spoiler locked" id="p3" data-fullname="t3_p3" data-subreddit="rust" data-rank="3">
    <div class="midcol unvoted"><div class="arrow up"></div><div class="score unvoted">9</div><div class="arrow down"></div></div>
    <div class="entry unvoted">
      <p class="title"><a class="title" href="/r/rust/comments/p3/spoilers/">Spoilers ahead</a><span class="linkflairlabel">Meta</span></p>
      <span class="crosspost-badge">crosspost</span>
      <ul class="flat-list buttons"><li class="first"><a class="comments" data-text="41 comments" href="/r/rust/comments/p3/spoilers/"></a></li></ul>
    </div>
  </div>
  <div class="thing link" id="p4" data-fullname="t3_p4" data-subreddit="rust" data-rank="4">
    <div class="midcol unvoted"><div class="score unvoted">•</div></div>
    <div class="entry unvoted"><p class="title"><a class="title" href="https://crates.io/">crates.io</a></p></div>
  </div>
  <div class="thing link" id="p5" data-fullname="t3_p5" data-subreddit="rust" data-rank="5">
    <div class="midcol unvoted"><div class="score unvoted">1</div></div>
    <div class="entry unvoted"><p class="title"><a class="title" href="https://docs.rs/">docs</a> <span class="domain">( docs.rs )</span></p></div>
  </div>
</div>
</div>
</body></html>"#;

pub const THREAD_URL: &str = "https://www.reddit.com/r/rust/comments/p1/hello/";

/// Comments page for `p1`. Comment ids: `c1` (top, replies `c2` and `c4`),
/// `c2` (reply `c3`), `c5` (top, collapsed, with a `.numchildren` count).
/// The self-text expando of `p1` is empty.
pub const THREAD: &str = r##"<!doctype html>
<html><body>
<div class="content">
<div id="siteTable_t3_p1" class="sitetable linklisting">
  <div class="thing link self" id="p1" data-fullname="t3_p1" data-subreddit="rust">
    <div class="entry"><p class="title"><a class="title" href="/r/rust/comments/p1/hello/">Hello from Rust</a></p><div class="expando"></div></div>
  </div>
</div>
<div class="commentarea">
  <div id="siteTable_comments" class="sitetable nestedlisting">
    <div class="thing comment" id="c1" data-fullname="t1_c1" data-author="alice">
      <div class="entry"><p class="tagline"><a class="expand" href="#">[–]</a><a class="author" href="/user/alice">alice</a> <span class="score">5 points</span></p>
        <ul class="flat-list buttons"><li class="first"><a class="bylink" href="/r/rust/comments/p1/hello/c1/">permalink</a></li></ul></div>
      <div class="child"><div class="sitetable listing">
        <div class="thing comment" id="c2" data-fullname="t1_c2" data-author="bob">
          <div class="entry"><p class="tagline"><a class="author" href="/user/bob">bob</a> <span class="score">-2 points</span></p></div>
          <div class="child"><div class="sitetable listing">
            <div class="thing comment" id="c3" data-fullname="t1_c3"><div class="entry"></div><div class="child"></div></div>
          </div></div>
        </div>
        <div class="thing comment deleted" id="c4" data-fullname="t1_c4"><div class="entry"></div><div class="child"></div></div>
      </div></div>
    </div>
    <div class="thing comment collapsed" id="c5" data-fullname="t1_c5">
      <div class="entry"><p class="tagline"><a class="expand" href="#">[+]</a><span class="numchildren">(2 children)</span></p></div>
      <div class="child"></div>
    </div>
  </div>
</div>
</div>
</body></html>"##;

pub const SEARCH_URL: &str = "https://www.reddit.com/search?q=rust";

/// Search results: two compact rows `s1` (NSFW link) and `s2` (self post),
/// plus an earlier empty listing.
pub const SEARCH: &str = r#"<!doctype html>
<html><body>
<div class="search-result-listing" id="subreddits"></div>
<div class="search-result-listing" id="posts">
  <div class="search-result-group">
    <div class="search-result search-result-link has-thumbnail" id="s1" data-fullname="t3_s1">
      <a class="thumbnail" href="https://example.com/x"><img src="https://b.thumbs.example/s1.jpg"></a>
      <div class="search-result-body">
        <header class="search-result-header"><a class="search-title may-blank" href="https://example.com/x">Rust in production</a></header>
        <div class="search-result-meta"><span class="search-score">42 points</span>
          <a class="search-comments may-blank" href="/r/rust/comments/s1/x/">7 comments</a>
          <span class="search-author"><a class="author" href="/user/carol">carol</a></span>
          <a class="search-subreddit-link may-blank" href="/r/rust/">r/rust</a>
          <span class="nsfw-stamp">nsfw</span></div>
      </div>
    </div>
    <div class="search-result search-result-link linkflair-locked" id="s2" data-fullname="t3_s2">
      <div class="search-result-body">
        <header class="search-result-header"><a class="search-title self may-blank" href="/r/learnrust/comments/s2/help/">Borrow checker help</a></header>
        <div class="search-result-meta"><span class="search-score">3 points</span>
          <a class="search-subreddit-link" href="/r/learnrust/">r/learnrust</a>
          <span class="spoiler-stamp">spoiler</span></div>
      </div>
    </div>
  </div>
</div>
</body></html>"#;

/// Inbox row and a subreddit listing row: things that are neither posts nor
/// comments.
pub const GENERIC_ROWS: &str = r#"<body>
<div class="content"><div id="siteTable" class="sitetable">
  <div class="thing message" id="m1" data-fullname="t4_m1"><div class="entry"><p class="tagline"><a class="author" href="/user/dave">dave</a></p></div></div>
  <div class="thing subreddit" id="r1" data-fullname="t5_r1"><div class="entry"><p class="titlerow"><a class="title" href="/r/rust/">r/rust</a></p></div></div>
</div></div>
</body>"#;
