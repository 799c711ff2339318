/// Structural kind of a wrapped thing, decided once when the thing is first resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThingKind {
    Generic,
    Post,
    Comment,
}

/// Subscription key for thing watchers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatchKind {
    Post,
    Comment,
    Message,
    Subreddit,
    Any,
}

impl WatchKind {
    /// Concrete kinds, in table order. `Any` expands to all of these.
    pub const CONCRETE: [WatchKind; 4] = [
        WatchKind::Comment,
        WatchKind::Message,
        WatchKind::Post,
        WatchKind::Subreddit,
    ];
}

/// Kind of DOM container announced to the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    SiteTable,
    SelfText,
    NewComments,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [
        ContainerKind::SiteTable,
        ContainerKind::SelfText,
        ContainerKind::NewComments,
    ];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Down,
    Up,
}
