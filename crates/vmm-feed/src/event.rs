//! Typed stream events.

/// One decoded frame of a subscription.
///
/// The first frame after (re)subscribing is a snapshot; later frames are
/// updates. Setters treat both the same way, the distinction is kept for
/// logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<T> {
    Snapshot(Vec<T>),
    Update(Vec<T>),
}

impl<T> StreamEvent<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Update(_) => "update",
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Snapshot(items) | Self::Update(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Snapshot(items) | Self::Update(items) => items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> StreamEvent<U> {
        match self {
            Self::Snapshot(items) => StreamEvent::Snapshot(items.into_iter().map(f).collect()),
            Self::Update(items) => StreamEvent::Update(items.into_iter().map(f).collect()),
        }
    }
}
