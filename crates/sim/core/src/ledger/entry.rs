//! Ledger entry types.

use crate::Frame;

use super::modifier::Modifier;

/// Labels attached to an entry for group queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for tag in tags {
            set.insert(tag.into());
        }
        set
    }

    pub fn insert(&mut self, tag: String) {
        if !self.contains(&tag) {
            self.0.push(tag);
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Optional attributes shared by timed entries and stacks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuffOptions {
    /// Reapplying with the same `(modifier, source)` refreshes in place.
    pub source: Option<String>,
    pub tags: TagSet,
    /// Keeps the entry alive for this many more shots after its timer runs out.
    pub shot_life: u32,
    pub remove_on_reload: bool,
    /// Cascade-removed when this entry is cleansed.
    pub linked_tag: Option<String>,
}

impl BuffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn shot_life(mut self, shots: u32) -> Self {
        self.shot_life = shots;
        self
    }

    pub fn remove_on_reload(mut self, remove: bool) -> Self {
        self.remove_on_reload = remove;
        self
    }

    pub fn linked_tag(mut self, tag: impl Into<String>) -> Self {
        self.linked_tag = Some(tag.into());
        self
    }
}

/// Fields common to [`BuffEntry`] and [`StackEntry`].
#[derive(Clone, Debug, PartialEq)]
pub struct Lifetime {
    pub expires_at: Frame,
    pub shot_life: u32,
    pub tags: TagSet,
    pub remove_on_reload: bool,
    pub linked_tag: Option<String>,
    /// Frame of the latest application; orders newest-first cleansing.
    pub created: Frame,
    /// Tie-breaker for entries created in the same frame.
    pub seq: u64,
}

impl Lifetime {
    pub(super) fn new(now: Frame, duration: Frame, opts: &BuffOptions, seq: u64) -> Self {
        Self {
            expires_at: now + duration,
            shot_life: opts.shot_life,
            tags: opts.tags.clone(),
            remove_on_reload: opts.remove_on_reload,
            linked_tag: opts.linked_tag.clone(),
            created: now,
            seq,
        }
    }

    /// Alive while the timer has not passed or shots remain.
    pub fn is_alive(&self, now: Frame) -> bool {
        self.expires_at >= now || self.shot_life > 0
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub(super) fn recency(&self) -> (Frame, u64) {
        (self.created, self.seq)
    }
}

/// A timed modifier.
#[derive(Clone, Debug, PartialEq)]
pub struct BuffEntry {
    pub modifier: Modifier,
    pub value: f64,
    pub source: Option<String>,
    pub life: Lifetime,
}

/// A named, capped counter contributing `unit_value × count`.
#[derive(Clone, Debug, PartialEq)]
pub struct StackEntry {
    pub name: String,
    pub modifier: Modifier,
    pub unit_value: f64,
    pub count: u32,
    pub max_count: u32,
    pub life: Lifetime,
}

impl StackEntry {
    pub fn contribution(&self) -> f64 {
        self.unit_value * f64::from(self.count)
    }
}
