//! Timed modifiers and stacking counters.
//!
//! Every combatant owns a [`BuffLedger`], and the simulation owns one more for
//! the shared enemy so that debuffs from several allies accumulate in one
//! place.
//!
//! # Expiry
//!
//! An entry is alive at frame `now` while `expires_at >= now` **or** it still
//! has shot life left. Expired entries are evicted lazily by the reading
//! operations ([`BuffLedger::total_value`], [`BuffLedger::stack_count`],
//! ...), so the number of stored entries is only meaningful right after a
//! query.
mod entry;
mod modifier;

pub use entry::{BuffEntry, BuffOptions, Lifetime, StackEntry, TagSet};
pub use modifier::Modifier;

use crate::Frame;

/// Tag that marks immunity entries.
pub const IMMUNITY_TAG: &str = "immunity";

/// Tag that suspends a combatant's weapon.
pub const STUN_TAG: &str = "stun";

#[derive(Clone, Debug, Default)]
pub struct BuffLedger {
    entries: Vec<BuffEntry>,
    stacks: Vec<StackEntry>,
    next_seq: u64,
}

impl BuffLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Adds a timed modifier, or refreshes the existing entry with the same
    /// `(modifier, source)` when a source is given.
    pub fn add_modifier(
        &mut self,
        modifier: Modifier,
        value: f64,
        duration: Frame,
        now: Frame,
        opts: BuffOptions,
    ) {
        let seq = self.bump_seq();
        let life = Lifetime::new(now, duration, &opts, seq);

        let existing = opts.source.as_deref().and_then(|source| {
            self.entries
                .iter_mut()
                .find(|e| e.modifier == modifier && e.source.as_deref() == Some(source))
        });
        if let Some(existing) = existing {
            existing.value = value;
            existing.life = life;
            return;
        }

        self.entries.push(BuffEntry {
            modifier,
            value,
            source: opts.source,
            life,
        });
    }

    /// Adds `amount` stacks to the named counter, clamped to its max, and
    /// refreshes expiry, unit value and attributes. Returns the new count.
    ///
    /// The first application fixes the cap: `max_count` is only read when the
    /// counter is created.
    #[allow(clippy::too_many_arguments)]
    pub fn add_or_increment_stack(
        &mut self,
        name: &str,
        modifier: Modifier,
        unit_value: f64,
        duration: Frame,
        now: Frame,
        max_count: u32,
        amount: u32,
        opts: BuffOptions,
    ) -> u32 {
        let seq = self.bump_seq();
        let life = Lifetime::new(now, duration, &opts, seq);

        if let Some(stack) = self.stacks.iter_mut().find(|s| s.name == name) {
            stack.count = stack.count.saturating_add(amount).min(stack.max_count);
            stack.unit_value = unit_value;
            stack.life = life;
            return stack.count;
        }

        let count = amount.min(max_count);
        self.stacks.push(StackEntry {
            name: name.to_string(),
            modifier,
            unit_value,
            count,
            max_count,
            life,
        });
        count
    }

    /// Sets a counter directly. Creates a non-expiring counter stack if
    /// none exists.
    pub fn set_stack_count(&mut self, name: &str, count: u32, max_count: u32) {
        if let Some(stack) = self.stacks.iter_mut().find(|s| s.name == name) {
            stack.count = count.min(stack.max_count);
            return;
        }
        let seq = self.bump_seq();
        let mut life = Lifetime::new(0, 0, &BuffOptions::default(), seq);
        life.expires_at = Frame::MAX;
        self.stacks.push(StackEntry {
            name: name.to_string(),
            modifier: Modifier::Counter,
            unit_value: 0.0,
            count: count.min(max_count),
            max_count,
            life,
        });
    }

    /// Lowers the count of the first stack carrying `tag`, keeping the
    /// (now possibly empty) stack in place. Returns whether one matched.
    pub fn decrease_stack_count_by_tag(&mut self, tag: &str, amount: u32) -> bool {
        match self.stacks.iter_mut().find(|s| s.life.has_tag(tag)) {
            Some(stack) => {
                stack.count = stack.count.saturating_sub(amount);
                true
            }
            None => false,
        }
    }

    pub fn remove_stack(&mut self, name: &str) {
        self.stacks.retain(|s| s.name != name);
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Sum of every live entry and stack contributing to `modifier`.
    pub fn total_value(&mut self, modifier: &Modifier, now: Frame) -> f64 {
        self.evict_expired(now);
        let entries: f64 = self
            .entries
            .iter()
            .filter(|e| &e.modifier == modifier)
            .map(|e| e.value)
            .sum();
        let stacks: f64 = self
            .stacks
            .iter()
            .filter(|s| &s.modifier == modifier)
            .map(StackEntry::contribution)
            .sum();
        entries + stacks
    }

    /// Individual live values for `modifier`, one per entry and one per stack
    /// unit. Used where each contribution is rounded separately.
    pub fn active_values(&mut self, modifier: &Modifier, now: Frame) -> Vec<f64> {
        self.evict_expired(now);
        let mut values: Vec<f64> = self
            .entries
            .iter()
            .filter(|e| &e.modifier == modifier)
            .map(|e| e.value)
            .collect();
        for stack in self.stacks.iter().filter(|s| &s.modifier == modifier) {
            values.extend(std::iter::repeat_n(stack.unit_value, stack.count as usize));
        }
        values
    }

    pub fn stack_count(&mut self, name: &str, now: Frame) -> u32 {
        self.evict_expired(now);
        self.stacks
            .iter()
            .find(|s| s.name == name)
            .map_or(0, |s| s.count)
    }

    /// Whether a live entry, or a live non-empty stack, carries `tag`.
    pub fn has_tag(&self, tag: &str, now: Frame) -> bool {
        self.entries
            .iter()
            .any(|e| e.life.is_alive(now) && e.life.has_tag(tag))
            || self
                .stacks
                .iter()
                .any(|s| s.count > 0 && s.life.is_alive(now) && s.life.has_tag(tag))
    }

    pub fn entries(&self) -> &[BuffEntry] {
        &self.entries
    }

    pub fn stacks(&self) -> &[StackEntry] {
        &self.stacks
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Drops every entry and stack that is no longer alive at `now`.
    pub fn evict_expired(&mut self, now: Frame) {
        self.entries.retain(|e| e.life.is_alive(now));
        self.stacks.retain(|s| s.life.is_alive(now));
    }

    /// Deletes everything carrying `tag`. Returns how many entries and stacks
    /// were removed.
    pub fn remove_by_tag(&mut self, tag: &str, now: Frame) -> usize {
        self.evict_expired(now);
        let before = self.len();
        self.entries.retain(|e| !e.life.has_tag(tag));
        self.stacks.retain(|s| !s.life.has_tag(tag));
        before - self.len()
    }

    /// Newest-first cleanse of up to `count` units carrying `tag`.
    ///
    /// A timed entry is one unit; a stack is `count` units, consumed by
    /// decrementing before the stack is deleted. Removing an entry or
    /// emptying a stack that has a linked tag also removes everything
    /// carrying that tag. Returns the units removed, `min(count, matching)`.
    pub fn remove_newest_by_tag_up_to(&mut self, tag: &str, count: u32, now: Frame) -> u32 {
        if count == 0 {
            return 0;
        }
        self.evict_expired(now);

        enum Slot {
            Entry(usize),
            Stack(usize),
        }

        let mut candidates: Vec<((Frame, u64), Slot)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.life.has_tag(tag))
            .map(|(i, e)| (e.life.recency(), Slot::Entry(i)))
            .chain(
                self.stacks
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.count > 0 && s.life.has_tag(tag))
                    .map(|(i, s)| (s.life.recency(), Slot::Stack(i))),
            )
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0));

        let mut removed = 0;
        let mut dead_entries = Vec::new();
        let mut dead_stacks = Vec::new();
        let mut cascades = Vec::new();

        for (_, slot) in candidates {
            if removed >= count {
                break;
            }
            match slot {
                Slot::Entry(i) => {
                    removed += 1;
                    dead_entries.push(i);
                    cascades.extend(self.entries[i].life.linked_tag.clone());
                }
                Slot::Stack(i) => {
                    let stack = &mut self.stacks[i];
                    let take = stack.count.min(count - removed);
                    stack.count -= take;
                    removed += take;
                    if stack.count == 0 {
                        dead_stacks.push(i);
                        cascades.extend(stack.life.linked_tag.clone());
                    }
                }
            }
        }

        remove_indices(&mut self.entries, dead_entries);
        remove_indices(&mut self.stacks, dead_stacks);
        for linked in cascades {
            self.remove_by_tag(&linked, now);
        }
        removed
    }

    /// Spends one immunity charge.
    ///
    /// A live stacked immunity loses one stack. Otherwise, a live timed
    /// immunity entry blocks without being consumed.
    pub fn consume_immunity_charge(&mut self, now: Frame) -> bool {
        if let Some(i) = self.stacks.iter().position(|s| {
            s.count > 0 && s.life.is_alive(now) && s.life.has_tag(IMMUNITY_TAG)
        }) {
            self.stacks[i].count -= 1;
            if self.stacks[i].count == 0 {
                self.stacks.remove(i);
            }
            return true;
        }
        self.entries
            .iter()
            .any(|e| e.life.is_alive(now) && e.life.has_tag(IMMUNITY_TAG))
    }

    /// Called once per shot fired by the owner.
    pub fn decrement_shot_life(&mut self) {
        for life in self
            .entries
            .iter_mut()
            .map(|e| &mut e.life)
            .chain(self.stacks.iter_mut().map(|s| &mut s.life))
        {
            life.shot_life = life.shot_life.saturating_sub(1);
        }
    }

    /// Deletes everything flagged to clear on reload.
    pub fn remove_reload_cleared(&mut self) {
        self.entries.retain(|e| !e.life.remove_on_reload);
        self.stacks.retain(|s| !s.life.remove_on_reload);
    }
}

/// Removes the given indices from `items`, highest first.
fn remove_indices<T>(items: &mut Vec<T>, mut indices: Vec<usize>) {
    indices.sort_unstable_by(|a, b| b.cmp(a));
    for i in indices {
        items.remove(i);
    }
}
