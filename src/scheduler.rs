//! Question selection.
//!
//! The weighted scheduler works in passes: at the start of a pass every item
//! is classified into a mastery tier and each tier's items are shuffled into
//! a bucket. Draws pick a tier by weight among the tiers that still have
//! unread items, then take that bucket's next item. A pass ends once every
//! bucket is exhausted, so each item is drawn exactly once per pass while
//! weak items tend to come up early.
//!
//! The uniform scheduler ignores mastery and draws with replacement.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::SchedulerError;
use crate::item::QuizItem;
use crate::mastery::{self, MasteryTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Weighted,
    Uniform,
}

/// Shuffled items of one tier with a read cursor.
#[derive(Debug, Default)]
struct Bucket {
    items: Vec<QuizItem>,
    cursor: usize,
}

impl Bucket {
    fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }

    fn take(&mut self) -> Option<&QuizItem> {
        let item = self.items.get(self.cursor)?;
        self.cursor += 1;
        Some(item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Drawing,
    PassComplete,
}

/// Picks a tier for the draw value `r`, which must lie in
/// `[0, sum of candidate weights)`. Candidates are walked in canonical tier
/// order; the first tier whose cumulative weight exceeds `r` wins.
pub fn select_tier(candidates: &[MasteryTier], r: u32) -> Option<MasteryTier> {
    let mut remainder = i64::from(r);
    for tier in MasteryTier::ALL {
        if !candidates.contains(&tier) {
            continue;
        }
        remainder -= i64::from(tier.weight());
        if remainder < 0 {
            return Some(tier);
        }
    }
    None
}

pub struct WeightedScheduler<R> {
    pool: Vec<QuizItem>,
    buckets: [Bucket; 4],
    state: PassState,
    passes: u64,
    rng: R,
}

impl<R: Rng> WeightedScheduler<R> {
    pub fn new(pool: Vec<QuizItem>, rng: R) -> Result<Self, SchedulerError> {
        if pool.is_empty() {
            return Err(SchedulerError::EmptyPool);
        }
        let mut scheduler = WeightedScheduler {
            pool,
            buckets: Default::default(),
            state: PassState::PassComplete,
            passes: 0,
            rng,
        };
        scheduler.start_pass()?;
        Ok(scheduler)
    }

    /// Re-derives every bucket from the current pool snapshot.
    fn start_pass(&mut self) -> Result<(), SchedulerError> {
        if self.pool.is_empty() {
            return Err(SchedulerError::EmptyPool);
        }

        let mut buckets: [Bucket; 4] = Default::default();
        for item in &self.pool {
            buckets[mastery::classify(item).index()]
                .items
                .push(item.clone());
        }
        for bucket in &mut buckets {
            bucket.items.shuffle(&mut self.rng);
        }

        self.buckets = buckets;
        self.state = PassState::Drawing;
        self.passes += 1;
        debug!(
            "pass {} started: {} unsolved, {} weak, {} moderate, {} strong",
            self.passes,
            self.buckets[0].items.len(),
            self.buckets[1].items.len(),
            self.buckets[2].items.len(),
            self.buckets[3].items.len(),
        );
        Ok(())
    }

    pub fn pick_next(&mut self) -> Result<&QuizItem, SchedulerError> {
        if self.state == PassState::PassComplete {
            self.start_pass()?;
        }

        let candidates: Vec<MasteryTier> = MasteryTier::ALL
            .into_iter()
            .filter(|t| !self.buckets[t.index()].is_exhausted())
            .collect();
        if candidates.is_empty() {
            return Err(SchedulerError::EmptyPool);
        }
        let total: u32 = candidates.iter().map(|t| t.weight()).sum();
        let r = self.rng.random_range(0..total);
        let tier = select_tier(&candidates, r).ok_or(SchedulerError::EmptyPool)?;

        // this draw takes the last unread item
        if self.remaining_in_pass() == 1 {
            self.state = PassState::PassComplete;
        }

        let item = self.buckets[tier.index()]
            .take()
            .ok_or(SchedulerError::EmptyPool)?;
        debug!("drew item {} from {tier} bucket (r = {r}/{total})", item.id);
        Ok(item)
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Passes started so far, including the current one.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Items left to draw before the current pass completes.
    pub fn remaining_in_pass(&self) -> usize {
        self.buckets.iter().map(Bucket::remaining).sum()
    }

    pub fn pool(&self) -> &[QuizItem] {
        &self.pool
    }

    /// Replaces the pool snapshot. Buckets of the running pass are frozen;
    /// the new snapshot is classified when the next pass starts.
    pub fn replace_pool(&mut self, pool: Vec<QuizItem>) {
        self.pool = pool;
    }

    /// Replaces the snapshot entry with the same id, if any.
    pub fn replace_item(&mut self, item: QuizItem) -> bool {
        match self.pool.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }
}

pub struct UniformScheduler<R> {
    pool: Vec<QuizItem>,
    rng: R,
}

impl<R: Rng> UniformScheduler<R> {
    pub fn new(pool: Vec<QuizItem>, rng: R) -> Result<Self, SchedulerError> {
        if pool.is_empty() {
            return Err(SchedulerError::EmptyPool);
        }
        Ok(UniformScheduler { pool, rng })
    }

    pub fn pick_next(&mut self) -> Result<&QuizItem, SchedulerError> {
        if self.pool.is_empty() {
            return Err(SchedulerError::EmptyPool);
        }
        let i = self.rng.random_range(0..self.pool.len());
        Ok(&self.pool[i])
    }

    pub fn pool(&self) -> &[QuizItem] {
        &self.pool
    }

    pub fn replace_pool(&mut self, pool: Vec<QuizItem>) {
        self.pool = pool;
    }

    pub fn replace_item(&mut self, item: QuizItem) -> bool {
        match self.pool.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }
}

/// One of the two selection strategies, fixed for the life of a session.
pub enum Scheduler<R> {
    Uniform(UniformScheduler<R>),
    Weighted(WeightedScheduler<R>),
}

impl<R: Rng> Scheduler<R> {
    pub fn new(mode: Mode, pool: Vec<QuizItem>, rng: R) -> Result<Self, SchedulerError> {
        Ok(match mode {
            Mode::Uniform => Scheduler::Uniform(UniformScheduler::new(pool, rng)?),
            Mode::Weighted => Scheduler::Weighted(WeightedScheduler::new(pool, rng)?),
        })
    }

    pub fn mode(&self) -> Mode {
        match self {
            Scheduler::Uniform(_) => Mode::Uniform,
            Scheduler::Weighted(_) => Mode::Weighted,
        }
    }

    pub fn pick_next(&mut self) -> Result<&QuizItem, SchedulerError> {
        match self {
            Scheduler::Uniform(s) => s.pick_next(),
            Scheduler::Weighted(s) => s.pick_next(),
        }
    }

    /// True when the next draw starts a new pass. Always false for the
    /// uniform scheduler, which has no passes.
    pub fn pass_complete(&self) -> bool {
        match self {
            Scheduler::Uniform(_) => false,
            Scheduler::Weighted(s) => s.state() == PassState::PassComplete,
        }
    }

    pub fn pool(&self) -> &[QuizItem] {
        match self {
            Scheduler::Uniform(s) => s.pool(),
            Scheduler::Weighted(s) => s.pool(),
        }
    }

    pub fn replace_pool(&mut self, pool: Vec<QuizItem>) {
        match self {
            Scheduler::Uniform(s) => s.replace_pool(pool),
            Scheduler::Weighted(s) => s.replace_pool(pool),
        }
    }

    pub fn replace_item(&mut self, item: QuizItem) -> bool {
        match self {
            Scheduler::Uniform(s) => s.replace_item(item),
            Scheduler::Weighted(s) => s.replace_item(item),
        }
    }
}
