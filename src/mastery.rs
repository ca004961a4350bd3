//! Mastery tiers derived from an item's answer history.

use crate::item::{QuizItem, Statistics};

/// Streak length an item needs before it can count as strong.
const STRONG_STREAK: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasteryTier {
    Unsolved,
    Weak,
    Moderate,
    Strong,
}

impl MasteryTier {
    /// Canonical order. Weighted draws walk tiers in this order, so ties
    /// resolve toward the earlier tier.
    pub const ALL: [MasteryTier; 4] = [
        MasteryTier::Unsolved,
        MasteryTier::Weak,
        MasteryTier::Moderate,
        MasteryTier::Strong,
    ];

    /// Relative draw weight of the tier. Only compared between tiers,
    /// never scaled by bucket size.
    pub fn weight(self) -> u32 {
        match self {
            MasteryTier::Unsolved => 50,
            MasteryTier::Weak => 35,
            MasteryTier::Moderate => 10,
            MasteryTier::Strong => 5,
        }
    }

    pub fn index(self) -> usize {
        match self {
            MasteryTier::Unsolved => 0,
            MasteryTier::Weak => 1,
            MasteryTier::Moderate => 2,
            MasteryTier::Strong => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MasteryTier::Unsolved => "unsolved",
            MasteryTier::Weak => "weak",
            MasteryTier::Moderate => "moderate",
            MasteryTier::Strong => "strong",
        }
    }
}

impl std::fmt::Display for MasteryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn classify(item: &QuizItem) -> MasteryTier {
    classify_stats(&item.stats)
}

/// First matching rule wins. Inconsistent statistics (more correct answers
/// than submissions) classify as unsolved.
pub fn classify_stats(stats: &Statistics) -> MasteryTier {
    if stats.times_solved == 0 || stats.times_correct > stats.times_solved {
        return MasteryTier::Unsolved;
    }
    if stats.current_streak == 0 {
        return MasteryTier::Weak;
    }
    // accuracy below 10%
    let inaccurate = 10 * u64::from(stats.times_correct) < u64::from(stats.times_solved);
    if stats.current_streak < STRONG_STREAK || inaccurate {
        return MasteryTier::Moderate;
    }
    MasteryTier::Strong
}

/// Number of items per tier, indexed by `MasteryTier::index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts([usize; 4]);

impl TierCounts {
    pub fn of(items: &[QuizItem]) -> TierCounts {
        let mut counts = [0usize; 4];
        for item in items {
            counts[classify(item).index()] += 1;
        }
        TierCounts(counts)
    }

    pub fn get(&self, tier: MasteryTier) -> usize {
        self.0[tier.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}
