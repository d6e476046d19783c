//! For/against tally of a debate.

use serde::Serialize;

use crate::models::{Comment, DebateStats, Stance};

/// Whether neutral comments enter the denominator of the for/against split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StancePolicy {
    /// Neutral comments are counted but kept out of the percentage base.
    #[default]
    ExcludeNeutral,
    /// Neutral is a third bucket with its own percentage.
    IncludeNeutral,
}

impl StancePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exclude" | "exclude_neutral" => Some(StancePolicy::ExcludeNeutral),
            "include" | "include_neutral" => Some(StancePolicy::IncludeNeutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StanceCounts {
    pub for_count: u32,
    pub against_count: u32,
    pub neutral_count: u32,
    pub total_count: u32,
}

impl StanceCounts {
    /// Counts stances of top-level comments. Replies never vote.
    pub fn from_comments(comments: &[Comment]) -> Self {
        comments
            .iter()
            .filter(|c| c.is_top_level())
            .fold(Self::default(), |mut counts, comment| {
                counts.total_count += 1;
                match comment.stance {
                    Some(Stance::For) => counts.for_count += 1,
                    Some(Stance::Against) => counts.against_count += 1,
                    Some(Stance::Neutral) => counts.neutral_count += 1,
                    None => {}
                }
                counts
            })
    }
}

pub fn tally(counts: StanceCounts, policy: StancePolicy) -> DebateStats {
    let base = match policy {
        StancePolicy::ExcludeNeutral => counts.for_count + counts.against_count,
        StancePolicy::IncludeNeutral => {
            counts.for_count + counts.against_count + counts.neutral_count
        }
    };

    DebateStats {
        for_count: counts.for_count,
        against_count: counts.against_count,
        neutral_count: counts.neutral_count,
        total_count: counts.total_count,
        for_percentage: percentage(counts.for_count, base),
        against_percentage: percentage(counts.against_count, base),
        neutral_percentage: match policy {
            StancePolicy::ExcludeNeutral => None,
            StancePolicy::IncludeNeutral => Some(percentage(counts.neutral_count, base)),
        },
    }
}

/// `part / base` as a percentage with one decimal, halves rounded up.
fn percentage(part: u32, base: u32) -> String {
    if base == 0 {
        return "0.0".to_string();
    }
    let (part, base) = (u64::from(part), u64::from(base));
    let tenths = (part * 1000 + base / 2) / base;
    format!("{}.{}", tenths / 10, tenths % 10)
}
