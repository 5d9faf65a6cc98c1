use crate::category::{Category, CategorySet};
use crate::verify::Counters;
use serde::Serialize;

/// Points awarded to a category whose checks all pass.
pub const MAX_POINTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub category: Category,
    pub enabled: bool,
    pub passed: u32,
    pub total: u32,
}

impl CategoryTally {
    pub fn new(category: Category, enabled: bool) -> Self {
        Self {
            category,
            enabled,
            passed: 0,
            total: 0,
        }
    }

    pub fn record(&mut self, counters: &Counters) {
        self.passed += counters.passed;
        self.total += counters.total();
    }

    pub fn failed(&self) -> u32 {
        self.total - self.passed
    }

    /// `5 * passed / total`, truncated. `None` when nothing was checked.
    pub fn points(&self) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        Some((MAX_POINTS as u64 * self.passed as u64 / self.total as u64) as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pass,
    Fail,
    Partial,
    NoTests,
}

/// Per-category tallies for a whole run, in run order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scorecard {
    pub categories: Vec<CategoryTally>,
}

impl Scorecard {
    pub fn new(enabled: CategorySet) -> Self {
        Self {
            categories: Category::ALL
                .iter()
                .map(|&c| CategoryTally::new(c, enabled.includes(c)))
                .collect(),
        }
    }

    pub fn tally(&self, category: Category) -> Option<&CategoryTally> {
        self.categories.iter().find(|t| t.category == category)
    }

    pub fn tally_mut(&mut self, category: Category) -> Option<&mut CategoryTally> {
        self.categories.iter_mut().find(|t| t.category == category)
    }

    /// Sum of category points; categories without data add nothing.
    pub fn total_points(&self) -> u32 {
        self.categories.iter().filter_map(|t| t.points()).sum()
    }

    pub fn max_points(&self) -> u32 {
        MAX_POINTS * self.categories.len() as u32
    }

    pub fn total_checks(&self) -> u32 {
        self.categories.iter().map(|t| t.total).sum()
    }

    pub fn total_passed(&self) -> u32 {
        self.categories.iter().map(|t| t.passed).sum()
    }

    pub fn all_enabled(&self) -> bool {
        self.categories.iter().all(|t| t.enabled)
    }

    pub fn status(&self) -> RunStatus {
        if self.total_checks() == 0 {
            RunStatus::NoTests
        } else if self.total_passed() < self.total_checks() {
            RunStatus::Fail
        } else if !self.all_enabled() {
            RunStatus::Partial
        } else {
            RunStatus::Pass
        }
    }
}
