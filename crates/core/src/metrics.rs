use crate::category::Category;
use crate::score::Scorecard;
use crate::verify::Counters;
use crate::RunObserver;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct RunMetrics {
    cases: AtomicU64,
    checks_passed: AtomicU64,
    checks_failed: AtomicU64,
    categories_completed: AtomicU64,
    final_points: AtomicU32,
    start_time: Instant,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            cases: AtomicU64::new(0),
            checks_passed: AtomicU64::new(0),
            checks_failed: AtomicU64::new(0),
            categories_completed: AtomicU64::new(0),
            final_points: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn reset(&self) {
        self.cases.store(0, Ordering::SeqCst);
        self.checks_passed.store(0, Ordering::SeqCst);
        self.checks_failed.store(0, Ordering::SeqCst);
        self.categories_completed.store(0, Ordering::SeqCst);
        self.final_points.store(0, Ordering::SeqCst);
    }

    pub fn get_cases(&self) -> u64 {
        self.cases.load(Ordering::SeqCst)
    }

    pub fn get_checks_passed(&self) -> u64 {
        self.checks_passed.load(Ordering::SeqCst)
    }

    pub fn get_checks_failed(&self) -> u64 {
        self.checks_failed.load(Ordering::SeqCst)
    }

    pub fn get_categories_completed(&self) -> u64 {
        self.categories_completed.load(Ordering::SeqCst)
    }

    pub fn get_final_points(&self) -> u32 {
        self.final_points.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl RunObserver for RunMetrics {
    fn on_run_start(&self) {
        self.reset();
    }

    fn on_case_end(&self, _category: Category, _case: usize, counters: &Counters) {
        self.cases.fetch_add(1, Ordering::SeqCst);
        self.checks_passed
            .fetch_add(counters.passed as u64, Ordering::SeqCst);
        self.checks_failed
            .fetch_add(counters.failed as u64, Ordering::SeqCst);
    }

    fn on_category_end(&self, _category: Category) {
        self.categories_completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_run_end(&self, scorecard: &Scorecard) {
        self.final_points
            .store(scorecard.total_points(), Ordering::SeqCst);
    }
}
