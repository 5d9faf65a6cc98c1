use crate::category::{Category, CategorySet};
use crate::model::{compute_expected, ExpectedValues};
use crate::routines::Diagnostics;
use crate::score::{RunStatus, Scorecard};
use crate::vector::TestVector;
use crate::verify::{bounded_format, Check, Counters, ReportBuffer, TestOutcome, Verifier};
use crate::{LabError, LabResult, Led, ReportSink, Routines, RunObserver, TickSource};
use fnlab_config::{LabConfig, DEFAULT_MAX_PRINT_LEN};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything a run needs to know, fixed before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessSettings {
    pub vectors: Vec<TestVector>,
    pub categories: CategorySet,
    pub only_print_fails: bool,
    pub student_name: String,
    pub test_period: Duration,
    pub idle_period: Duration,
    /// 0 keeps reporting forever.
    pub idle_cycles: u64,
    pub max_print_len: usize,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            vectors: TestVector::defaults(),
            categories: CategorySet::all(),
            only_print_fails: true,
            student_name: "Student".to_string(),
            test_period: Duration::from_millis(10),
            idle_period: Duration::from_millis(4096),
            idle_cycles: 1,
            max_print_len: DEFAULT_MAX_PRINT_LEN,
        }
    }
}

impl HarnessSettings {
    pub fn from_config(config: &LabConfig) -> LabResult<Self> {
        if config.test_vectors.is_empty() {
            return Err(LabError::EmptyVectorSet);
        }

        Ok(Self {
            vectors: config.test_vectors.iter().copied().map(TestVector).collect(),
            categories: CategorySet::from(&config.categories),
            only_print_fails: config.only_print_fails,
            student_name: config.student_name.clone(),
            test_period: Duration::from_millis(config.timing.test_period_ms),
            idle_period: Duration::from_millis(config.timing.idle_period_ms),
            idle_cycles: config.idle_cycles,
            max_print_len: config.max_print_len,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RunCategory(Category),
    ReportCategory(Category),
    FinalScore,
    IdleReport,
    Done,
}

/// Drives the routines under test through every enabled category and
/// reports over the sink. Owns all run state: counters, scorecard and the
/// handles to the external collaborators.
#[derive(Debug)]
pub struct Harness<R: Routines> {
    settings: HarnessSettings,
    routines: R,
    sink: Box<dyn ReportSink>,
    timer: Box<dyn TickSource>,
    led: Box<dyn Led>,
    verifier: Verifier,
    scorecard: Scorecard,
    idle_count: u64,
    pub observers: Vec<Arc<dyn RunObserver>>,
}

impl<R: Routines> Harness<R> {
    pub fn new(
        settings: HarnessSettings,
        routines: R,
        sink: Box<dyn ReportSink>,
        mut timer: Box<dyn TickSource>,
        led: Box<dyn Led>,
    ) -> Self {
        timer.set_period(settings.test_period);
        let verifier = Verifier::new(settings.only_print_fails, settings.max_print_len);
        let scorecard = Scorecard::new(settings.categories);

        Self {
            settings,
            routines,
            sink,
            timer,
            led,
            verifier,
            scorecard,
            idle_count: 0,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn RunObserver>) {
        self.observers.push(observer);
    }

    pub fn scorecard(&self) -> &Scorecard {
        &self.scorecard
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub fn idle_count(&self) -> u64 {
        self.idle_count
    }

    /// Run the whole sequence. Returns once the configured number of idle
    /// reports has gone out; with `idle_cycles == 0` it never returns
    /// unless the sink fails.
    pub fn run(&mut self) -> LabResult<Scorecard> {
        info!(
            "Starting lab run for {}: {} vectors, categories {:?}",
            self.settings.student_name,
            self.settings.vectors.len(),
            self.settings.categories
        );
        for observer in &self.observers {
            observer.on_run_start();
        }

        self.emit_banner()?;

        let mut phase = self.first_phase();
        while phase != Phase::Done {
            phase = self.step(phase)?;
        }

        Ok(self.scorecard.clone())
    }

    pub fn first_phase(&self) -> Phase {
        self.phase_after(None)
    }

    fn phase_after(&self, category: Option<Category>) -> Phase {
        match self.settings.categories.next_after(category) {
            Some(next) => Phase::RunCategory(next),
            None => Phase::FinalScore,
        }
    }

    /// Execute one state and return the next.
    pub fn step(&mut self, phase: Phase) -> LabResult<Phase> {
        match phase {
            Phase::RunCategory(category) => {
                self.run_category(category)?;
                Ok(Phase::ReportCategory(category))
            }
            Phase::ReportCategory(category) => {
                self.report_category(category)?;
                Ok(self.phase_after(Some(category)))
            }
            Phase::FinalScore => {
                self.final_score();
                Ok(Phase::IdleReport)
            }
            Phase::IdleReport => {
                self.idle_report()?;
                let limit = self.settings.idle_cycles;
                if limit != 0 && self.idle_count >= limit {
                    Ok(Phase::Done)
                } else {
                    Ok(Phase::IdleReport)
                }
            }
            Phase::Done => Ok(Phase::Done),
        }
    }

    fn emit(&mut self, text: &str) -> LabResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.sink.transmit(text)
    }

    fn emit_banner(&mut self) -> LabResult<()> {
        let mut buf = ReportBuffer::new(self.settings.max_print_len);
        let _ = write!(buf, "========= DIAGNOSTIC STORAGE LIST\r\n");
        for name in Diagnostics::FIELD_NAMES {
            let _ = write!(buf, "{} reports \"{}\"\r\n", Category::Composite, name);
        }
        let _ = write!(buf, "========= END -- DIAGNOSTIC STORAGE LIST\r\n\r\n");
        self.emit(buf.as_str())
    }

    fn run_category(&mut self, category: Category) -> LabResult<()> {
        info!("Running {} tests", category);

        for case in 0..self.settings.vectors.len() {
            let vector = self.settings.vectors[case];
            self.led.toggle();

            let expected = compute_expected(vector);
            let mut counters = Counters::default();
            let outcomes = self.run_case(category, case, vector, &expected, &mut counters);
            for outcome in &outcomes {
                self.emit(&outcome.report)?;
            }

            let (passed, total) = match self.scorecard.tally_mut(category) {
                Some(tally) => {
                    tally.record(&counters);
                    (tally.passed, tally.total)
                }
                None => (0, 0),
            };
            debug!(
                "{} case {} ({}): {} of {} checks passed",
                category,
                case,
                vector,
                counters.passed,
                counters.total()
            );
            for observer in &self.observers {
                observer.on_case_end(category, case, &counters);
            }

            let summary = bounded_format(
                self.settings.max_print_len,
                format_args!(
                    "========= {} In-progress test summary:\r\n\
                     {} of {} tests passed so far...\r\n\
                     \r\n",
                    category, passed, total
                ),
            );
            self.emit(&summary)?;

            // Pace the test cases.
            self.timer.wait_expired();
        }

        Ok(())
    }

    fn run_case(
        &mut self,
        category: Category,
        case: usize,
        vector: TestVector,
        exp: &ExpectedValues,
        counters: &mut Counters,
    ) -> Vec<TestOutcome> {
        match category {
            Category::Unpack => {
                let (a, b) = self.routines.unpack(exp.packed);
                let checks = [Check::new("a", a, exp.a), Check::new("b", b, exp.b)];
                let subject = format!("packed {}", vector);
                vec![self
                    .verifier
                    .verify(category, case, &subject, &checks, counters)]
            }
            Category::Abs => {
                let operands = [
                    ("a", exp.a, exp.abs_a, exp.sign_a),
                    ("b", exp.b, exp.abs_b, exp.sign_b),
                ];
                let mut outcomes = Vec::with_capacity(operands.len());
                for (label, input, abs, sign) in operands {
                    let out = self.routines.abs(input);
                    let checks = [
                        Check::new("returned", out.returned, abs),
                        Check::new("absOut", out.magnitude, abs),
                        Check::new("signBit", out.sign, sign),
                    ];
                    let subject = format!("operand {} = {} from {}", label, input, vector);
                    outcomes.push(self.verifier.verify(category, case, &subject, &checks, counters));
                }
                outcomes
            }
            Category::Multiply => {
                let product = self.routines.multiply(exp.abs_a, exp.abs_b);
                let checks = [Check::new("init_Product", product, exp.init_product)];
                let subject = format!("{} * {}", exp.abs_a, exp.abs_b);
                vec![self
                    .verifier
                    .verify(category, case, &subject, &checks, counters)]
            }
            Category::FixSign => {
                let product = self
                    .routines
                    .fix_sign(exp.init_product, exp.sign_a, exp.sign_b);
                let checks = [Check::new("final_Product", product, exp.final_product)];
                let subject = format!(
                    "product {}, signs {}/{}",
                    exp.init_product, exp.sign_a, exp.sign_b
                );
                vec![self
                    .verifier
                    .verify(category, case, &subject, &checks, counters)]
            }
            Category::Composite => {
                let out = self.routines.composite(exp.packed);
                let mut checks = vec![Check::new("returned", out.final_product, exp.final_product)];
                let wanted = exp.diagnostics().fields();
                for ((name, actual), (_, expected)) in
                    out.diagnostics.fields().into_iter().zip(wanted)
                {
                    checks.push(Check::new(name, actual, expected));
                }
                let subject = format!("packed {}", vector);
                vec![self
                    .verifier
                    .verify(category, case, &subject, &checks, counters)]
            }
        }
    }

    fn report_category(&mut self, category: Category) -> LabResult<()> {
        let (passed, total) = self
            .scorecard
            .tally(category)
            .map(|t| (t.passed, t.total))
            .unwrap_or((0, 0));
        info!("{} complete: {} of {} tests passed", category, passed, total);

        let text = bounded_format(
            self.settings.max_print_len,
            format_args!(
                "========= {} TESTS COMPLETE: \r\n\
                 Summary of tests: {} of {} tests passed\r\n\
                 \r\n",
                category, passed, total
            ),
        );
        self.emit(&text)?;

        for observer in &self.observers {
            observer.on_category_end(category);
        }
        Ok(())
    }

    fn final_score(&mut self) {
        let card = &self.scorecard;
        match card.status() {
            RunStatus::NoTests => warn!("No tests were executed; nothing to score"),
            status => info!(
                "Final score: {} of {} points ({:?})",
                card.total_points(),
                card.max_points(),
                status
            ),
        }
        for tally in &card.categories {
            if tally.enabled && tally.points().is_none() {
                warn!("{} produced no checks; scored as no data", tally.category);
            }
        }

        for observer in &self.observers {
            observer.on_run_end(card);
        }
    }

    fn idle_report(&mut self) -> LabResult<()> {
        self.idle_count += 1;
        let text = self.format_idle_report();
        self.emit(&text)?;
        self.led.toggle();

        self.timer.wait_expired();
        if self.idle_count == 1 {
            // Slow the blink down once testing is over.
            self.timer.set_period(self.settings.idle_period);
        }
        Ok(())
    }

    /// The post-test status report for the current idle cycle.
    pub fn format_idle_report(&self) -> String {
        let mut buf = ReportBuffer::new(self.settings.max_print_len);
        let name = &self.settings.student_name;
        let card = &self.scorecard;

        if card.status() == RunStatus::NoTests {
            let _ = write!(
                buf,
                "========= {}: NO TESTS EXECUTED, every test category is disabled!!!\r\n\
                 Post-test Idle Cycle Number: {}\r\n\
                 \r\n",
                name, self.idle_count
            );
            return buf.into_string();
        }

        if card.all_enabled() {
            let _ = write!(
                buf,
                "========= {}: Functions Lab ALL TESTS COMPLETE: Post-test Idle Cycle Number: {}\r\n",
                name, self.idle_count
            );
        } else {
            let _ = write!(
                buf,
                "========= {}: PARTIAL tests complete, make sure to rerun with all tests enabled!!!\r\n\
                 Post-test Idle Cycle Number: {}\r\n",
                name, self.idle_count
            );
        }

        for tally in &card.categories {
            let label = format!("{}:", tally.category);
            if !tally.enabled {
                let _ = write!(buf, "Summary of tests: {:<11} not run\r\n", label);
                continue;
            }
            let points = match tally.points() {
                Some(p) => format!("{} pts", p),
                None => "no data".to_string(),
            };
            let _ = write!(
                buf,
                "Summary of tests: {:<11} {} of {} tests passed; {}\r\n",
                label, tally.passed, tally.total, points
            );
        }
        let _ = write!(
            buf,
            " Total point score: {}\r\n\r\n",
            card.total_points()
        );
        buf.into_string()
    }
}
