use crate::category::Category;
use serde::Serialize;
use std::fmt::{self, Write};

pub use fnlab_config::DEFAULT_MAX_PRINT_LEN as MAX_PRINT_LEN;

/// One named `(actual, expected)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub actual: i32,
    pub expected: i32,
}

impl Check {
    pub fn new(name: &'static str, actual: i32, expected: i32) -> Self {
        Self {
            name,
            actual,
            expected,
        }
    }

    pub fn passed(&self) -> bool {
        self.actual == self.expected
    }
}

/// Running pass/fail counts, owned by whoever drives the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counters {
    pub passed: u32,
    pub failed: u32,
}

impl Counters {
    pub fn total(&self) -> u32 {
        self.passed + self.failed
    }

    pub fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn merge(&mut self, other: &Counters) {
        self.passed += other.passed;
        self.failed += other.failed;
    }
}

/// Text buffer with a hard length limit. Writes past the limit are dropped
/// (cut on a char boundary) instead of failing.
#[derive(Debug, Clone)]
pub struct ReportBuffer {
    text: String,
    max_len: usize,
    truncated: bool,
}

impl ReportBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            text: String::with_capacity(max_len),
            max_len,
            truncated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl Write for ReportBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.max_len.saturating_sub(self.text.len());
        if s.len() <= room {
            self.text.push_str(s);
            return Ok(());
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&s[..cut]);
        self.truncated = true;
        Ok(())
    }
}

/// Format `args` into a fresh buffer limited to `max_len` bytes.
pub fn bounded_format(max_len: usize, args: fmt::Arguments<'_>) -> String {
    let mut buf = ReportBuffer::new(max_len);
    // ReportBuffer never reports an error; a Display impl could, and then
    // whatever was written so far is still the report.
    let _ = buf.write_fmt(args);
    buf.into_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// Every check in the invocation matched.
    pub passed: bool,
    pub report: String,
}

#[derive(Debug, Clone)]
pub struct Verifier {
    only_print_fails: bool,
    max_len: usize,
}

impl Verifier {
    pub fn new(only_print_fails: bool, max_len: usize) -> Self {
        Self {
            only_print_fails,
            max_len,
        }
    }

    pub fn only_print_fails(&self) -> bool {
        self.only_print_fails
    }

    /// Compare every check, update `counters`, and format the report for one
    /// invocation of a routine. `subject` describes the inputs.
    pub fn verify(
        &self,
        category: Category,
        case: usize,
        subject: &str,
        checks: &[Check],
        counters: &mut Counters,
    ) -> TestOutcome {
        let mut buf = ReportBuffer::new(self.max_len);
        let mut local = Counters::default();
        let mut header_written = false;

        for check in checks {
            let ok = check.passed();
            local.record(ok);

            if ok && self.only_print_fails {
                continue;
            }
            if !header_written {
                let _ = write!(
                    buf,
                    "========= {} test case {}: {}\r\n",
                    category, case, subject
                );
                header_written = true;
            }
            let _ = write!(
                buf,
                "  {:<15} actual: {:>11} (0x{:08X})  expected: {:>11} (0x{:08X})  {}\r\n",
                check.name,
                check.actual,
                check.actual,
                check.expected,
                check.expected,
                if ok { "PASS" } else { "FAIL" }
            );
        }

        if local.failed > 0 {
            tracing::warn!(
                "{} case {} ({}): {} of {} checks failed",
                category,
                case,
                subject,
                local.failed,
                local.total()
            );
        }

        let _ = write!(
            buf,
            "{} test case {}: {} of {} checks passed\r\n",
            category,
            case,
            local.passed,
            local.total()
        );

        counters.merge(&local);
        TestOutcome {
            passed: local.failed == 0,
            report: buf.into_string(),
        }
    }
}
