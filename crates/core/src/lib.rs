pub mod category;
pub mod harness;
pub mod metrics;
pub mod model;
pub mod peripherals;
pub mod routines;
pub mod score;
pub mod vector;
pub mod verify;

use std::time::Duration;

use category::Category;
use routines::{AbsOutput, CompositeOutput};
use score::Scorecard;
use verify::Counters;


#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("UART transmit failed: {0}")]
    TransmitFailed(#[from] std::io::Error),
    #[error("UART transmitter is no longer running")]
    SinkClosed,
    #[error("No test vectors configured")]
    EmptyVectorSet,
}

pub type LabResult<T> = Result<T, LabError>;

/// The five routines a student implements for the lab.
///
/// Every entry point works on 32-bit words the way the routine under test
/// sees its argument registers. Implementations may keep state (e.g. a
/// simulated machine), hence `&mut self`.
pub trait Routines: std::fmt::Debug {
    /// Split a packed word into its sign-extended high and low halfwords.
    fn unpack(&mut self, packed: u32) -> (i32, i32);
    fn abs(&mut self, input: i32) -> AbsOutput;
    /// Only defined for magnitudes up to 2^16.
    fn multiply(&mut self, a: i32, b: i32) -> i32;
    fn fix_sign(&mut self, init_product: i32, sign_a: i32, sign_b: i32) -> i32;
    fn composite(&mut self, packed: u32) -> CompositeOutput;
}

/// Serial link the reports are written to.
pub trait ReportSink: std::fmt::Debug {
    /// Send `text` and block until the transfer has been acknowledged.
    fn transmit(&mut self, text: &str) -> LabResult<()>;
}

/// Periodic timer used to pace the test sequence.
pub trait TickSource: std::fmt::Debug {
    /// Block until the current period has elapsed.
    fn wait_expired(&mut self);
    fn set_period(&mut self, period: Duration);
}

/// The liveness indicator.
pub trait Led: std::fmt::Debug {
    fn toggle(&mut self);
}

/// Trait for observing harness progress in a modular way.
pub trait RunObserver: std::fmt::Debug + Send + Sync {
    fn on_run_start(&self) {}
    fn on_case_end(&self, _category: Category, _case: usize, _counters: &Counters) {}
    fn on_category_end(&self, _category: Category) {}
    fn on_run_end(&self, _scorecard: &Scorecard) {}
}
