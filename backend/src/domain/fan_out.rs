//! Concurrent fan-out with arrival-order aggregation.
//!
//! [`FanOut::run`] dispatches one future per input item, waits for every
//! branch to resolve and hands back a single [`FanOutReport`]. A branch's
//! failure is recorded against its key and never cancels its siblings;
//! deciding which failures matter is left to the caller. The whole batch is
//! bounded by one deadline. Expiry drops the branches still in flight and
//! yields [`FanOutError::DeadlineExceeded`].

use std::future::Future;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde_json::json;
use tracing::{debug, warn};

use super::Error;

/// Default deadline covering all branches of one fan-out.
pub const DEFAULT_FAN_OUT_DEADLINE: Duration = Duration::from_secs(5);

/// Outcome of one branch, tagged with the item that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOutcome<K, R, E> {
    /// Input item the branch was dispatched for.
    pub key: K,
    /// What the branch resolved to.
    pub result: Result<R, E>,
}

/// Aggregate of every branch, in the order branches completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutReport<K, R, E> {
    outcomes: Vec<BranchOutcome<K, R, E>>,
}

impl<K, R, E> FanOutReport<K, R, E> {
    fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    /// Number of branches that resolved.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no branch was dispatched.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Borrow the outcomes in arrival order.
    pub fn outcomes(&self) -> &[BranchOutcome<K, R, E>] {
        &self.outcomes
    }

    /// Consume the report, yielding outcomes in arrival order.
    pub fn into_outcomes(self) -> Vec<BranchOutcome<K, R, E>> {
        self.outcomes
    }

    /// Count of branches that resolved to `Err`.
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Fan-out level failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FanOutError {
    /// The deadline elapsed before every branch resolved.
    #[error("fan-out deadline exceeded after {completed} of {expected} branches")]
    DeadlineExceeded {
        /// Branches that had resolved when the deadline hit.
        completed: usize,
        /// Branches dispatched.
        expected: usize,
    },
}

impl From<FanOutError> for Error {
    fn from(err: FanOutError) -> Self {
        match err {
            FanOutError::DeadlineExceeded {
                completed,
                expected,
            } => Error::timeout("lookups did not complete in time").with_details(json!({
                "completed": completed,
                "expected": expected,
                "code": "fan_out_deadline",
            })),
        }
    }
}

/// Fan-out coordinator carrying the batch deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOut {
    deadline: Duration,
}

impl Default for FanOut {
    fn default() -> Self {
        Self::new(DEFAULT_FAN_OUT_DEADLINE)
    }
}

impl FanOut {
    /// Coordinator whose batches must finish within `deadline`.
    pub const fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Configured batch deadline.
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `per_item` for every item concurrently; see [`run_fan_out`].
    pub async fn run<T, R, E, F, Fut>(
        &self,
        items: impl IntoIterator<Item = T>,
        per_item: F,
    ) -> Result<FanOutReport<T, R, E>, FanOutError>
    where
        T: Clone,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        run_fan_out(items, per_item, self.deadline).await
    }
}

/// Dispatch one branch per item and collect every outcome.
///
/// All branches are created before any is awaited and there is no
/// concurrency limit. Outcomes are recorded in completion order, each
/// exactly once. An empty input returns an empty report straight away
/// without arming the deadline.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use listshare::domain::fan_out::run_fan_out;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let report = run_fan_out(
///     vec![1_u32, 2, 3],
///     |n| async move { if n == 2 { Err("two") } else { Ok(n * 10) } },
///     Duration::from_secs(1),
/// )
/// .await
/// .expect("finishes in time");
/// assert_eq!(report.len(), 3);
/// assert_eq!(report.failure_count(), 1);
/// # });
/// ```
pub async fn run_fan_out<T, R, E, F, Fut>(
    items: impl IntoIterator<Item = T>,
    mut per_item: F,
    deadline: Duration,
) -> Result<FanOutReport<T, R, E>, FanOutError>
where
    T: Clone,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let mut pending: FuturesUnordered<_> = items
        .into_iter()
        .map(|item| {
            let key = item.clone();
            let branch = per_item(item);
            async move {
                BranchOutcome {
                    key,
                    result: branch.await,
                }
            }
        })
        .collect();

    let expected = pending.len();
    if expected == 0 {
        return Ok(FanOutReport::empty());
    }

    let mut outcomes = Vec::with_capacity(expected);
    let drain = async {
        while let Some(outcome) = pending.next().await {
            outcomes.push(outcome);
        }
    };

    if tokio::time::timeout(deadline, drain).await.is_err() {
        let completed = outcomes.len();
        warn!(completed, expected, ?deadline, "fan-out deadline exceeded");
        return Err(FanOutError::DeadlineExceeded {
            completed,
            expected,
        });
    }

    let report = FanOutReport { outcomes };
    debug!(
        branches = expected,
        failures = report.failure_count(),
        "fan-out complete"
    );
    Ok(report)
}
