//! Bounded retry primitive shared by port checks, shell checks, and IP polling.

use std::future::Future;

use crate::domain::RetryPolicy;

/// How a bounded retry ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Call `attempt` (1-based attempt number) until it yields `Some`, sleeping
/// `policy.delay` between failed attempts, at most `policy.max_attempts` times.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut attempt: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for n in 1..=policy.max_attempts {
        if let Some(value) = attempt(n).await {
            return RetryOutcome::Succeeded { value, attempts: n };
        }
        if n < policy.max_attempts && !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }
    }
    RetryOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}
