// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Poll loop blocking an operation until a wait condition holds

use serde_json::Value;
use std::future::Future;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::condition::{Evaluation, FetchError, WaitSpec};
use crate::error::{ProviderError, Result};

/// Terminal state of a wait that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied,
    /// Only returned for a zero timeout whose single check did not pass
    NotSatisfied,
}

/// Poll `fetch` until `spec.condition` holds.
///
/// The first fetch always happens. With a zero timeout its result is returned
/// as-is; otherwise the loop sleeps `poll_interval` between fetches and fails
/// with `WaitTimeoutExceeded` once more than `timeout` has elapsed since the
/// first fetch. Fetch errors other than the ones the condition expects abort
/// the wait immediately, as does cancellation of `cancel`.
pub async fn wait_until<F, Fut>(
    spec: &WaitSpec,
    cancel: &CancellationToken,
    mut fetch: F,
) -> Result<WaitOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Value, FetchError>>,
{
    let target = spec.condition.to_string();
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::WaitCancelled(target)),
            fetched = fetch() => fetched,
        };

        match spec.condition.evaluate(fetched) {
            Evaluation::Satisfied => {
                info!(attempt, elapsed = ?start.elapsed(), "Wait for {} satisfied", target);
                return Ok(WaitOutcome::Satisfied);
            }
            Evaluation::Fatal(err) => {
                warn!(attempt, error = %err, "Aborting wait for {}", target);
                return Err(ProviderError::FetchFailure(err));
            }
            Evaluation::Pending => {}
        }

        if spec.timeout.is_zero() {
            debug!("Wait for {} not satisfied, zero timeout so not retrying", target);
            return Ok(WaitOutcome::NotSatisfied);
        }

        if start.elapsed() > spec.timeout {
            warn!(attempt, timeout = ?spec.timeout, "Timed out waiting for {}", target);
            return Err(ProviderError::WaitTimeoutExceeded {
                target,
                timeout: spec.timeout,
            });
        }

        debug!(
            attempt,
            "Waiting for {}, polling again in {:?}", target, spec.poll_interval
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::WaitCancelled(target)),
            _ = sleep(spec.poll_interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonpath::FieldPath;
    use crate::wait::Condition;
    use kube::core::ErrorResponse;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Step = std::result::Result<Value, FetchError>;

    /// Fetcher replaying scripted results; the last one repeats forever
    #[derive(Clone)]
    struct Script {
        steps: Arc<Mutex<VecDeque<Step>>>,
        calls: Arc<Mutex<Vec<Instant>>>,
    }

    fn found(phase: &str) -> Step {
        Ok(json!({"metadata": {"name": "nginx"}, "status": {"phase": phase}}))
    }

    fn forbidden() -> Step {
        Err(FetchError::Failed(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        })))
    }

    impl Script {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Arc::new(Mutex::new(steps.into())),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn fetch(&self) -> impl Future<Output = Step> {
            let this = self.clone();
            async move { this.next_step() }
        }

        fn next_step(&self) -> Step {
            self.calls.lock().unwrap().push(Instant::now());
            let mut steps = self.steps.lock().unwrap();
            if steps.len() > 1 {
                return steps.pop_front().unwrap();
            }
            let repeated = match steps.front() {
                Some(Ok(v)) => Some(Ok(v.clone())),
                Some(Err(FetchError::NotFound)) | None => Some(Err(FetchError::NotFound)),
                Some(Err(FetchError::Failed(_))) => None,
            };
            match repeated {
                Some(step) => step,
                None => steps.pop_front().unwrap(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn call_offsets_secs(&self, start: Instant) -> Vec<u64> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|t| t.duration_since(start).as_secs())
                .collect()
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn phase_equals(expected: Option<&str>) -> Condition {
        Condition::FieldEquals {
            path: FieldPath::parse("$.status.phase").unwrap(),
            expected: expected.map(str::to_string),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_after_n_found() {
        let script = Script::new(vec![
            found("Ready"),
            found("Ready"),
            found("Ready"),
            Err(FetchError::NotFound),
        ]);
        let spec = WaitSpec::new(Condition::ResourceAbsent, secs(30), secs(5));

        let outcome = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap();

        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_fetches_once() {
        let script = Script::new(vec![found("Pending")]);
        let spec = WaitSpec::new(phase_equals(Some("Ready")), Duration::ZERO, secs(5));

        let outcome = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap();

        assert_eq!(outcome, WaitOutcome::NotSatisfied);
        assert_eq!(script.calls(), 1);

        let script = Script::new(vec![found("Ready")]);
        let outcome = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap();

        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_fetch_count() {
        let script = Script::new(vec![found("Pending")]);
        let spec = WaitSpec::new(phase_equals(Some("Ready")), secs(10), secs(3));
        let start = Instant::now();

        let err = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProviderError::WaitTimeoutExceeded { timeout, .. } if timeout == secs(10)
        ));
        // fetches at 0, 3, 6, 9, 12; the check after 12s is the first past the limit
        assert_eq!(script.calls(), 5);
        assert!(script.calls() as u64 <= 10 / 3 + 2);
        assert_eq!(start.elapsed().as_secs(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_measured_from_first_fetch() {
        let script = Script::new(vec![found("Pending")]);
        let spec = WaitSpec::new(phase_equals(Some("Ready")), secs(11), secs(5));

        let err = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap_err();

        // the check at 10s is still inside the limit, the one at 15s is not
        assert!(matches!(err, ProviderError::WaitTimeoutExceeded { .. }));
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_field_equals_any_non_empty_value() {
        let script = Script::new(vec![
            Err(FetchError::NotFound),
            found(""),
            found("Pending"),
        ]);
        let spec = WaitSpec::new(phase_equals(None), secs(60), secs(1));

        let outcome = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap();

        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_field_equals_requires_exact_match() {
        let script = Script::new(vec![
            found("Pending"),
            found("ready"),
            found("Ready "),
            found("Ready"),
        ]);
        let spec = WaitSpec::new(phase_equals(Some("Ready")), secs(60), secs(1));

        let outcome = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap();

        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_aborts_absent_wait_immediately() {
        let script = Script::new(vec![found("Ready"), forbidden(), Err(FetchError::NotFound)]);
        let spec = WaitSpec::new(Condition::ResourceAbsent, secs(300), secs(5));
        let start = Instant::now();

        let err = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::FetchFailure(FetchError::Failed(_))));
        assert_eq!(script.calls(), 2);
        assert_eq!(start.elapsed().as_secs(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_example_scenario_ready_after_ten_seconds() {
        let script = Script::new(vec![found("Pending"), found("Pending"), found("Ready")]);
        let spec = WaitSpec::new(phase_equals(Some("Ready")), secs(10), secs(5));
        let start = Instant::now();

        let outcome = wait_until(&spec, &CancellationToken::new(), || script.fetch())
            .await
            .unwrap();

        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(script.calls(), 3);
        assert_eq!(script.call_offsets_secs(start), vec![0, 5, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_sleep() {
        let script = Script::new(vec![found("Pending")]);
        let spec = WaitSpec::new(phase_equals(Some("Ready")), secs(600), secs(60));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(secs(90)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = wait_until(&spec, &cancel, || script.fetch())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::WaitCancelled(_)));
        assert_eq!(script.calls(), 2);
        assert_eq!(start.elapsed().as_secs(), 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_slow_fetch() {
        let started = Arc::new(Mutex::new(0u32));
        let spec = WaitSpec::new(phase_equals(Some("Ready")), secs(600), secs(5));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(secs(30)).await;
            trigger.cancel();
        });

        let counter = started.clone();
        let start = Instant::now();
        let err = wait_until(&spec, &cancel, move || {
            let counter = counter.clone();
            async move {
                *counter.lock().unwrap() += 1;
                sleep(secs(100)).await;
                found("Ready")
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::WaitCancelled(_)));
        assert_eq!(*started.lock().unwrap(), 1);
        assert_eq!(start.elapsed().as_secs(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_does_not_fetch() {
        let script = Script::new(vec![found("Ready")]);
        let spec = WaitSpec::new(phase_equals(Some("Ready")), secs(10), secs(1));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = wait_until(&spec, &cancel, || script.fetch())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::WaitCancelled(_)));
        assert_eq!(script.calls(), 0);
    }
}
