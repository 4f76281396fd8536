//! Scatter-gather over tokio tasks.
//!
//! Every item gets its own task; results come back either as they complete
//! ([`Ordering::Unordered`]) or in input order ([`Ordering::Preserving`]).
//! Tasks live only for the duration of one call.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::{trace, warn};

/// Order in which gathered results are returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    /// Completion order, through one channel buffered to the batch size
    Unordered,
    /// Input order, through one result slot per item
    Preserving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScatterOptions {
    pub ordering: Ordering,
    /// Upper bound on tasks running at once; `None` runs everything at once
    pub max_concurrency: Option<usize>,
}

impl ScatterOptions {
    pub fn unordered() -> Self {
        Self {
            ordering: Ordering::Unordered,
            max_concurrency: None,
        }
    }

    pub fn preserving() -> Self {
        Self {
            ordering: Ordering::Preserving,
            max_concurrency: None,
        }
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit.max(1));
        self
    }
}

/// Run `task` for every item concurrently and collect all results.
///
/// Never cancels: every spawned task runs to completion. A task that panics
/// produces no result; the returned vector is then shorter than `items` and
/// a warning is logged.
pub async fn scatter_gather<I, T, F, Fut>(
    items: Vec<I>,
    options: ScatterOptions,
    task: F,
) -> Vec<T>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }

    let limiter = options
        .max_concurrency
        .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

    let results = match options.ordering {
        Ordering::Unordered => {
            let (tx, mut rx) = mpsc::channel(total);

            for item in items {
                let tx = tx.clone();
                let limiter = limiter.clone();
                let work = task(item);

                tokio::spawn(async move {
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    let _ = tx.send(work.await).await;
                });
            }
            drop(tx);

            let mut results = Vec::with_capacity(total);
            while let Some(result) = rx.recv().await {
                trace!(received = results.len() + 1, total, "Gathered result");
                results.push(result);
            }
            results
        }
        Ordering::Preserving => {
            let mut slots = Vec::with_capacity(total);

            for item in items {
                let (tx, rx) = oneshot::channel();
                let limiter = limiter.clone();
                let work = task(item);

                tokio::spawn(async move {
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    let _ = tx.send(work.await);
                });

                slots.push(rx);
            }

            let mut results = Vec::with_capacity(total);
            for (index, slot) in slots.into_iter().enumerate() {
                match slot.await {
                    Ok(result) => results.push(result),
                    Err(_) => warn!(index, "Task ended without reporting a result"),
                }
            }
            results
        }
    };

    if results.len() < total {
        warn!(
            expected = total,
            received = results.len(),
            "Some tasks did not report a result"
        );
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_preserving_returns_input_order() {
        // First item finishes last
        let items = vec![("a.mkv", 60), ("b.mkv", 30), ("c.mkv", 0)];

        let results = scatter_gather(
            items,
            ScatterOptions::preserving(),
            |(name, delay)| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                name
            },
        )
        .await;

        assert_eq!(results, vec!["a.mkv", "b.mkv", "c.mkv"]);
    }

    #[tokio::test]
    async fn test_unordered_returns_completion_order() {
        let items = vec![("slow", 80), ("fast", 0)];

        let results = scatter_gather(
            items,
            ScatterOptions::unordered(),
            |(name, delay)| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                name
            },
        )
        .await;

        assert_eq!(results, vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn test_unordered_gathers_every_result() {
        let items: Vec<u32> = (0..50).collect();

        let mut results =
            scatter_gather(items, ScatterOptions::unordered(), |n| async move { n * 2 }).await;
        results.sort();

        let expected: Vec<u32> = (0..50).map(|n| n * 2).collect();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results: Vec<u32> =
            scatter_gather(Vec::<u32>::new(), ScatterOptions::unordered(), |n| async move { n })
                .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_cancel_siblings() {
        let items = vec![1, 2, 3];

        let results = scatter_gather(items, ScatterOptions::preserving(), |n| async move {
            if n == 2 {
                Err(format!("item {} failed", n))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Ok(1));
        assert!(results[1].is_err());
        assert_eq!(results[2], Ok(3));
    }

    #[tokio::test]
    async fn test_max_concurrency_is_respected() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let items: Vec<usize> = (0..12).collect();

        let options = ScatterOptions::preserving().with_max_concurrency(3);
        let results = scatter_gather(items, options, |n| {
            let running = running.clone();
            let peak = peak.clone();
            async move {
                let now = running.fetch_add(1, AtomicOrdering::SeqCst) + 1;
                peak.fetch_max(now, AtomicOrdering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, AtomicOrdering::SeqCst);
                n
            }
        })
        .await;

        assert_eq!(results, (0..12).collect::<Vec<_>>());
        assert!(peak.load(AtomicOrdering::SeqCst) <= 3);
    }

    #[test]
    fn test_max_concurrency_floor() {
        let options = ScatterOptions::unordered().with_max_concurrency(0);
        assert_eq!(options.max_concurrency, Some(1));
    }
}
