use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::config::BatchPolicy;

/// Run `task` over `items` split into chunks of `policy.batch_size`, keeping at
/// most `policy.max_in_flight` chunks awaited at once. Results come back in
/// chunk order whatever the completion order was.
pub async fn run_batches<'a, T, R, F, Fut>(items: &'a [T], policy: BatchPolicy, task: F) -> Vec<R>
where
    F: FnMut(&'a [T]) -> Fut,
    Fut: Future<Output = R>,
{
    if items.is_empty() {
        return Vec::new();
    }
    stream::iter(items.chunks(policy.batch_size.max(1)))
        .map(task)
        .buffered(policy.max_in_flight.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn chunks_respect_batch_size_and_order() {
        let items: Vec<u32> = (0..120).collect();
        let sizes = run_batches(&items, BatchPolicy::sequential(50), |chunk| async move {
            (chunk[0], chunk.len())
        })
        .await;
        assert_eq!(sizes, vec![(0, 50), (50, 50), (100, 20)]);
    }

    #[tokio::test]
    async fn sequential_policy_never_overlaps() {
        let items: Vec<u32> = (0..10).collect();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        run_batches(&items, BatchPolicy::sequential(3), |_| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_policy_keeps_chunk_order() {
        let items: Vec<u64> = (0..4).collect();
        let policy = BatchPolicy {
            batch_size: 1,
            max_in_flight: 4,
        };
        let out = run_batches(&items, policy, |chunk| async move {
            // Later chunks finish first.
            tokio::time::sleep(Duration::from_millis(20 - chunk[0] * 5)).await;
            chunk[0]
        })
        .await;
        assert_eq!(out, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_input_runs_nothing() {
        let items: Vec<u8> = Vec::new();
        let out: Vec<usize> = run_batches(&items, BatchPolicy::sequential(5), |chunk| async move {
            chunk.len()
        })
        .await;
        assert!(out.is_empty());
    }
}
