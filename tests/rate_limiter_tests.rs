use reporadar::limits::{RateLimitConfig, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

fn shared_limiter(max_requests: u32) -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(RateLimitConfig {
        window: Duration::from_secs(60),
        max_requests,
        max_tracked_clients: 1_000,
    }))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_admissions_for_one_client_respect_budget() {
    let limiter = shared_limiter(5);

    let handles: Vec<_> = (0..200)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.admit("same") })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 5);
    assert_eq!(limiter.tracked_clients(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_clients_each_get_full_budget() {
    let limiter = shared_limiter(3);

    let handles: Vec<_> = (0..40)
        .flat_map(|client| (0..5).map(move |_| client))
        .map(|client| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { (client, limiter.admit(&format!("10.0.0.{client}"))) })
        })
        .collect();

    let mut admitted = [0u32; 40];
    for handle in handles {
        let (client, allowed) = handle.await.unwrap();
        if allowed {
            admitted[client] += 1;
        }
    }

    assert!(admitted.iter().all(|&n| n == 3), "{admitted:?}");
}
