mod common;

use common::*;
use news_harvester::retry::with_retry;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_wait_between_attempts_grows_exponentially() -> Result<()> {
    init_tracing();

    let policy = RetryPolicy {
        max_attempts: 4,
        initial_delay: Duration::from_millis(50),
        multiplier: 2.0,
        max_delay: Duration::from_secs(1),
    };
    let attempts = Mutex::new(Vec::new());

    let result: Result<()> = with_retry(&policy, "always failing", || {
        attempts.lock().unwrap().push(Instant::now());
        async { Err(HarvestError::collection("still down")) }
    })
    .await;

    let err = result.expect_err("every attempt fails");
    assert_eq!(err.to_string(), "still down", "last error is returned unchanged");

    let attempts = attempts.into_inner().unwrap();
    assert_eq!(attempts.len(), 4);
    let gaps: Vec<Duration> = attempts.windows(2).map(|pair| pair[1] - pair[0]).collect();

    assert!(gaps[0] >= Duration::from_millis(50), "gaps were {:?}", gaps);
    assert!(gaps[1] >= Duration::from_millis(100), "gaps were {:?}", gaps);
    assert!(gaps[2] >= Duration::from_millis(200), "gaps were {:?}", gaps);
    assert!(gaps[0] < gaps[1] && gaps[1] < gaps[2], "gaps were {:?}", gaps);
    Ok(())
}

#[tokio::test]
async fn test_wait_is_capped_at_max_delay() -> Result<()> {
    init_tracing();

    let policy = RetryPolicy {
        max_attempts: 4,
        initial_delay: Duration::from_millis(40),
        multiplier: 4.0,
        max_delay: Duration::from_millis(60),
    };
    let attempts = Mutex::new(Vec::new());

    let _: Result<()> = with_retry(&policy, "capped", || {
        attempts.lock().unwrap().push(Instant::now());
        async { Err(HarvestError::filter("rate limited")) }
    })
    .await;

    let attempts = attempts.into_inner().unwrap();
    let last_gap = attempts[3] - attempts[2];
    assert!(last_gap >= Duration::from_millis(60), "last gap was {:?}", last_gap);
    assert!(last_gap < Duration::from_millis(160), "last gap was {:?}", last_gap);
    Ok(())
}

#[tokio::test]
async fn test_success_stops_retrying() -> Result<()> {
    init_tracing();

    let calls = Mutex::new(0);
    let value = with_retry(&RetryPolicy::immediate(5), "flaky", || {
        let call = {
            let mut calls = calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        async move {
            if call < 3 {
                Err(HarvestError::collection("not yet"))
            } else {
                Ok(call)
            }
        }
    })
    .await?;

    assert_eq!(value, 3);
    assert_eq!(*calls.lock().unwrap(), 3);
    Ok(())
}
