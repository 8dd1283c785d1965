//! Concurrent credential access tests.
//!
//! Every thread reads the nonce, yields, and writes it back incremented while
//! holding the guard. Without mutual exclusion increments would be lost.
//!
//! Releasing a guard that was never acquired is not expressible: release
//! consumes the guard returned by `acquire`, so there is nothing to test.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};

mod common;

const THREAD_COUNT: usize = 8;
const ITERATIONS_PER_THREAD: usize = 50;

#[test]
fn test_no_lost_updates() {
    let store = Arc::new(common::anvil_store());
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let mut handles = vec![];

    for _ in 0..THREAD_COUNT {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..ITERATIONS_PER_THREAD {
                let mut guard = store.acquire();
                let current = guard.nonce;
                thread::yield_now();
                guard.nonce = current + 1;
                guard.release();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.nonce(), (THREAD_COUNT * ITERATIONS_PER_THREAD) as u64);
}

#[test]
fn test_at_most_one_holder() {
    let store = Arc::new(common::anvil_store());
    let inside = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let mut handles = vec![];

    for _ in 0..THREAD_COUNT {
        let store = Arc::clone(&store);
        let inside = Arc::clone(&inside);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..ITERATIONS_PER_THREAD {
                let _guard = store.acquire();
                assert!(
                    !inside.swap(true, Ordering::SeqCst),
                    "two threads held the credential at once"
                );
                thread::yield_now();
                inside.store(false, Ordering::SeqCst);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_second_acquirer_waits_for_release() {
    let store = Arc::new(common::anvil_store());
    let guard = store.acquire();

    let waiter_store = Arc::clone(&store);
    let waiter = thread::spawn(move || {
        let mut guard = waiter_store.acquire();
        guard.nonce += 1;
        guard.nonce
    });

    thread::sleep(Duration::from_millis(50));
    assert!(!waiter.is_finished());

    drop(guard);
    assert_eq!(waiter.join().unwrap(), 1);
}

#[test]
fn test_concurrent_transfers_get_unique_nonces() {
    let store = Arc::new(common::anvil_store());
    let mut handles = vec![];

    for i in 0..THREAD_COUNT {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            (0..10)
                .map(|_| {
                    store
                        .sign_transfer(Address::repeat_byte(i as u8), U256::from(1), Bytes::new())
                        .unwrap()
                        .tx()
                        .nonce
                })
                .collect::<Vec<_>>()
        }));
    }

    let nonces: HashSet<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    assert_eq!(nonces.len(), THREAD_COUNT * 10);
    assert_eq!(nonces.iter().max(), Some(&(THREAD_COUNT as u64 * 10 - 1)));
    assert_eq!(store.nonce(), THREAD_COUNT as u64 * 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_blocking_tasks_share_store() {
    let store = Arc::new(common::anvil_store());
    let mut handles = vec![];

    for _ in 0..THREAD_COUNT {
        let store = Arc::clone(&store);
        handles.push(tokio::task::spawn_blocking(move || {
            for _ in 0..ITERATIONS_PER_THREAD {
                store.with(|credential| {
                    credential.next_nonce();
                });
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.nonce(), (THREAD_COUNT * ITERATIONS_PER_THREAD) as u64);
}
