use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn computes_once_per_key() {
    let memo: Memo<String, usize> = Memo::new();
    let calls = AtomicUsize::new(0);
    let compute = || {
        calls.fetch_add(1, Ordering::SeqCst);
        42
    };
    assert_eq!(memo.get_or_compute(&"a".to_owned(), compute), 42);
    assert_eq!(memo.get_or_compute(&"a".to_owned(), compute), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(memo.get(&"a".to_owned()), Some(42));
    assert_eq!(memo.get(&"b".to_owned()), None);
}

#[test]
fn fifty_concurrent_callers_share_one_computation() {
    let memo: Memo<&'static str, Vec<u32>> = Memo::new();
    let calls = AtomicUsize::new(0);
    let barrier = Barrier::new(50);

    let results: Vec<Vec<u32>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..50)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    memo.get_or_compute(&"com.app.HeaderModel", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        vec![1, 2, 3]
                    })
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_default())
            .collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.len(), 50);
    assert!(results.iter().all(|r| r == &vec![1, 2, 3]));
    assert_eq!(memo.len(), 1);
}

#[test]
fn distinct_keys_do_not_wait_on_each_other() {
    let memo: Memo<u32, u32> = Memo::new();
    let outer = memo.get_or_compute(&1, || memo.get_or_compute(&2, || 20) + 1);
    assert_eq!(outer, 21);
    assert_eq!(memo.get(&2), Some(20));
}
