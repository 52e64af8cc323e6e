use segmap::SegmentedMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_unique_sets_unsegmented() {
    concurrent_unique_sets(SegmentedMap::unsegmented());
}

#[test]
fn test_concurrent_unique_sets_segmented() {
    concurrent_unique_sets(SegmentedMap::new(256, 1));
}

fn concurrent_unique_sets(map: SegmentedMap<i32, String>) {
    const THREADS: i32 = 64;
    const PER_THREAD: i32 = 500;

    let map = Arc::new(map);
    let mut handles = vec![];

    for thread_id in 0..THREADS {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..PER_THREAD {
                let key = thread_id * PER_THREAD + i;
                map.set(key, format!("v{}", key));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let total = THREADS * PER_THREAD;
    assert_eq!(map.len(), total as usize);
    for key in 0..total {
        assert_eq!(map.get(&key), Some(format!("v{}", key)));
    }
}

#[test]
fn test_concurrent_reads() {
    let map = Arc::new(SegmentedMap::new(16, 0));

    for i in 0..100 {
        map.set(format!("key_{}", i), i);
    }

    let mut handles = vec![];

    // Spawn 20 threads, each reading all items
    for _ in 0..20 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                let key = format!("key_{}", i);
                assert_eq!(map.get(&key), Some(i));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_updates() {
    let map = Arc::new(SegmentedMap::new(16, 0));
    let mut handles = vec![];

    // Spawn 10 threads, each incrementing the counter 100 times
    for _ in 0..10 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                map.update("counter".to_string(), 0, |v| v + 1);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // First update creates the entry from the default, so no increment is lost
    assert_eq!(map.get(&"counter".to_string()), Some(1000));
}

#[test]
fn test_get_or_set_supplier_runs_once() {
    const THREADS: usize = 32;

    let map = Arc::new(SegmentedMap::new(8, 0));
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));
    let mut handles = vec![];

    for thread_id in 0..THREADS {
        let map = Arc::clone(&map);
        let calls = Arc::clone(&calls);
        let barrier = Arc::clone(&barrier);
        let handle = thread::spawn(move || {
            barrier.wait();
            map.get_or_set("shared", || {
                calls.fetch_add(1, Ordering::SeqCst);
                thread_id
            })
        });
        handles.push(handle);
    }

    let results: Vec<(usize, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);

    let winner = results[0].0;
    assert!(results.iter().all(|(value, _)| *value == winner));
    assert_eq!(map.get(&"shared"), Some(winner));
}

#[test]
fn test_concurrent_delete_if_removes_once() {
    let map = Arc::new(SegmentedMap::new(4, 0));
    for i in 0..200 {
        map.set(i, i);
    }

    let removed = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for _ in 0..8 {
        let map = Arc::clone(&map);
        let removed = Arc::clone(&removed);
        let handle = thread::spawn(move || {
            for i in 0..200 {
                if map.delete_if(&i, |v| v % 2 == 0).is_removed() {
                    removed.fetch_add(1, Ordering::SeqCst);
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(removed.load(Ordering::SeqCst), 100);
    assert_eq!(map.len(), 100);
}

#[test]
fn test_concurrent_mixed_operations() {
    let map = Arc::new(SegmentedMap::new(32, 0));
    let mut handles = vec![];

    // Spawn writers
    for thread_id in 0..5 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                map.set(format!("key_{}_{}", thread_id, i), i);
            }
        });
        handles.push(handle);
    }

    // Spawn readers that also walk the whole map
    for _ in 0..5 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                let key = format!("key_{}_{}", i % 5, i);
                if let Some(value) = map.get(&key) {
                    assert_eq!(value, i);
                }
                let mut count = 0;
                map.range(|_, _| {
                    count += 1;
                    true
                });
                assert!(count <= 500);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.len(), 500);
}

#[test]
fn test_concurrent_multi_key_delete() {
    let map = Arc::new(SegmentedMap::new(16, 0));
    for i in 0..1000 {
        map.set(i, i);
    }

    let mut handles = vec![];
    for chunk in 0..10 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            let keys: Vec<i32> = (chunk * 100..(chunk + 1) * 100).collect();
            map.delete(&keys)
        });
        handles.push(handle);
    }

    let removed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(removed, 1000);
    assert!(map.is_empty());
}
