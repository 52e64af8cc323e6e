//! One simple load test: concurrent sets and deletes, then verify state and introspection.

use segmap::SegmentedMap;
use std::sync::Arc;
use std::thread;

#[test]
fn test_under_load_then_introspect() {
    let map = Arc::new(SegmentedMap::new(64, 16));
    let mut handles = vec![];

    for t in 0..4 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..2000 {
                let key = format!("t{}_k{}", t, i);
                map.set(key, i);
            }
            for i in 0..2000 {
                let key = format!("t{}_k{}", t, i);
                assert_eq!(map.get_and_delete(&key), Some(i));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    let stats = map.stats();
    assert_eq!(stats.segment_sizes.iter().sum::<usize>(), 0);
    assert_eq!(stats.max_load_ratio(), 0.0);
}
