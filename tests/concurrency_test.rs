/*!
 * Concurrency Tests
 * Concurrent creation, lookup and destruction
 */

use modrt_process::core::limits::MIN_MAX_MODULE_NAME_LEN;
use modrt_process::memory::{MemoryInfo, ModuleMemoryTracker};
use modrt_process::process::ProcessManager;
use modrt_process::ThreadTable;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 100;

#[test]
fn test_concurrent_create_unique_ids() {
    let pm = Arc::new(ProcessManager::new());

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let pm = Arc::clone(&pm);
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| {
                        let p = pm.create(&format!("w{}_{}", t, i), None, None).unwrap();
                        (p, pm.get_id(p))
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let created: Vec<_> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .collect();

    let ids: HashSet<_> = created.iter().map(|&(_, id)| id).collect();
    let handles: HashSet<_> = created.iter().map(|&(h, _)| h).collect();
    assert_eq!(ids.len(), THREADS * PER_THREAD);
    assert_eq!(handles.len(), THREADS * PER_THREAD);
    assert_eq!(pm.object_count(), THREADS * PER_THREAD);
}

#[test]
fn test_lookup_races_destroy() {
    let threads = Arc::new(ThreadTable::new());
    let tracker = Arc::new(ModuleMemoryTracker::new());
    let pm = Arc::new(
        ProcessManager::builder()
            .with_threads(threads.clone())
            .with_memory(tracker.clone())
            .build(),
    );

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let p = pm.create(&format!("race_{}", i), None, None).unwrap();
            threads.spawn(Some(p));
            threads.spawn(Some(p));
            p
        })
        .collect();

    let finders: Vec<_> = (0..4)
        .map(|_| {
            let pm = Arc::clone(&pm);
            thread::spawn(move || {
                for round in 0..50 {
                    let name = format!("race_{}", (round * 7) % 200);
                    if let Some(found) = pm.find_by_name(&name) {
                        // Either still live or destroyed after being found
                        let _ = pm.get_name(found);
                    }
                    let _ = pm.find_by_id(round + 1);
                }
            })
        })
        .collect();

    let destroyer = {
        let pm = Arc::clone(&pm);
        thread::spawn(move || {
            for p in handles {
                pm.destroy(p).unwrap();
            }
        })
    };

    destroyer.join().unwrap();
    for f in finders {
        f.join().unwrap();
    }

    assert_eq!(pm.object_count(), 0);
    assert!(threads.is_empty());
    assert_eq!(tracker.stats().used_memory, 0);
}

#[test]
fn test_concurrent_kill_and_destroy() {
    let threads = Arc::new(ThreadTable::new());
    let pm = Arc::new(
        ProcessManager::builder()
            .with_threads(threads.clone())
            .build(),
    );
    let p = pm.create("contested", None, None).unwrap();
    for _ in 0..32 {
        threads.spawn(Some(p));
    }

    let killer = {
        let pm = Arc::clone(&pm);
        thread::spawn(move || pm.kill(p, 9))
    };
    let destroyer = {
        let pm = Arc::clone(&pm);
        thread::spawn(move || pm.destroy(p))
    };

    let killed = killer.join().unwrap();
    assert!(destroyer.join().unwrap().is_ok());
    // Kill either ran first or found the handle already gone
    if let Err(e) = killed {
        assert_eq!(e.errno(), -(nix::errno::Errno::EINVAL as i32));
    }
    assert!(threads.is_empty());
    assert!(!pm.is_valid(p));
}

proptest! {
    #[test]
    fn prop_module_name_bound(len in 1usize..64, bound in 2usize..48) {
        let pm = ProcessManager::builder()
            .with_config(modrt_process::ProcessConfig::default().with_max_module_name_len(bound))
            .build();
        let module = "m".repeat(len);

        let effective = bound.max(MIN_MAX_MODULE_NAME_LEN);

        let result = pm.create("bounded", Some(&module), None);
        prop_assert_eq!(result.is_ok(), len < effective);
        if let Ok(p) = result {
            let stored = pm.get_module_name(p).unwrap();
            prop_assert_eq!(stored.as_str(), module.as_str());
        }

        // The default module always fits whatever bound was requested
        prop_assert!(pm.create("defaulted", None, None).is_ok());
    }

    #[test]
    fn prop_sequential_ids_strictly_increase(count in 1usize..40) {
        let pm = ProcessManager::new();
        let mut last = 0;
        for i in 0..count {
            let p = pm.create(&format!("seq{}", i), None, None).unwrap();
            let id = pm.get_id(p);
            prop_assert!(id > last);
            last = id;
        }
    }
}
