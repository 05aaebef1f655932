/*!
 * Process Lookup Tests
 * Finding processes through the live thread population
 */

use modrt_process::process::ProcessManager;
use modrt_process::thread::{ThreadSubsystem, ThreadTable};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn setup() -> (ProcessManager, Arc<ThreadTable>) {
    let threads = Arc::new(ThreadTable::new());
    let pm = ProcessManager::builder()
        .with_threads(threads.clone())
        .build();
    (pm, threads)
}

#[test]
fn test_find_without_threads() {
    let (pm, _threads) = setup();
    let p = pm.create("any_proc", None, None).unwrap();

    assert_eq!(pm.find_by_name("any_proc"), None);
    assert_eq!(pm.find_by_id(pm.get_id(p)), None);
    assert_eq!(pm.find_by_id(1), None);
    pm.destroy(p).unwrap();
}

#[test]
fn test_find_rejects_empty_inputs() {
    let (pm, threads) = setup();
    let p = pm.create("x", None, None).unwrap();
    threads.spawn(Some(p));

    assert_eq!(pm.find_by_name(""), None);
    assert_eq!(pm.find_by_id(0), None);
}

#[test]
fn test_find_by_name_and_id() {
    let (pm, threads) = setup();
    let alpha = pm.create("alpha", None, None).unwrap();
    let beta = pm.create("beta", Some("other"), None).unwrap();
    threads.spawn(Some(alpha));
    threads.spawn(Some(beta));
    threads.spawn(None);

    assert_eq!(pm.find_by_name("alpha"), Some(alpha));
    assert_eq!(pm.find_by_name("beta"), Some(beta));
    assert_eq!(pm.find_by_name("gamma"), None);

    assert_eq!(pm.find_by_id(pm.get_id(alpha)), Some(alpha));
    assert_eq!(pm.find_by_id(pm.get_id(beta)), Some(beta));
    assert_eq!(pm.find_by_id(9_999), None);
}

#[test]
fn test_process_without_threads_is_invisible() {
    let (pm, threads) = setup();
    let visible = pm.create("visible", None, None).unwrap();
    let hidden = pm.create("hidden", None, None).unwrap();
    threads.spawn(Some(visible));

    assert_eq!(pm.find_by_name("visible"), Some(visible));
    assert_eq!(pm.find_by_name("hidden"), None);
    assert!(pm.is_valid(hidden));
}

#[test]
fn test_find_follows_renumbered_id() {
    let (pm, threads) = setup();
    let p = pm.create("renumbered", None, None).unwrap();
    threads.spawn(Some(p));
    let old = pm.get_id(p);

    pm.set_id(p, 4242).unwrap();
    assert_eq!(pm.find_by_id(4242), Some(p));
    assert_eq!(pm.find_by_id(old), None);
}

#[test]
fn test_duplicate_names_return_first_thread_owner() {
    let (pm, threads) = setup();
    let first = pm.create("twin", None, None).unwrap();
    let second = pm.create("twin", None, None).unwrap();
    threads.spawn(Some(second));
    threads.spawn(Some(first));

    // Enumeration follows thread order, not creation order
    assert_eq!(pm.find_by_name("twin"), Some(second));
}

#[test]
fn test_killed_process_disappears_from_lookup() {
    let (pm, threads) = setup();
    let p = pm.create("short_lived", None, None).unwrap();
    threads.spawn(Some(p));
    assert_eq!(pm.find_by_name("short_lived"), Some(p));

    pm.kill(p, 0).unwrap();
    assert_eq!(pm.find_by_name("short_lived"), None);
    assert!(pm.is_valid(p));
}

#[test]
fn test_stale_owner_is_skipped() {
    let (pm, threads) = setup();
    let p = pm.create("stale", None, None).unwrap();
    let guard = threads.spawn_protected(Some(p));
    let id = pm.get_id(p);
    pm.destroy(p).unwrap();

    assert_eq!(threads.count_all_live_threads(), 1);
    assert!(threads.is_alive(guard));
    assert_eq!(pm.find_by_name("stale"), None);
    assert_eq!(pm.find_by_id(id), None);
}

#[test]
fn test_current_process() {
    let (pm, threads) = setup();
    assert_eq!(pm.current(), None);

    let p = pm.create("current", None, None).unwrap();
    let t = threads.spawn(Some(p));
    threads.bind_current(t).unwrap();
    assert_eq!(pm.current(), Some(p));

    // Other OS threads are not bound
    let pm = Arc::new(pm);
    let remote = {
        let pm = Arc::clone(&pm);
        std::thread::spawn(move || pm.current())
    };
    assert_eq!(remote.join().unwrap(), None);

    threads.unbind_current();
    assert_eq!(pm.current(), None);
}

#[test]
fn test_current_thread_without_owner() {
    let (pm, threads) = setup();
    let t = threads.spawn(None);
    threads.bind_current(t).unwrap();

    assert_eq!(pm.current(), None);
    threads.unbind_current();
}
