/*!
 * Modular Runtime Process Daemon - Main Entry Point
 *
 * Runs a short lifecycle demonstration against the bundled thread table:
 * - Process creation with parent links
 * - Lookup derived from live threads
 * - Kill, wait and destroy
 */

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use modrt_process::monitoring::{init_tracing, LifecycleSpan};
use modrt_process::{ProcessConfig, ProcessManager, ThreadSubsystem, ThreadTable};

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("Process daemon starting...");
    info!("================================================");

    let config = ProcessConfig::from_env();
    info!(
        "Configuration: module name limit {}, wait poll {:?}, memory capacity {:?}",
        config.max_module_name_len,
        config.wait_poll_interval(),
        config.memory_capacity
    );

    let threads = Arc::new(ThreadTable::new());
    let manager = ProcessManager::builder()
        .with_config(config)
        .with_threads(threads.clone())
        .build();

    let init = manager.create("init", None, None)?;
    let worker = manager.create("worker", Some("scheduler"), Some(init))?;
    manager.set_pwd(worker, "/var/run/worker")?;
    manager.set_uid(worker, 1000)?;

    let main_thread = threads.spawn(Some(init));
    threads.spawn(Some(worker));
    threads.spawn(Some(worker));
    threads.bind_current(main_thread)?;

    info!(
        "Live threads: {}, current process: {:?}",
        threads.count_all_live_threads(),
        manager.current().and_then(|p| manager.get_name(p))
    );

    let worker_pid = manager.get_id(worker);
    match manager.find_by_name("worker") {
        Some(found) if found == worker => info!("Lookup by name resolved worker"),
        _ => warn!("Lookup by name did not resolve worker"),
    }
    match manager.find_by_id(worker_pid) {
        Some(found) if found == worker => info!("Lookup by id resolved PID {}", worker_pid),
        _ => warn!("Lookup by id did not resolve PID {}", worker_pid),
    }

    for process in [init, worker] {
        if let Some(info) = manager.snapshot(process) {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    let span = LifecycleSpan::new("kill", worker_pid);
    let killed = manager.kill(worker, 3);
    span.finish(&killed);
    killed?;

    let span = LifecycleSpan::new("wait", worker_pid);
    let waited = manager.wait_for(worker, Some(Duration::from_secs(1)));
    span.finish(&waited);
    waited?;

    info!(
        "Worker terminated with status {}, finder now returns {:?}",
        manager.get_exit_status(worker)?,
        manager.find_by_name("worker")
    );

    let init_pid = manager.get_id(init);
    for (process, pid) in [(worker, worker_pid), (init, init_pid)] {
        let span = LifecycleSpan::new("destroy", pid);
        let destroyed = manager.destroy(process);
        span.finish(&destroyed);
        destroyed?;
    }

    info!(
        "Process objects remaining: {}, live threads: {}",
        manager.object_count(),
        threads.len()
    );
    info!("Process daemon finished");
    Ok(())
}
