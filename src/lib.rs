pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod hid;
pub mod poll;
pub mod protocol;
pub mod sensor;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use coordinator::{CoordinatorState, UpdateCoordinator, UpdateFailed};
pub use poll::{PollResult, poll};
pub use protocol::Reading;
pub use sensor::SensorHandle;

pub async fn run(cfg: config::Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .init();

    tracing::info!("Starting airco2ntrol");

    // Preflight checks
    diagnostics::check(&cfg)?;

    // One process per sensor
    let lock_path = lock_path(&cfg.device)?;
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _guard = lock.try_write().map_err(|_| {
        anyhow::anyhow!(
            "airco2ntrol is already running for {} (lock: {})",
            cfg.device.display(),
            lock_path.display()
        )
    })?;

    // Open + unlock
    let sensor = SensorHandle::open(&cfg.device)
        .map_err(|e| anyhow::anyhow!("Failed to open sensor: {e}"))?;

    let coordinator = UpdateCoordinator::new(
        sensor,
        Duration::from_secs(cfg.interval),
        cfg.poll_timeout.map(Duration::from_secs),
    );
    coordinator
        .first_refresh()
        .await
        .map_err(error::Error::from)?;
    print_states(&coordinator.state(), cfg.json)?;
    if cfg.once {
        return Ok(());
    }

    let mut updates = coordinator.subscribe();
    tokio::select! {
        _ = coordinator.run() => {}
        res = async {
            while updates.changed().await.is_ok() {
                let state = updates.borrow_and_update().clone();
                print_states(&state, cfg.json)?;
            }
            Ok::<(), error::Error>(())
        } => res?,
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Interrupted, releasing sensor");
        }
    }
    Ok(())
}

/// Drive `fut` on a fresh multi-thread runtime. A read stuck on a silent
/// sensor cannot be cancelled, so shutdown only waits
/// [`SHUTDOWN_GRACE_SECS`](config::SHUTDOWN_GRACE_SECS) for blocking tasks.
pub fn block_on<F>(fut: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let res = runtime.block_on(fut);
    runtime.shutdown_timeout(Duration::from_secs(config::SHUTDOWN_GRACE_SECS));
    res
}

fn lock_path(device: &Path) -> error::Result<PathBuf> {
    let dir = match std::env::var("XDG_RUNTIME_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let dirs = directories::ProjectDirs::from("", "", "airco2ntrol").ok_or_else(|| {
                error::Error::Internal("cannot determine XDG data dir".into())
            })?;
            let data_dir = dirs.data_dir().to_path_buf();
            std::fs::create_dir_all(&data_dir)?;
            data_dir
        }
    };
    let name = device
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "device".into());
    Ok(dir.join(format!("airco2ntrol-{name}.lock")))
}

fn print_states(state: &CoordinatorState, json: bool) -> error::Result<()> {
    for entity in entity::entity_states(state) {
        if json {
            let line = serde_json::to_string(&entity)
                .map_err(|e| error::Error::Internal(e.to_string()))?;
            println!("{line}");
        } else {
            println!("{entity}");
        }
    }
    Ok(())
}
