use crate::error::ScannerError;
use crate::scan::Scanner;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

struct RunningScan {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// # Summary
/// Start/stop control around the background scan loop.
///
/// # Invariants
/// - At most one scan loop runs at a time.
/// - `stop` waits for the loop to exit, so no cycle is left half-committed.
pub struct ScannerService {
    scanner: Arc<Scanner>,
    running: Mutex<Option<RunningScan>>,
}

impl ScannerService {
    pub fn new(scanner: Arc<Scanner>) -> Arc<Self> {
        Arc::new(Self {
            scanner,
            running: Mutex::new(None),
        })
    }

    pub fn scanner(&self) -> &Arc<Scanner> {
        &self.scanner
    }

    /// # Summary
    /// Spawns the scan loop.
    ///
    /// # Returns
    /// `AlreadyRunning` if a loop is live; a finished loop is replaced.
    pub async fn start(&self) -> Result<(), ScannerError> {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return Err(ScannerError::AlreadyRunning);
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(self.scanner.clone().run(stop_rx));
        *running = Some(RunningScan { stop_tx, handle });
        info!("Monitoring started");
        Ok(())
    }

    /// # Summary
    /// Signals the loop and waits for it to finish its current subject.
    pub async fn stop(&self) -> Result<(), ScannerError> {
        let Some(scan) = self.running.lock().await.take() else {
            return Err(ScannerError::NotRunning);
        };
        if scan.handle.is_finished() {
            return Err(ScannerError::NotRunning);
        }
        scan.stop_tx.send(true).ok();
        if let Err(e) = scan.handle.await {
            error!(error = %e, "Scan task ended abnormally");
        }
        info!("Monitoring stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }
}
