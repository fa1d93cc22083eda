//! Remote Sync Client
//!
//! Background persistence of records the store has already accepted.
//!
//! Each mutation gets exactly one save attempt, spawned onto the Tokio
//! runtime. The attempt's result is consumed by a log line. Failed saves
//! are not retried and never reach the caller that registered the record.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::PersistenceFailure;
use crate::records::{Appointment, Donor};
use crate::remote::RemoteClient;

/// Handle to one in-flight save attempt.
///
/// Dropping it detaches the attempt. Awaiting [`PersistTask::finished`]
/// only waits for it to settle; success and failure look the same.
/// Without a Tokio runtime no attempt is made and the task is born finished.
#[derive(Debug)]
#[must_use = "drop the task to detach it, or await `finished` to wait for it"]
pub struct PersistTask {
    handle: Option<JoinHandle<()>>,
}

impl PersistTask {
    pub async fn finished(self) {
        let Some(handle) = self.handle else { return };
        if let Err(e) = handle.await {
            warn!(error = %e, "persist task aborted");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

#[derive(Clone, Debug)]
pub struct SyncClient {
    remote: RemoteClient,
}

impl SyncClient {
    pub fn new(remote: RemoteClient) -> Self {
        Self { remote }
    }

    /// Spawn the save of a freshly added donor.
    pub fn persist_donor(&self, donor: Donor) -> PersistTask {
        let remote = self.remote.clone();
        spawn_attempt("donor", async move { remote.create_donor(&donor).await })
    }

    /// Spawn the save of a freshly scheduled appointment.
    pub fn persist_appointment(&self, appointment: Appointment) -> PersistTask {
        let remote = self.remote.clone();
        spawn_attempt("appointment", async move {
            remote.create_appointment(&appointment).await
        })
    }
}

fn spawn_attempt<F>(record: &'static str, attempt: F) -> PersistTask
where
    F: Future<Output = Result<(), PersistenceFailure>> + Send + 'static,
{
    let Ok(runtime) = Handle::try_current() else {
        warn!(record, "no async runtime; {record} kept locally without saving");
        return PersistTask { handle: None };
    };

    let handle = runtime.spawn(async move {
        match attempt.await {
            Ok(()) => debug!(record, "saved to remote"),
            Err(e) => warn!(record, error = %e, "failed to save {record}; keeping local copy"),
        }
    });
    PersistTask {
        handle: Some(handle),
    }
}
