//! Session
//!
//! Explicit state container for one staff session: the collection store,
//! the background sync client and the prediction workflow. Whoever drives
//! the session owns it and passes it by `&mut` to every mutating action.

use tracing::warn;

use crate::config::ClientConfig;
use crate::error::{ConfigError, SyncError, ValidationError};
use crate::prediction::{PredictionCall, PredictionReply, PredictionState, PredictionWorkflow};
use crate::records::{AppointmentDraft, DonorDraft, Inventory, PredictionRequest};
use crate::remote::RemoteClient;
use crate::store::CollectionStore;
use crate::sync::{PersistTask, SyncClient};

#[derive(Debug)]
pub struct Session {
    store: CollectionStore,
    remote: RemoteClient,
    sync: SyncClient,
    prediction: PredictionWorkflow,
}

impl Session {
    /// Fresh session: no donors, no appointments, seed inventory, idle
    /// prediction slot.
    pub fn new(remote: RemoteClient) -> Self {
        Self {
            store: CollectionStore::new(),
            sync: SyncClient::new(remote.clone()),
            remote,
            prediction: PredictionWorkflow::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.remote_client()?))
    }

    /// Read access to donors, appointments and inventory
    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn prediction(&self) -> &PredictionWorkflow {
        &self.prediction
    }

    /// For callers that run prediction cycles concurrently via
    /// `begin`/`complete`.
    pub fn prediction_mut(&mut self) -> &mut PredictionWorkflow {
        &mut self.prediction
    }

    /// Client for the collaborator endpoints this session talks to
    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    /// Register a donor locally, then save it in the background.
    ///
    /// The donor is visible in the store before this returns. Only a
    /// validation failure is reported; a failed save is logged by the task.
    pub fn register_donor(&mut self, draft: DonorDraft) -> Result<PersistTask, ValidationError> {
        let donor = self.store.add_donor(draft)?.clone();
        Ok(self.sync.persist_donor(donor))
    }

    /// Schedule an appointment locally, then save it in the background.
    pub fn schedule_appointment(
        &mut self,
        draft: AppointmentDraft,
    ) -> Result<PersistTask, ValidationError> {
        let appointment = self.store.schedule_appointment(draft)?.clone();
        Ok(self.sync.persist_appointment(appointment))
    }

    /// Replace the inventory with the collaborator's current snapshot.
    ///
    /// On failure the existing snapshot stays in place.
    pub async fn refresh_inventory(&mut self) -> Result<&Inventory, SyncError> {
        match self.remote.fetch_inventory().await {
            Ok(snapshot) => {
                self.store.set_inventory(snapshot);
                Ok(self.store.inventory())
            }
            Err(e) => {
                warn!(error = %e, "inventory refresh failed; keeping current snapshot");
                Err(e)
            }
        }
    }

    /// Enter `Pending` and hand back the request to run elsewhere.
    ///
    /// The session is free for other actions while the call is in flight;
    /// feed its reply to [`Session::finish_prediction`].
    pub fn start_prediction(&mut self, request: PredictionRequest) -> PredictionCall {
        let pending = self.prediction.begin(request);
        PredictionCall::new(pending, self.remote.clone())
    }

    /// Apply a detached call's reply. `false` if a newer cycle has started.
    pub fn finish_prediction(&mut self, reply: PredictionReply) -> bool {
        self.prediction.apply(reply)
    }

    /// Run one prediction cycle to completion.
    ///
    /// Holds the session until the collaborator answers. Interactive
    /// drivers use `start_prediction` instead.
    pub async fn predict(&mut self, request: PredictionRequest) -> &PredictionState {
        self.prediction.submit(&self.remote, request).await
    }
}
