//! RaktBank Client Core
//!
//! Optimistic client-state synchronization for a blood bank front desk:
//! donor registration, donation appointments, blood-unit inventory and a
//! remote disease prediction service.
//!
//! # Model
//!
//! - Local mutations apply immediately and are never rolled back
//! - Each donor/appointment gets one background save attempt; failures are
//!   logged, not surfaced
//! - Prediction runs one visible cycle at a time; only the latest cycle's
//!   outcome reaches the result slot, and the session stays usable while a
//!   cycle is pending
//!
//! # Example
//!
//! ```rust,no_run
//! use raktbank_client::{ClientConfig, DonorDraft, PredictionRequest, Session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let mut session = Session::from_config(&config)?;
//!
//! // Visible immediately; the save runs in the background
//! let _save = session.register_donor(DonorDraft::new("Asha Rao", "O+"))?;
//! assert_eq!(session.store().donors().len(), 1);
//!
//! let request = PredictionRequest::new("30", true, false, false)?;
//! let state = session.predict(request).await;
//! println!("{:?}", state);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod prediction;
pub mod records;
pub mod remote;
pub mod session;
pub mod store;
pub mod sync;
pub mod view;
mod wire;

pub use config::ClientConfig;
pub use error::{ConfigError, PersistenceFailure, PredictionFailure, SyncError, ValidationError};
pub use prediction::{
    PendingPrediction, PredictionCall, PredictionOutcome, PredictionReply, PredictionState,
    PredictionTicket, PredictionWorkflow, PREDICTION_FAILED,
};
pub use records::{
    Appointment, AppointmentDraft, BloodGroup, Donor, DonorDraft, Inventory, InventoryItem,
    PredictionRequest, PredictionResult,
};
pub use remote::{Endpoints, RemoteClient};
pub use session::Session;
pub use store::CollectionStore;
pub use sync::{PersistTask, SyncClient};
