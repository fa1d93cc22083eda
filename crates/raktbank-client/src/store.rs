//! Optimistic Collection Store
//!
//! In-memory donors, appointments and inventory for one session.
//!
//! Mutations apply synchronously and are never rolled back: whatever a
//! remote collaborator later says, the store is the session's source of
//! truth. Records are only ever added (at the front) or, for inventory,
//! replaced wholesale.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::ValidationError;
use crate::records::{Appointment, AppointmentDraft, Donor, DonorDraft, Inventory};

#[derive(Clone, Debug)]
pub struct CollectionStore {
    /// Newest first
    donors: VecDeque<Donor>,
    /// Newest first
    appointments: VecDeque<Appointment>,
    inventory: Inventory,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    /// Empty donor and appointment lists, seed inventory
    pub fn new() -> Self {
        Self::with_inventory(Inventory::seed())
    }

    /// Empty lists with a caller-supplied starting inventory
    pub fn with_inventory(inventory: Inventory) -> Self {
        Self {
            donors: VecDeque::new(),
            appointments: VecDeque::new(),
            inventory,
        }
    }

    /// Validate and insert a donor at the head of the list.
    ///
    /// On a validation failure the list is left untouched.
    pub fn add_donor(&mut self, draft: DonorDraft) -> Result<&Donor, ValidationError> {
        let donor = Donor::try_from(draft)?;
        self.donors.push_front(donor);
        debug!(donors = self.donors.len(), "donor added");
        Ok(&self.donors[0])
    }

    /// Validate and insert an appointment at the head of the list.
    pub fn schedule_appointment(
        &mut self,
        draft: AppointmentDraft,
    ) -> Result<&Appointment, ValidationError> {
        let appointment = Appointment::try_from(draft)?;
        self.appointments.push_front(appointment);
        debug!(appointments = self.appointments.len(), "appointment scheduled");
        Ok(&self.appointments[0])
    }

    /// Replace the inventory snapshot. No merge with the previous one.
    pub fn set_inventory(&mut self, snapshot: Inventory) {
        debug!(
            previous_groups = self.inventory.len(),
            groups = snapshot.len(),
            "inventory replaced"
        );
        self.inventory = snapshot;
    }

    /// Donors, newest first
    pub fn donors(&self) -> &VecDeque<Donor> {
        &self.donors
    }

    /// Appointments, newest first
    pub fn appointments(&self) -> &VecDeque<Appointment> {
        &self.appointments
    }

    /// Current inventory snapshot
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Most recently registered donor
    pub fn latest_donor(&self) -> Option<&Donor> {
        self.donors.front()
    }

    /// Most recently scheduled appointment
    pub fn latest_appointment(&self) -> Option<&Appointment> {
        self.appointments.front()
    }
}
