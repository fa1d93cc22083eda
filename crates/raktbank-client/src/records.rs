//! Domain Records
//!
//! Donors, appointments, inventory snapshots and prediction payloads.
//!
//! Forms hand over raw strings ("drafts"); a record only exists once its
//! draft has been validated, so everything held by the store is known-good.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::wire;

/// ABO/Rh blood group
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    ABPositive,
    #[serde(rename = "AB-")]
    ABNegative,
}

impl BloodGroup {
    /// All groups, in the order the registration form lists them
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::ABPositive,
        BloodGroup::ABNegative,
    ];

    /// Form/wire spelling, e.g. `"AB-"`
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::ABPositive => "AB+",
            BloodGroup::ABNegative => "AB-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField("bloodGroup"));
        }
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownBloodGroup(trimmed.to_string()))
    }
}

// =============================================================================
// Donors
// =============================================================================

/// Raw donor registration form input
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonorDraft {
    pub name: String,
    pub email: String,
    pub blood_group: String,
    pub phone: String,
}

impl DonorDraft {
    pub fn new(name: impl Into<String>, blood_group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blood_group: blood_group.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

/// A registered donor
///
/// Identity is positional: two donors with identical fields are two donors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DonorDraft")]
pub struct Donor {
    name: String,
    #[serde(serialize_with = "wire::empty_if_none")]
    email: Option<String>,
    blood_group: BloodGroup,
    #[serde(serialize_with = "wire::empty_if_none")]
    phone: Option<String>,
}

impl Donor {
    /// Trimmed, never empty
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` when the form field was left blank
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn blood_group(&self) -> BloodGroup {
        self.blood_group
    }

    /// `None` when the form field was left blank
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl TryFrom<DonorDraft> for Donor {
    type Error = ValidationError;

    fn try_from(draft: DonorDraft) -> Result<Self, Self::Error> {
        let name = wire::non_blank(&draft.name).ok_or(ValidationError::MissingField("name"))?;
        let blood_group = draft.blood_group.parse()?;

        Ok(Donor {
            name,
            email: wire::non_blank(&draft.email),
            blood_group,
            phone: wire::non_blank(&draft.phone),
        })
    }
}

// =============================================================================
// Appointments
// =============================================================================

/// Raw appointment form input
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentDraft {
    pub donor_name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, may be blank
    pub time: String,
}

impl AppointmentDraft {
    pub fn new(donor_name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            donor_name: donor_name.into(),
            date: date.into(),
            time: String::new(),
        }
    }

    pub fn at(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }
}

/// A scheduled donation appointment. Overlaps are not checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AppointmentDraft")]
pub struct Appointment {
    donor_name: String,
    date: NaiveDate,
    #[serde(serialize_with = "wire::time_or_empty")]
    time: Option<NaiveTime>,
}

impl Appointment {
    /// Free text; not linked to a registered donor
    pub fn donor_name(&self) -> &str {
        &self.donor_name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// `None` for a day-only booking
    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }
}

impl TryFrom<AppointmentDraft> for Appointment {
    type Error = ValidationError;

    fn try_from(draft: AppointmentDraft) -> Result<Self, Self::Error> {
        let donor_name =
            wire::non_blank(&draft.donor_name).ok_or(ValidationError::MissingField("donorName"))?;
        let raw_date = wire::non_blank(&draft.date).ok_or(ValidationError::MissingField("date"))?;
        let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(raw_date.clone()))?;
        let time = match wire::non_blank(&draft.time) {
            Some(raw) => Some(wire::parse_time(&raw).ok_or(ValidationError::InvalidTime(raw))?),
            None => None,
        };

        Ok(Appointment {
            donor_name,
            date,
            time,
        })
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub group: BloodGroup,
    pub units: u32,
}

impl InventoryItem {
    pub fn new(group: BloodGroup, units: u32) -> Self {
        Self { group, units }
    }
}

/// Ordered inventory snapshot; each blood group appears at most once
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<InventoryItem>", into = "Vec<InventoryItem>")]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new(items: Vec<InventoryItem>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.group) {
                return Err(ValidationError::DuplicateGroup(item.group));
            }
        }
        Ok(Self { items })
    }

    /// Stock a fresh session starts with before any refresh
    pub fn seed() -> Self {
        Self {
            items: vec![
                InventoryItem::new(BloodGroup::APositive, 10),
                InventoryItem::new(BloodGroup::BPositive, 8),
                InventoryItem::new(BloodGroup::OPositive, 15),
            ],
        }
    }

    /// Items in snapshot order
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// `None` if the snapshot has no entry for `group`
    pub fn units_for(&self, group: BloodGroup) -> Option<u32> {
        self.items.iter().find(|item| item.group == group).map(|item| item.units)
    }

    /// Units across all groups
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.units)).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TryFrom<Vec<InventoryItem>> for Inventory {
    type Error = ValidationError;

    fn try_from(items: Vec<InventoryItem>) -> Result<Self, Self::Error> {
        Inventory::new(items)
    }
}

impl From<Inventory> for Vec<InventoryItem> {
    fn from(inventory: Inventory) -> Self {
        inventory.items
    }
}

// =============================================================================
// Prediction payloads
// =============================================================================

/// Symptom feature vector for the prediction endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    /// Numeric string or empty; sent exactly as entered
    age: String,
    fever: bool,
    cough: bool,
    fatigue: bool,
}

impl PredictionRequest {
    pub fn new(
        age: impl Into<String>,
        fever: bool,
        cough: bool,
        fatigue: bool,
    ) -> Result<Self, ValidationError> {
        let age = age.into();
        let trimmed = age.trim();
        if !trimmed.is_empty() && !trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(ValidationError::InvalidAge(age));
        }

        Ok(Self {
            age,
            fever,
            cough,
            fatigue,
        })
    }

    /// Age exactly as entered; may be empty
    pub fn age(&self) -> &str {
        &self.age
    }

    pub fn fever(&self) -> bool {
        self.fever
    }

    pub fn cough(&self) -> bool {
        self.cough
    }

    pub fn fatigue(&self) -> bool {
        self.fatigue
    }
}

/// Successful prediction: a label with confidence in [0, 1]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    pub confidence: f64,
}
