use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skybook_catalog::{SeatCode, SelectedAddon};
use skybook_core::{FareClass, Fares, PaymentMethod};
use skybook_shared::Masked;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Wizard stages, strictly ordered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    PassengerDetails = 1,
    SeatSelection = 2,
    Addons = 3,
    Payment = 4,
    Confirmation = 5,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::PassengerDetails,
        Stage::SeatSelection,
        Stage::Addons,
        Stage::Payment,
        Stage::Confirmation,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::PassengerDetails => "Passenger Details",
            Stage::SeatSelection => "Seat Selection",
            Stage::Addons => "Add-ons",
            Stage::Payment => "Payment",
            Stage::Confirmation => "Confirmation",
        }
    }

    pub fn next(&self) -> Option<Stage> {
        Stage::ALL.get(usize::from(self.number())).copied()
    }

    pub fn previous(&self) -> Option<Stage> {
        let idx = usize::from(self.number()).checked_sub(2)?;
        Stage::ALL.get(idx).copied()
    }

    /// Progress bar value in percent.
    pub fn progress(&self) -> u8 {
        self.number() * 100 / Stage::ALL.len() as u8
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title(), self.number())
    }
}

/// Stable per-draft passenger handle. Seats and add-ons refer to passengers
/// through it, so renaming a passenger or sharing a name is harmless.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassengerId(u32);

impl PassengerId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    #[default]
    Passport,
    NationalId,
    DriversLicense,
}

/// Unvalidated passenger input as typed into the form.
///
/// `id` is `None` for a passenger added in this edit and carries the
/// existing handle for one being edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassengerForm {
    pub id: Option<PassengerId>,
    pub full_name: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub id_type: Option<IdType>,
    pub id_number: Masked<String>,
}

impl PassengerForm {
    pub fn new(full_name: &str, age: u32, gender: Gender, id_number: &str) -> Self {
        Self {
            id: None,
            full_name: full_name.to_string(),
            age: Some(age),
            gender: Some(gender),
            id_type: Some(IdType::Passport),
            id_number: Masked::from(id_number),
        }
    }

    /// Names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.full_name.trim().is_empty() {
            missing.push("full_name");
        }
        if self.age.is_none() {
            missing.push("age");
        }
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.id_type.is_none() {
            missing.push("id_type");
        }
        if self.id_number.is_blank() {
            missing.push("id_number");
        }
        missing
    }
}

impl From<&Passenger> for PassengerForm {
    fn from(p: &Passenger) -> Self {
        Self {
            id: Some(p.id),
            full_name: p.full_name.clone(),
            age: Some(p.age),
            gender: Some(p.gender),
            id_type: Some(p.id_type),
            id_number: p.id_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passenger {
    pub id: PassengerId,
    pub full_name: String,
    pub age: u32,
    pub gender: Gender,
    pub id_type: IdType,
    pub id_number: Masked<String>,
}

/// Settled payment. Written once, on the transition into confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub currency: String,
    pub transaction_id: String,
    pub card_last_four: Option<String>,
    pub paid_at: DateTime<Utc>,
}

/// Everything captured during one booking session.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDraft {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub flight_number: String,
    pub fare_class: FareClass,
    pub fares: Fares,
    pub(crate) passengers: Vec<Passenger>,
    pub(crate) selected_seats: BTreeMap<PassengerId, SeatCode>,
    pub(crate) addons: Vec<SelectedAddon>,
    pub(crate) payment: Option<PaymentRecord>,
    pub(crate) booking_id: Option<String>,
    pub(crate) pnr: Option<String>,
    pub(crate) last_payment_error: Option<String>,
    next_passenger_id: u32,
}

impl BookingDraft {
    pub fn new(flight_id: Uuid, flight_number: String, fare_class: FareClass, fares: Fares) -> Self {
        Self {
            id: Uuid::new_v4(),
            flight_id,
            flight_number,
            fare_class,
            fares,
            passengers: Vec::new(),
            selected_seats: BTreeMap::new(),
            addons: Vec::new(),
            payment: None,
            booking_id: None,
            pnr: None,
            last_payment_error: None,
            next_passenger_id: 1,
        }
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn passenger(&self, id: PassengerId) -> Option<&Passenger> {
        self.passengers.iter().find(|p| p.id == id)
    }

    pub fn selected_seats(&self) -> &BTreeMap<PassengerId, SeatCode> {
        &self.selected_seats
    }

    pub fn seat_of(&self, id: PassengerId) -> Option<&SeatCode> {
        self.selected_seats.get(&id)
    }

    pub fn addons(&self) -> &[SelectedAddon] {
        &self.addons
    }

    pub fn payment(&self) -> Option<&PaymentRecord> {
        self.payment.as_ref()
    }

    pub fn booking_id(&self) -> Option<&str> {
        self.booking_id.as_deref()
    }

    pub fn pnr(&self) -> Option<&str> {
        self.pnr.as_deref()
    }

    pub fn last_payment_error(&self) -> Option<&str> {
        self.last_payment_error.as_deref()
    }

    pub(crate) fn allocate_passenger_id(&mut self) -> PassengerId {
        let id = PassengerId(self.next_passenger_id);
        self.next_passenger_id += 1;
        id
    }

    pub(crate) fn knows_passenger(&self, id: PassengerId) -> bool {
        self.passengers.iter().any(|p| p.id == id)
    }
}
