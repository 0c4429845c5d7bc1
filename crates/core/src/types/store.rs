//! Store records and the admin form field set.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{StoreId, UserId};

/// A single retail location as stored in the backend `stores` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Backend-assigned identifier. Never changes after creation.
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    /// Insertion time; the directory is ordered newest first.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Account that created the listing, when known.
    #[serde(default)]
    pub created_by: Option<UserId>,
}

impl StoreRecord {
    /// Single-line postal address, e.g. `123 Main St, Los Angeles, CA 90210`.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address, self.city, self.state, self.zip_code
        )
    }

    /// The editable fields of this record.
    #[must_use]
    pub fn fields(&self) -> StoreFields {
        StoreFields {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
            phone: self.phone.clone(),
            hours: self.hours.clone(),
        }
    }

    /// Whether `user` created this listing.
    #[must_use]
    pub fn is_created_by(&self, user: UserId) -> bool {
        self.created_by == Some(user)
    }
}

/// Required form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    Address,
    City,
    State,
    ZipCode,
}

impl RequiredField {
    /// Human-readable label used on the form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Store Name",
            Self::Address => "Address",
            Self::City => "City",
            Self::State => "State",
            Self::ZipCode => "Zip Code",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised when validating a [`StoreDraft`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// One or more required fields were blank.
    #[error("Please fill in all required fields")]
    MissingRequired(Vec<RequiredField>),
}

/// Raw admin form input. Every field arrives as a string, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub hours: String,
}

impl StoreDraft {
    /// Required fields that are empty or whitespace-only.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        [
            (RequiredField::Name, &self.name),
            (RequiredField::Address, &self.address),
            (RequiredField::City, &self.city),
            (RequiredField::State, &self.state),
            (RequiredField::ZipCode, &self.zip_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Validate the draft into a trimmed field set.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MissingRequired`] listing every blank required field.
    pub fn validate(&self) -> Result<StoreFields, DraftError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DraftError::MissingRequired(missing));
        }

        Ok(StoreFields {
            name: self.name.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            zip_code: self.zip_code.trim().to_owned(),
            phone: non_blank(&self.phone),
            hours: non_blank(&self.hours),
        })
    }
}

impl From<&StoreRecord> for StoreDraft {
    fn from(store: &StoreRecord) -> Self {
        Self {
            name: store.name.clone(),
            address: store.address.clone(),
            city: store.city.clone(),
            state: store.state.clone(),
            zip_code: store.zip_code.clone(),
            phone: store.phone.clone().unwrap_or_default(),
            hours: store.hours.clone().unwrap_or_default(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Validated store fields, ready to send to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFields {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub hours: Option<String>,
}

/// Insert payload for a new store row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStore {
    #[serde(flatten)]
    pub fields: StoreFields,
    pub created_by: Option<UserId>,
}
