//! DTOs for the Firestore REST document representation.
//!
//! Firestore wraps every field in a typed value object such as
//! `{"doubleValue": 4.8}` or `{"integerValue": "10"}`. The adapter encodes
//! and decodes through these DTOs, then maps to [`UserRecord`] in one pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{EpochMillis, UserId, UserRecord, is_valid_rent_count};

pub(super) const TOTAL_AVERAGE_WEIGHT_RATINGS: &str = "totalAverageWeightRatings";
pub(super) const NUMBER_OF_RENTS: &str = "numberOfRents";
pub(super) const RECENTLY_ACTIVE: &str = "recentlyActive";
pub(super) const CREATED_AT: &str = "createdAt";
pub(super) const UPDATED_AT: &str = "updatedAt";

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct DocumentDto {
    #[serde(default)]
    pub(super) fields: BTreeMap<String, ValueDto>,
}

/// A Firestore typed value. Only the numeric variants are modelled; other
/// kinds deserialise with both fields unset.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) double_value: Option<f64>,
    /// Firestore sends 64-bit integers as decimal strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) integer_value: Option<String>,
}

impl ValueDto {
    pub(super) fn double(value: f64) -> Self {
        Self {
            double_value: Some(value),
            integer_value: None,
        }
    }

    pub(super) fn integer(value: impl ToString) -> Self {
        Self {
            double_value: None,
            integer_value: Some(value.to_string()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        if let Some(value) = self.double_value {
            return Some(value);
        }
        self.integer_value
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(|value| value as f64)
    }

    fn as_i64(&self) -> Option<i64> {
        if let Some(raw) = self.integer_value.as_deref() {
            return raw.parse().ok();
        }
        self.double_value
            .filter(|value| value.is_finite() && value.fract() == 0.0)
            .map(|value| value as i64)
    }

    fn as_u64(&self) -> Option<u64> {
        if let Some(raw) = self.integer_value.as_deref() {
            return raw.parse().ok();
        }
        self.double_value
            .filter(|value| is_valid_rent_count(*value))
            .map(|value| value as u64)
    }
}

impl DocumentDto {
    pub(super) fn with_field(mut self, name: &str, value: ValueDto) -> Self {
        self.fields.insert(name.to_owned(), value);
        self
    }

    /// Every persisted field of `record`. The id is the document key and is
    /// never stored as a field.
    pub(super) fn from_record(record: &UserRecord) -> Self {
        Self::default()
            .with_field(
                TOTAL_AVERAGE_WEIGHT_RATINGS,
                ValueDto::double(record.total_average_weight_ratings),
            )
            .with_field(NUMBER_OF_RENTS, ValueDto::integer(record.number_of_rents))
            .with_field(RECENTLY_ACTIVE, ValueDto::integer(record.recently_active))
            .with_field(CREATED_AT, ValueDto::integer(record.created_at))
            .with_field(UPDATED_AT, ValueDto::integer(record.updated_at))
    }

    pub(super) fn into_record(self, id: UserId) -> Result<UserRecord, String> {
        let total_average_weight_ratings = self
            .field(TOTAL_AVERAGE_WEIGHT_RATINGS)?
            .as_f64()
            .ok_or_else(|| invalid(TOTAL_AVERAGE_WEIGHT_RATINGS))?;
        let number_of_rents = self
            .field(NUMBER_OF_RENTS)?
            .as_u64()
            .ok_or_else(|| invalid(NUMBER_OF_RENTS))?;

        Ok(UserRecord {
            id,
            total_average_weight_ratings,
            number_of_rents,
            recently_active: self.timestamp(RECENTLY_ACTIVE)?,
            created_at: self.timestamp(CREATED_AT)?,
            updated_at: self.timestamp(UPDATED_AT)?,
        })
    }

    fn field(&self, name: &str) -> Result<&ValueDto, String> {
        self.fields
            .get(name)
            .ok_or_else(|| format!("document is missing field {name}"))
    }

    fn timestamp(&self, name: &str) -> Result<EpochMillis, String> {
        self.field(name)?.as_i64().ok_or_else(|| invalid(name))
    }
}

fn invalid(name: &str) -> String {
    format!("document field {name} has an unexpected value type")
}

/// Body of a Firestore error response.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponseDto {
    pub(super) error: ErrorStatusDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorStatusDto {
    #[serde(default)]
    pub(super) status: Option<String>,
}

/// The canonical status name (e.g. `FAILED_PRECONDITION`) of an error body.
pub(super) fn error_status(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorResponseDto>(body)
        .ok()
        .and_then(|response| response.error.status)
}
