//! Typed view of a Tidi item's parameters.
//!
//! The host hands over loosely typed JSON. It is resolved once into
//! [`TidiParameters`] and then narrowed into an [`OperationRequest`] whose
//! [`Operation`] carries only the fields that operation uses.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::NodeError;

/// Raw per-item parameters as the host resolves them.
///
/// Missing fields fall back to their defaults. String fields accept `null`
/// (empty string), numbers and booleans (their text form), and arrays or
/// objects (their compact JSON text).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TidiParameters {
    #[serde(deserialize_with = "lenient_string")]
    pub operation: String,
    #[serde(deserialize_with = "lenient_string")]
    pub language: String,
    #[serde(deserialize_with = "lenient_string")]
    pub professional_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub services: String,
    #[serde(deserialize_with = "null_as_default")]
    pub additional_filters: AdditionalFilters,
    #[serde(deserialize_with = "lenient_string")]
    pub day: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hour: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
}

impl Default for TidiParameters {
    fn default() -> Self {
        Self {
            operation: OperationKind::GetPartner.as_str().to_owned(),
            language: Language::Pt.as_str().to_owned(),
            professional_id: String::new(),
            services: String::new(),
            additional_filters: AdditionalFilters::default(),
            day: String::new(),
            hour: String::new(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
        }
    }
}

/// `additionalFilters` collection: `{ "filters": [{ "key", "value" }, ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdditionalFilters {
    #[serde(deserialize_with = "null_as_default")]
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Filter {
    #[serde(deserialize_with = "lenient_string")]
    pub key: String,
    #[serde(deserialize_with = "lenient_string")]
    pub value: String,
}

impl Filter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Pt,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Pt, Language::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pt => "pt",
            Self::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = NodeError;

    /// An empty value selects the default language (`pt`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "pt" => Ok(Self::Pt),
            "en" => Ok(Self::En),
            other => Err(NodeError::configuration(format!(
                "unsupported language '{other}' (expected 'pt' or 'en')"
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of an operation, without its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GetPartner,
    GetServices,
    GetProfessionals,
    CheckAvailability,
    Schedule,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::GetPartner,
        OperationKind::GetServices,
        OperationKind::GetProfessionals,
        OperationKind::CheckAvailability,
        OperationKind::Schedule,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetPartner => "getPartner",
            Self::GetServices => "getServices",
            Self::GetProfessionals => "getProfessionals",
            Self::CheckAvailability => "checkAvailability",
            Self::Schedule => "schedule",
        }
    }
}

impl FromStr for OperationKind {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| NodeError::configuration(format!("unknown operation '{s}'")))
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a `schedule` request, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Appointment {
    pub day: String,
    pub hour: String,
    pub professional: String,
    pub services: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Appointment {
    pub fn form_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("day", self.day.as_str()),
            ("hour", self.hour.as_str()),
            ("professional", self.professional.as_str()),
            ("services", self.services.as_str()),
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    GetPartner,
    GetServices { filters: Vec<Filter> },
    GetProfessionals { filters: Vec<Filter> },
    CheckAvailability { professional: String, services: String },
    Schedule(Appointment),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::GetPartner => OperationKind::GetPartner,
            Self::GetServices { .. } => OperationKind::GetServices,
            Self::GetProfessionals { .. } => OperationKind::GetProfessionals,
            Self::CheckAvailability { .. } => OperationKind::CheckAvailability,
            Self::Schedule(_) => OperationKind::Schedule,
        }
    }
}

/// Opaque API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Numbers and booleans are taken as their text. Any other shape is rejected
/// with a message that never contains the value.
impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            scalar @ (Value::Number(_) | Value::Bool(_)) => Ok(Self(scalar.to_string())),
            _ => Err(de::Error::custom("apiKey must be a string")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub operation: Operation,
    pub language: Language,
    pub api_key: ApiKey,
}

impl TidiParameters {
    /// Operation and language, validated, without touching credentials.
    pub fn target(&self) -> Result<(OperationKind, Language), NodeError> {
        Ok((self.operation.parse()?, self.language.parse()?))
    }

    pub fn into_request(self, api_key: ApiKey) -> Result<OperationRequest, NodeError> {
        let (kind, language) = self.target()?;
        let operation = match kind {
            OperationKind::GetPartner => Operation::GetPartner,
            OperationKind::GetServices => Operation::GetServices {
                filters: self.additional_filters.filters,
            },
            OperationKind::GetProfessionals => Operation::GetProfessionals {
                filters: self.additional_filters.filters,
            },
            OperationKind::CheckAvailability => Operation::CheckAvailability {
                professional: self.professional_id,
                services: self.services,
            },
            OperationKind::Schedule => Operation::Schedule(Appointment {
                day: self.day,
                hour: self.hour,
                professional: self.professional_id,
                services: self.services,
                name: self.name,
                email: self.email,
                phone: self.phone,
            }),
        };
        Ok(OperationRequest {
            operation,
            language,
            api_key,
        })
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: de::DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        v => serde_json::from_value(v).map_err(de::Error::custom),
    }
}
