//! Core types for the policy assistant: chunks, metadata, retrieval
//! results, and the crate-wide error taxonomy.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============= Policy Metadata Schema =============

/// Kind of source document a chunk was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Company-wide employee handbook.
    Handbook,
    /// A dated policy update bulletin.
    PolicyUpdate,
    /// The intern onboarding FAQ.
    InternFaq,
}

/// How narrowly a policy section is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecificityLevel {
    General,
    RoleSpecific,
    DepartmentSpecific,
}

/// Employee groups a policy section applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    AllEmployees,
    FullTimeEmployees,
    Interns,
    Contractors,
    Managers,
}

impl Audience {
    /// Wire name used inside the comma-joined `applies_to` string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllEmployees => "all_employees",
            Self::FullTimeEmployees => "full_time_employees",
            Self::Interns => "interns",
            Self::Contractors => "contractors",
            Self::Managers => "managers",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "all_employees" => Some(Self::AllEmployees),
            "full_time_employees" => Some(Self::FullTimeEmployees),
            "interns" => Some(Self::Interns),
            "contractors" => Some(Self::Contractors),
            "managers" => Some(Self::Managers),
            _ => None,
        }
    }
}

/// Structured metadata attached to every policy chunk.
///
/// The field set is closed: values are drawn from the enumerated sets above,
/// so schema drift in collaborator output is caught at construction time
/// rather than at query time. On the wire this serializes to the flat
/// scalar map the vector store expects (`applies_to` is comma-joined).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_type: DocumentType,
    #[serde(with = "applies_to_wire")]
    pub applies_to: Vec<Audience>,
    /// Free-form topic tag, e.g. `remote_work`, `office_presence`, `pto`.
    pub policy_topic: String,
    pub specificity_level: SpecificityLevel,
    pub is_role_specific_intern: bool,
    pub is_authoritative_for_interns: bool,
    pub supersedes_older_policies: bool,
    pub conflict_resolution_note: bool,
    // Provenance
    pub document_version: String,
    pub effective_date: NaiveDate,
    pub author_department: String,
}

impl ChunkMetadata {
    /// Serialize to the flat scalar map stored alongside the embedding.
    pub fn to_wire_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            // A struct with named fields always serializes to an object.
            _ => serde_json::Map::new(),
        }
    }
}

/// `applies_to` travels as a single comma-joined string
/// (e.g. `"interns, contractors"`), matching the store's scalar-only
/// metadata values.
mod applies_to_wire {
    use super::Audience;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &[Audience], s: S) -> Result<S::Ok, S::Error> {
        let joined = v
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        s.serialize_str(&joined)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Audience>, D::Error> {
        let raw = String::deserialize(d)?;
        raw.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                Audience::parse(s)
                    .ok_or_else(|| de::Error::custom(format!("unknown audience: {}", s.trim())))
            })
            .collect()
    }
}

// ============= Chunk and Retrieval Types =============

/// One retrievable unit of policy text plus its structured metadata.
///
/// Chunks are created once at ingestion time and are immutable thereafter;
/// there is no update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// A retrieved chunk with its similarity distance.
///
/// Distance is a non-negative float; smaller means more similar. Ranked
/// results are ephemeral and ordered ascending by distance.
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

// ============= Error Types =============

/// Error taxonomy for one ingestion run or one question-answer turn.
///
/// Every variant aborts the current operation and is reported to the user
/// as a visible failure; nothing is retried and no partial state is kept.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no JSON object found in collaborator output")]
    NoJsonFound,

    #[error("collaborator output is not valid JSON: {0}")]
    JsonParse(String),

    #[error("ingestion response does not match the expected shape: {0}")]
    IngestionSchema(String),

    #[error("vector store rejected the filter: {0}")]
    InvalidFilter(String),

    #[error("collaborator unavailable: {0}")]
    Collaborator(String),

    #[error("vector store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
