//! Analysis aggregate and per-kind fragments.
//!
//! Each analysis kind owns a disjoint subset of the aggregate's fields, so
//! merging fragments from distinct kinds is commutative: the final aggregate
//! does not depend on completion order.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The four independent analysis kinds fanned out per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Moderation,
    Classification,
    Ocr,
    Metadata,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Moderation,
        AnalysisKind::Classification,
        AnalysisKind::Ocr,
        AnalysisKind::Metadata,
    ];

    /// Logical service name used in activity log entries.
    pub fn service_name(&self) -> &'static str {
        match self {
            AnalysisKind::Moderation => "Moderation Service",
            AnalysisKind::Classification => "Classifier Service",
            AnalysisKind::Ocr => "OCR Service",
            AnalysisKind::Metadata => "Metadata Service",
        }
    }

    /// Conservative default fragment substituted when this kind's provider
    /// call faults. One degraded kind must never fail the other three, nor
    /// the record.
    pub fn fallback_fragment(&self) -> AnalysisFragment {
        match self {
            AnalysisKind::Moderation => AnalysisFragment::Moderation {
                is_safe: true,
                safety_reason: Some("Service Unavailable - Defaulting to Safe".to_string()),
            },
            AnalysisKind::Classification => AnalysisFragment::Classification {
                tags: vec!["uncategorized".to_string()],
                suggested_folder: "General".to_string(),
            },
            AnalysisKind::Ocr => AnalysisFragment::Ocr {
                extracted_text: "OCR Service Timeout".to_string(),
            },
            AnalysisKind::Metadata => AnalysisFragment::Metadata {
                description: "Description unavailable".to_string(),
            },
        }
    }
}

impl Display for AnalysisKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AnalysisKind::Moderation => write!(f, "moderation"),
            AnalysisKind::Classification => write!(f, "classification"),
            AnalysisKind::Ocr => write!(f, "ocr"),
            AnalysisKind::Metadata => write!(f, "metadata"),
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moderation" => Ok(AnalysisKind::Moderation),
            "classification" => Ok(AnalysisKind::Classification),
            "ocr" => Ok(AnalysisKind::Ocr),
            "metadata" => Ok(AnalysisKind::Metadata),
            _ => Err(anyhow::anyhow!("Invalid analysis kind: {}", s)),
        }
    }
}

/// The partial result produced by one analysis kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisFragment {
    Moderation {
        is_safe: bool,
        /// Human-readable reason when unsafe, or a "safe" sentinel.
        safety_reason: Option<String>,
    },
    Classification {
        tags: Vec<String>,
        suggested_folder: String,
    },
    Ocr {
        extracted_text: String,
    },
    Metadata {
        description: String,
    },
}

impl AnalysisFragment {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisFragment::Moderation { .. } => AnalysisKind::Moderation,
            AnalysisFragment::Classification { .. } => AnalysisKind::Classification,
            AnalysisFragment::Ocr { .. } => AnalysisKind::Ocr,
            AnalysisFragment::Metadata { .. } => AnalysisKind::Metadata,
        }
    }
}

/// Cumulative analysis aggregate on a file record.
///
/// Fields are independently optional until the owning kind's fragment
/// merges. A merge never clears a previously set field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_safe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AnalysisResult {
    /// Field-wise union of a fragment into the aggregate. Only the fields
    /// owned by the fragment's kind are touched.
    pub fn merge(&mut self, fragment: &AnalysisFragment) {
        match fragment {
            AnalysisFragment::Moderation {
                is_safe,
                safety_reason,
            } => {
                self.is_safe = Some(*is_safe);
                if safety_reason.is_some() {
                    self.safety_reason = safety_reason.clone();
                }
            }
            AnalysisFragment::Classification {
                tags,
                suggested_folder,
            } => {
                self.tags = Some(tags.clone());
                self.suggested_folder = Some(suggested_folder.clone());
            }
            AnalysisFragment::Ocr { extracted_text } => {
                self.extracted_text = Some(extracted_text.clone());
            }
            AnalysisFragment::Metadata { description } => {
                self.description = Some(description.clone());
            }
        }
    }
}
