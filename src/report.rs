//! Serializable summary of an analysis run.
//!
//! The crate never renders results itself. A report gathers the numeric
//! evidence so that a caller can store it or hand it to a plotting tool.

use crate::attack::{AttackOutcome, AttackReport};
use crate::pov::SweepCurve;
use crate::rs::Detection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of an oracle attack, without the image data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSummary {
    /// How the attack ended.
    pub outcome: AttackOutcome,
    /// Detector queries made.
    pub probes: usize,
    /// LSB-clearing passes that changed the image.
    pub modifications: usize,
    /// Samples changed in total.
    pub samples_changed: usize,
    /// The detector's answer on the final image.
    pub final_detection: Detection,
}

impl From<&AttackReport> for AttackSummary {
    fn from(report: &AttackReport) -> Self {
        Self {
            outcome: report.outcome,
            probes: report.probes,
            modifications: report.modifications,
            samples_changed: report.samples_changed,
            final_detection: report.detection.clone(),
        }
    }
}

/// Everything one run found about one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// When the report was started.
    pub generated_at: DateTime<Utc>,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// The mask used by the RS detector, one `0`/`1` string per row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mask: Vec<String>,
    /// Chi-square curves, one per channel.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chi_square: Vec<SweepCurve>,
    /// RS verdict, if the detector ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rs: Option<Detection>,
    /// Oracle attack summary, if one ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<AttackSummary>,
}

impl AnalysisReport {
    /// Starts an empty report for an image of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            width,
            height,
            mask: Vec::new(),
            chi_square: Vec::new(),
            rs: None,
            attack: None,
        }
    }

    /// Renders the report as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
