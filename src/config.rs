use chrono::FixedOffset;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crossing::BoundaryLine;
use crate::error::Error;

/// Per-class minimum confidence for drawing a detection. Has no effect on
/// counting.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceThresholds {
    pub per_class: BTreeMap<i32, f32>,
    pub fallback: f32,
}

impl ConfidenceThresholds {
    pub fn new(per_class: BTreeMap<i32, f32>, fallback: f32) -> Self {
        Self {
            per_class,
            fallback,
        }
    }

    #[inline]
    pub fn threshold(&self, class: i32) -> f32 {
        self.per_class.get(&class).copied().unwrap_or(self.fallback)
    }

    #[inline]
    pub fn passes(&self, class: i32, confidence: f32) -> bool {
        confidence >= self.threshold(class)
    }
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self::new(
            BTreeMap::from([(0, 0.6), (1, 0.5), (2, 0.6)]),
            0.5,
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    /// Explicit counting line; the horizontal midline of the frame when unset.
    pub boundary: Option<BoundaryLine>,
    /// Class id to minimum drawing confidence.
    pub confidence_thresholds: BTreeMap<i32, f32>,
    /// Threshold for class ids missing from `confidence_thresholds`.
    pub default_threshold: f32,
    pub record_interval_secs: u64,
    pub tag: String,
    pub data_dir: PathBuf,
    pub utc_offset_hours: i32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            boundary: None,
            confidence_thresholds: ConfidenceThresholds::default().per_class,
            default_threshold: ConfidenceThresholds::default().fallback,
            record_interval_secs: 300,
            tag: "TX2_6".to_string(),
            data_dir: PathBuf::from("bee_data"),
            utc_offset_hours: 8,
        }
    }
}

impl CounterConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: CounterConfig = serde_yaml::from_str(&contents)?;

        Ok(config)
    }

    pub fn thresholds(&self) -> ConfidenceThresholds {
        ConfidenceThresholds::new(self.confidence_thresholds.clone(), self.default_threshold)
    }

    pub fn boundary_line(&self) -> Result<BoundaryLine, Error> {
        match self.boundary {
            Some(line) => Ok(line),
            None => BoundaryLine::horizontal_midline(self.frame_width, self.frame_height),
        }
    }

    #[inline]
    pub fn record_interval(&self) -> Duration {
        Duration::from_secs(self.record_interval_secs)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, Error> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(Error::InvalidOffset(self.utc_offset_hours))
    }
}
