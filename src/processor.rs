use std::sync::Arc;

use crate::config::ConfidenceThresholds;
use crate::counts::CountAggregator;
use crate::crossing::{BoundaryLine, Crossing, CrossingDetector};
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;
use crate::history::TrackHistory;

/// Outcome of one processed frame.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Crossings counted in this frame, in detection order.
    pub crossings: Vec<Crossing>,
    /// Indexes of the detections confident enough to be drawn.
    pub visible: Vec<usize>,
    pub mean_confidence: f32,
}

/// Owns the per-track state of the frame-processing path and feeds crossings
/// into a shared `CountAggregator`.
pub struct FrameProcessor {
    history: TrackHistory,
    detector: CrossingDetector,
    thresholds: ConfidenceThresholds,
    counts: Arc<CountAggregator>,
    frames_seen: u64,
}

impl FrameProcessor {
    pub fn new(line: BoundaryLine, thresholds: ConfidenceThresholds) -> Self {
        Self::with_aggregator(line, thresholds, Arc::new(CountAggregator::new()))
    }

    pub fn with_aggregator(
        line: BoundaryLine,
        thresholds: ConfidenceThresholds,
        counts: Arc<CountAggregator>,
    ) -> Self {
        Self {
            history: TrackHistory::new(),
            detector: CrossingDetector::new(line),
            thresholds,
            counts,
            frames_seen: 0,
        }
    }

    /// Handle for the recorder side.
    #[inline]
    pub fn aggregator(&self) -> Arc<CountAggregator> {
        Arc::clone(&self.counts)
    }

    #[inline]
    pub fn history(&self) -> &TrackHistory {
        &self.history
    }

    #[inline]
    pub fn line(&self) -> &BoundaryLine {
        self.detector.line()
    }

    #[inline]
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Every detection feeds the history and crossing check regardless of its
    /// confidence; thresholds only decide visibility.
    pub fn process_detections(&mut self, detections: &[Detection]) -> Result<FrameReport, Error> {
        self.frames_seen += 1;

        let mut report = FrameReport::default();

        for (idx, det) in detections.iter().enumerate() {
            if self.thresholds.passes(det.class, det.confidence) {
                report.visible.push(idx);
            }

            self.history.observe(det.track_id, det.class, det.centroid());

            if let Some(crossing) = self.detector.evaluate(&mut self.history, det.track_id) {
                self.counts.increment(crossing.class, crossing.direction)?;
                report.crossings.push(crossing);
            }
        }

        if !detections.is_empty() {
            report.mean_confidence =
                detections.iter().map(|d| d.confidence).sum::<f32>() / detections.len() as f32;
        }

        Ok(report)
    }

    #[inline]
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameReport, Error> {
        self.process_detections(&frame.detections)
    }
}
