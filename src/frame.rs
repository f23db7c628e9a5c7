use crate::detection::Detection;

/// All detections the tracker reported for one video frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Position in the input; line-oriented input uses the 1-based line number.
    pub index: u64,
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(index: u64, detections: Vec<Detection>) -> Self {
        Self { index, detections }
    }
}
