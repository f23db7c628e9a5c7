pub mod bbox;
pub mod class;
pub mod config;
pub mod counts;
pub mod crossing;
pub mod detection;
pub mod error;
pub mod frame;
pub mod history;
pub mod math;
pub mod processor;
pub mod recorder;
pub mod runner;

mod circular_queue;
mod track;

pub use class::Class;
pub use config::{ConfidenceThresholds, CounterConfig};
pub use counts::{CountAggregator, CountTable, DirectionCounts};
pub use crossing::{BoundaryLine, Crossing, CrossingDetector, Direction};
pub use detection::{Detection, DetectionBox};
pub use error::Error;
pub use frame::Frame;
pub use processor::{FrameProcessor, FrameReport};
pub use recorder::{CsvSink, FlushRecord, PeriodicRecorder, RecordSink};
pub use runner::{count_lines, FrameLines, RunStats};
pub use track::Track;
