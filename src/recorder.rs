use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::class::Class;
use crate::counts::{CountAggregator, CountTable};
use crate::error::Error;

pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[inline]
pub fn now_in(offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset)
}

/// One flushed interval of counts.
#[derive(Debug, Clone, PartialEq)]
pub struct FlushRecord {
    pub dt: String,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub tag: String,
    pub counts: CountTable,
}

impl FlushRecord {
    pub fn new(at: DateTime<FixedOffset>, tag: &str, counts: CountTable) -> Self {
        Self {
            dt: at.format(DT_FORMAT).to_string(),
            day: at.day(),
            hour: at.hour(),
            minute: at.minute(),
            tag: tag.to_string(),
            counts,
        }
    }

    /// `dt, day, hour, minute, tag`, then `in_<class>, out_<class>` per class.
    pub fn header() -> Vec<String> {
        let mut names: Vec<String> = ["dt", "day", "hour", "minute", "tag"]
            .into_iter()
            .map(String::from)
            .collect();

        for class in Class::ALL {
            names.push(format!("in_{}", class.name()));
            names.push(format!("out_{}", class.name()));
        }

        names
    }

    /// Values in `header()` order.
    pub fn values(&self) -> Vec<String> {
        let mut values = vec![
            self.dt.clone(),
            self.day.to_string(),
            self.hour.to_string(),
            self.minute.to_string(),
            self.tag.clone(),
        ];

        for (_, counts) in self.counts.iter() {
            values.push(counts.inward.to_string());
            values.push(counts.outward.to_string());
        }

        values
    }
}

/// Durable destination for flushed records.
pub trait RecordSink {
    fn append(&mut self, record: &FlushRecord) -> Result<(), Error>;
}

impl RecordSink for Vec<FlushRecord> {
    fn append(&mut self, record: &FlushRecord) -> Result<(), Error> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn append(&mut self, record: &FlushRecord) -> Result<(), Error> {
        (**self).append(record)
    }
}

/// Appends records to `<data_dir>/<YYYY-MM>_<tag>_inout.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// The month in the file name is fixed at creation.
    pub fn new(
        data_dir: impl AsRef<Path>,
        tag: &str,
        created_at: DateTime<FixedOffset>,
    ) -> Result<Self, Error> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let name = format!("{}_{}_inout.csv", created_at.format("%Y-%m"), tag);

        Ok(Self {
            path: data_dir.join(name),
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &FlushRecord) -> Result<(), Error> {
        let exists = self.path.is_file();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut out = BufWriter::new(file);

        if !exists {
            write_row(&mut out, &FlushRecord::header())?;
        }
        write_row(&mut out, &record.values())?;
        out.flush()?;

        Ok(())
    }
}

fn write_row<W: Write>(out: &mut W, fields: &[String]) -> std::io::Result<()> {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.write_all(b",")?;
        }

        if field.contains([',', '"', '\n', '\r']) {
            write!(out, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            out.write_all(field.as_bytes())?;
        }
    }

    out.write_all(b"\r\n")
}

/// Drains the aggregator into a sink once per interval.
pub struct PeriodicRecorder<S> {
    counts: Arc<CountAggregator>,
    sink: S,
    tag: String,
    interval: Duration,
    last_flush: DateTime<FixedOffset>,
}

impl<S: RecordSink> PeriodicRecorder<S> {
    pub fn new(
        counts: Arc<CountAggregator>,
        sink: S,
        tag: impl Into<String>,
        interval: Duration,
        started_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            counts,
            sink,
            tag: tag.into(),
            interval,
            last_flush: started_at,
        }
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn last_flush(&self) -> DateTime<FixedOffset> {
        self.last_flush
    }

    /// True once strictly more than `interval` has passed since the last flush.
    pub fn is_due(&self, now: DateTime<FixedOffset>) -> bool {
        now.signed_duration_since(self.last_flush)
            .to_std()
            .map_or(false, |elapsed| elapsed > self.interval)
    }

    pub fn poll(&mut self, now: DateTime<FixedOffset>) -> Result<Option<FlushRecord>, Error> {
        if !self.is_due(now) {
            return Ok(None);
        }

        self.flush(now).map(Some)
    }

    /// Snapshots and resets the counts, then appends them to the sink. On a
    /// sink failure the snapshot goes back into the aggregator.
    pub fn flush(&mut self, now: DateTime<FixedOffset>) -> Result<FlushRecord, Error> {
        let table = self.counts.snapshot_and_reset();
        let record = FlushRecord::new(now, &self.tag, table);

        if let Err(err) = self.sink.append(&record) {
            warn!(error = %err, "record sink failed, keeping counts for the next flush");
            self.counts.merge(&table);
            return Err(err);
        }

        self.last_flush = now;

        info!(dt = %record.dt, tag = %record.tag, total = table.total(), "flushed counts");

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossing::Direction;
    use chrono::TimeZone;

    struct FailingSink;

    impl RecordSink for FailingSink {
        fn append(&mut self, _record: &FlushRecord) -> Result<(), Error> {
            Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")))
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 17, h, m, s)
            .unwrap()
    }

    #[test]
    fn header_and_values_line_up() {
        let mut table = CountTable::default();
        table.increment(Class::Worker, Direction::In);
        table.increment(Class::Drone, Direction::Out);

        let record = FlushRecord::new(at(9, 5, 30), "TX2_6", table);

        assert_eq!(
            FlushRecord::header(),
            vec![
                "dt", "day", "hour", "minute", "tag", "in_worker", "out_worker", "in_pollen",
                "out_pollen", "in_drone", "out_drone"
            ]
        );
        assert_eq!(
            record.values(),
            vec!["2024-05-17 09:05:30", "17", "9", "5", "TX2_6", "1", "0", "0", "0", "0", "1"]
        );
    }

    #[test]
    fn polls_only_after_the_interval() {
        let counts = Arc::new(CountAggregator::new());
        let mut recorder = PeriodicRecorder::new(
            Arc::clone(&counts),
            Vec::new(),
            "t",
            Duration::from_secs(300),
            at(10, 0, 0),
        );

        counts.increment(0, Direction::In).unwrap();

        assert_eq!(recorder.poll(at(10, 5, 0)).unwrap(), None);
        assert_eq!(recorder.poll(at(9, 0, 0)).unwrap(), None);

        let record = recorder.poll(at(10, 5, 1)).unwrap().unwrap();
        assert_eq!(record.counts.get(Class::Worker).inward, 1);
        assert_eq!(recorder.last_flush(), at(10, 5, 1));
        assert!(counts.snapshot().is_empty());

        assert_eq!(recorder.poll(at(10, 6, 0)).unwrap(), None);
        assert_eq!(recorder.sink().len(), 1);
    }

    #[test]
    fn failed_sink_keeps_counts() {
        let counts = Arc::new(CountAggregator::new());
        let mut recorder = PeriodicRecorder::new(
            Arc::clone(&counts),
            FailingSink,
            "t",
            Duration::from_secs(1),
            at(10, 0, 0),
        );

        counts.increment(1, Direction::Out).unwrap();

        assert!(recorder.flush(at(10, 1, 0)).is_err());
        assert_eq!(counts.snapshot().get(Class::Pollen).outward, 1);
        assert_eq!(recorder.last_flush(), at(10, 0, 0));
    }

    #[test]
    fn csv_sink_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("bee_data"), "TX2_6", at(0, 0, 0)).unwrap();

        assert_eq!(
            sink.path().file_name().unwrap().to_str().unwrap(),
            "2024-05_TX2_6_inout.csv"
        );

        let mut table = CountTable::default();
        table.increment(Class::Pollen, Direction::In);
        sink.append(&FlushRecord::new(at(12, 0, 0), "TX2_6", table)).unwrap();
        sink.append(&FlushRecord::new(at(12, 5, 0), "TX2_6", CountTable::default()))
            .unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "dt,day,hour,minute,tag,in_worker,out_worker,in_pollen,out_pollen,in_drone,out_drone"
        );
        assert_eq!(lines[1], "2024-05-17 12:00:00,17,12,0,TX2_6,0,0,1,0,0,0");
        assert_eq!(lines[2], "2024-05-17 12:05:00,17,12,5,TX2_6,0,0,0,0,0,0");
    }

    #[test]
    fn csv_fields_with_commas_are_quoted() {
        let mut out = Vec::new();
        write_row(&mut out, &["a,b".to_string(), "say \"hi\"".to_string(), "c".to_string()]).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "\"a,b\",\"say \"\"hi\"\"\",c\r\n");
    }
}
