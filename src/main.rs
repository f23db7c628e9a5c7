use anyhow::{Context, Result};
use beecount::recorder::{now_in, CsvSink, PeriodicRecorder};
use beecount::{count_lines, CounterConfig, FrameLines, FrameProcessor};
use clap::Parser;
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const RECORDER_TICK: Duration = Duration::from_secs(1);

/// Counts tracked objects crossing a boundary line.
///
/// Reads one JSON array of detections per line (one line per frame) and
/// periodically appends in/out counts per class to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "beecount")]
struct Args {
    /// YAML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Detections file, `-` for stdin
    #[arg(long, short, default_value = "-")]
    input: String,
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    interval_secs: Option<u64>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Print every counted crossing as a JSON line on stdout
    #[arg(long)]
    print_crossings: bool,
}

impl Args {
    fn into_config(self) -> Result<(CounterConfig, String, bool)> {
        let mut config = match &self.config {
            Some(path) => CounterConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CounterConfig::default(),
        };

        if let Some(tag) = self.tag {
            config.tag = tag;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(secs) = self.interval_secs {
            config.record_interval_secs = secs;
        }
        if let Some(width) = self.width {
            config.frame_width = width;
        }
        if let Some(height) = self.height {
            config.frame_height = height;
        }

        Ok((config, self.input, self.print_crossings))
    }
}

fn open_input(input: &str) -> Result<Box<dyn BufRead + Send>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }

    let file = std::fs::File::open(input).with_context(|| format!("opening {}", input))?;
    Ok(Box::new(BufReader::new(file)))
}

fn run_recorder(
    mut recorder: PeriodicRecorder<CsvSink>,
    offset: chrono::FixedOffset,
    shutdown: Receiver<()>,
    _running: Sender<()>,
) -> Result<()> {
    let ticker = tick(RECORDER_TICK);

    loop {
        select! {
            recv(ticker) -> _ => {
                recorder.poll(now_in(offset))?;
            }
            recv(shutdown) -> _ => break,
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beecount=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, input, print_crossings) = Args::parse().into_config()?;

    let line = config.boundary_line()?;
    let offset = config.utc_offset()?;
    let started_at = now_in(offset);

    let mut processor = FrameProcessor::new(line, config.thresholds());
    let sink = CsvSink::new(&config.data_dir, &config.tag, started_at)
        .with_context(|| format!("preparing {}", config.data_dir.display()))?;

    let endpoints: [[f32; 2]; 2] = line.into();
    info!(
        line = ?endpoints,
        interval_secs = config.record_interval_secs,
        csv = %sink.path().display(),
        "counter started"
    );

    let recorder = PeriodicRecorder::new(
        processor.aggregator(),
        sink,
        config.tag.clone(),
        config.record_interval(),
        started_at,
    );

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    // dropped when the recorder thread exits, which ends the input early
    let (running_tx, running_rx) = bounded::<()>(1);
    let recorder_handle =
        thread::spawn(move || run_recorder(recorder, offset, shutdown_rx, running_tx));

    let lines = FrameLines::spawn(open_input(&input)?, running_rx);
    let stdout = std::io::stdout();
    let outcome = count_lines(&mut processor, lines, |_, report| {
        if print_crossings {
            let mut out = stdout.lock();
            for crossing in &report.crossings {
                serde_json::to_writer(&mut out, crossing)?;
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    });

    // a closed channel also wakes the recorder
    drop(shutdown_tx);
    let recorder_outcome = recorder_handle
        .join()
        .map_err(|_| anyhow::anyhow!("recorder thread panicked"))?;

    // a sink failure is what stopped the input, so report it first
    recorder_outcome?;
    let stats = outcome?;

    let unflushed = processor.aggregator().snapshot();
    info!(
        frames = stats.frames,
        skipped = stats.skipped,
        tracks = processor.history().len(),
        crossed = processor.history().crossed_count(),
        unflushed = %serde_json::to_string(&unflushed)?,
        "input exhausted, unflushed counts are dropped"
    );

    Ok(())
}
