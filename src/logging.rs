use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const MAX_LOG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Stdout logging, plus a size-capped file when `log_file` is given.
pub fn init_logging(log_level: Level, log_file: Option<&str>) {
    let level_filter = LevelFilter::from_level(log_level);
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(io::stdout);

    if let Some(path) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(make_capped_file_writer(PathBuf::from(path), MAX_LOG_FILE_BYTES));
        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(level_filter))
            .with(file_layer.with_filter(level_filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(level_filter))
            .init();
    }
}

fn make_capped_file_writer(path: PathBuf, max_len: u64) -> impl Fn() -> CappedFileWriter {
    let lock = Arc::new(Mutex::new(()));
    move || CappedFileWriter { path: path.clone(), max_len, lock: lock.clone() }
}

/// Appends to `path`; once the file reaches `max_len` only its newest half is kept.
struct CappedFileWriter {
    path: PathBuf,
    max_len: u64,
    lock: Arc<Mutex<()>>,
}

fn keep_tail(path: &Path, keep_bytes: u64) -> io::Result<()> {
    let mut tail = Vec::new();
    let mut rf = OpenOptions::new().read(true).open(path)?;
    let size = rf.metadata()?.len();
    rf.seek(SeekFrom::Start(size.saturating_sub(keep_bytes)))?;
    rf.read_to_end(&mut tail)?;

    let mut wf = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
    wf.write_all(&tail)
}

impl Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;

        let too_big = std::fs::metadata(&self.path)
            .map(|meta| meta.len() >= self.max_len)
            .unwrap_or(false);
        if too_big {
            keep_tail(&self.path, self.max_len / 2)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}
