use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use gpac_training::observer::RunObserver;

use crate::util;

/// Result log of a training session.
///
/// ```text
/// Result Log
/// config: <path>
/// seed: <seed>
///
/// <config file contents>
///
/// Run 1
/// <eval>\t<best fitness>
/// ...
/// ```
///
/// One row is written per improvement of the run's best fitness. Write
/// errors are held until [`LogFile::finish`]; later events are dropped once
/// one has occurred. The buffer is flushed on drop as well.
#[derive(Debug)]
pub struct LogFile<W: Write = BufWriter<File>> {
    writer: W,
    path: PathBuf,
    error: Option<io::Error>,
}

impl LogFile {
    pub fn create(
        path: &Path,
        config_path: &Path,
        config_text: &str,
        seed: u64,
    ) -> anyhow::Result<Self> {
        let writer = util::create_file("log", path)?;
        let mut log = Self::new(writer, path.to_owned());
        log.write_header(config_path, config_text, seed)
            .with_context(|| format!("Failed to write log file: {}", path.display()))?;
        Ok(log)
    }
}

impl<W> LogFile<W>
where
    W: Write,
{
    fn new(writer: W, path: PathBuf) -> Self {
        Self {
            writer,
            path,
            error: None,
        }
    }

    fn write_header(&mut self, config_path: &Path, config_text: &str, seed: u64) -> io::Result<()> {
        writeln!(self.writer, "Result Log")?;
        writeln!(self.writer, "config: {}", config_path.display())?;
        writeln!(self.writer, "seed: {seed}")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", config_text.trim_end())?;
        Ok(())
    }

    fn write_with<F>(&mut self, f: F)
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = f(&mut self.writer) {
            self.error = Some(e);
        }
    }

    /// Flushes the log and reports the first write error, if any.
    pub fn finish(mut self) -> anyhow::Result<()> {
        let result = match self.error.take() {
            Some(e) => Err(e),
            None => self.writer.flush(),
        };
        result.with_context(|| format!("Failed to write log file: {}", self.path.display()))
    }
}

impl<W> RunObserver for LogFile<W>
where
    W: Write,
{
    fn run_started(&mut self, run: u32) {
        self.write_with(|w| {
            writeln!(w)?;
            writeln!(w, "Run {run}")
        });
    }

    fn improved(&mut self, eval_count: usize, best_fitness: f64) {
        self.write_with(|w| writeln!(w, "{eval_count}\t{best_fitness}"));
    }
}

impl<W> Drop for LogFile<W>
where
    W: Write,
{
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> LogFile<Vec<u8>> {
        LogFile::new(Vec::new(), PathBuf::from("log.txt"))
    }

    fn contents(log: &LogFile<Vec<u8>>) -> String {
        String::from_utf8(log.writer.clone()).unwrap()
    }

    #[test]
    fn test_log_format() {
        let mut log = log();
        log.write_header(Path::new("run.toml"), "[evolution]\nmu = 2\n", 42)
            .unwrap();
        log.run_started(1);
        log.improved(1, 12.0);
        log.improved(5, 37.0);
        log.run_started(2);
        log.improved(1, 20.0);

        assert_eq!(
            contents(&log),
            "Result Log\nconfig: run.toml\nseed: 42\n\n[evolution]\nmu = 2\n\
             \nRun 1\n1\t12\n5\t37\n\nRun 2\n1\t20\n"
        );
        log.finish().unwrap();
    }

    #[derive(Debug)]
    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_is_reported_on_finish() {
        let mut log = LogFile::new(FailingWriter, PathBuf::from("log.txt"));
        log.run_started(1);
        log.improved(1, 3.0);
        let err = log.finish().unwrap_err();
        assert!(format!("{err:#}").contains("disk full"));
    }
}
