//! Single-threaded capture loop.
//!
//! Each tick runs two independent, non-blocking steps: drain whatever bytes
//! the transport has buffered through the tokenizer and session, then relay
//! at most one pending operator key. The loop sleeps briefly between ticks
//! and stops when the shared `running` flag is cleared.

use crate::capture::{CaptureSession, Command, CommandRelay, Outcome, RecordWriter, WrittenRecord};
use crate::error::Result;
use crate::stats::SharedCaptureStats;
use crate::stream::{LineTokenizer, Token, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Size of each read from the transport.
const READ_CHUNK: usize = 1024;

/// Sleep for `duration` in `step` slices, returning early once `running` is cleared.
///
/// Returns whether the run should continue.
pub fn wait_while_running(duration: Duration, step: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(step.min(deadline - now));
    }
    false
}

/// Owns the transport and every piece of loop state.
pub struct CaptureRunner<T: Transport> {
    transport: T,
    tokenizer: LineTokenizer,
    session: CaptureSession,
    writer: RecordWriter,
    relay: Option<CommandRelay>,
    stats: SharedCaptureStats,
    poll_interval: Duration,
    read_buf: Vec<u8>,
}

impl<T: Transport> CaptureRunner<T> {
    pub fn new(
        transport: T,
        writer: RecordWriter,
        stats: SharedCaptureStats,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transport,
            tokenizer: LineTokenizer::new(),
            session: CaptureSession::new(),
            writer,
            relay: None,
            stats,
            poll_interval,
            read_buf: vec![0; READ_CHUNK],
        }
    }

    /// Forward operator keys to the device on every tick.
    pub fn with_relay(mut self, relay: CommandRelay) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Process the bytes currently buffered by the transport.
    ///
    /// Returns the records written during this step. Only transport errors
    /// are returned; line, sample and write failures are logged and counted.
    pub fn poll_input(&mut self) -> Result<Vec<WrittenRecord>> {
        let mut remaining = self.transport.available()?;
        let mut written = Vec::new();

        while remaining > 0 {
            let want = remaining.min(self.read_buf.len());
            let n = self.transport.read(&mut self.read_buf[..want])?;
            if n == 0 {
                break;
            }
            remaining = remaining.saturating_sub(n);

            for token in self.tokenizer.push(&self.read_buf[..n]) {
                if let Some(record) = self.handle_token(token) {
                    written.push(record);
                }
            }
        }

        Ok(written)
    }

    /// Relay one pending operator key, if any.
    pub fn poll_commands(&mut self) -> Result<Option<Command>> {
        let Some(relay) = self.relay.as_mut() else {
            return Ok(None);
        };

        let command = relay.poll(&mut self.transport)?;
        if let Some(command) = command {
            self.stats.record_command_sent();
            match command {
                Command::Start => tracing::info!("Sent start command"),
                Command::Stop => tracing::info!("Sent stop command"),
            }
        }
        Ok(command)
    }

    /// One scheduler tick: input first, then commands.
    pub fn tick(&mut self) -> Result<Vec<WrittenRecord>> {
        let written = self.poll_input()?;
        self.poll_commands()?;
        Ok(written)
    }

    /// Run until `running` is cleared or the transport fails.
    ///
    /// Consumes the runner so the transport is dropped, and the port closed,
    /// on every exit path. An unfinished episode is discarded.
    pub fn run(mut self, running: &AtomicBool) -> Result<()> {
        let result = self.run_loop(running);

        let discarded = self.session.abort();
        self.tokenizer.reset();
        if discarded > 0 {
            self.stats.record_samples_discarded(discarded);
            tracing::warn!("Discarded {} samples from an unfinished capture", discarded);
        }

        if let Err(ref e) = result {
            tracing::error!("Capture loop stopped: {}", e);
        }
        result
    }

    fn run_loop(&mut self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            self.tick()?;
            thread::sleep(self.poll_interval);
        }
        Ok(())
    }

    fn handle_token(&mut self, token: Token) -> Option<WrittenRecord> {
        let line = match token {
            Token::Line(line) => line,
            Token::Undecodable(len) => {
                self.stats.record_decode_failure();
                tracing::debug!("Dropped undecodable line ({} bytes)", len);
                return None;
            }
            Token::Overlong => {
                self.stats.record_decode_failure();
                tracing::warn!("Dropped unterminated line longer than the tokenizer limit");
                return None;
            }
        };

        self.stats.record_line();

        match self.session.handle_line(&line) {
            Outcome::Started { discarded } => {
                self.stats.record_episode_started(discarded);
                if discarded > 0 {
                    tracing::warn!(
                        "Capture restarted, discarding {} buffered samples",
                        discarded
                    );
                } else {
                    tracing::info!("Capture started");
                }
                None
            }
            Outcome::Appended { .. } | Outcome::Unrecognized | Outcome::StrayEnd => None,
            Outcome::Rejected(e) => {
                self.stats.record_parse_failure();
                tracing::debug!("Skipped malformed sample {:?}: {}", line, e);
                None
            }
            Outcome::OutsideEpisode => {
                self.stats.record_stray_sample();
                None
            }
            Outcome::EmptyEpisode => {
                self.stats.record_empty_episode();
                tracing::warn!("No data was collected during this capture");
                None
            }
            Outcome::Completed(samples) => {
                let count = samples.len();
                match self.writer.write(samples) {
                    Ok(record) => {
                        self.stats.record_written(record.samples);
                        tracing::info!(
                            "Saved {} samples to {}",
                            record.samples,
                            record.path.display()
                        );
                        Some(record)
                    }
                    Err(e) => {
                        self.stats.record_write_failure();
                        tracing::error!("Failed to save capture of {} samples: {}", count, e);
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SessionState;
    use crate::stats::create_shared_stats;
    use crate::stream::{KeySource, MockTransport};
    use crossbeam_channel::bounded;

    fn runner(dir: &std::path::Path, mock: &MockTransport) -> CaptureRunner<MockTransport> {
        CaptureRunner::new(
            mock.clone(),
            RecordWriter::new(dir, "wave", "tester"),
            create_shared_stats(),
            Duration::from_millis(1),
        )
    }

    #[test]
    fn test_episode_split_across_reads() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new();
        let mut runner = runner(dir.path(), &mock);

        mock.inject_read(b"-,-,-\n1.0,2.");
        assert!(runner.tick().unwrap().is_empty());
        assert_eq!(runner.session().state(), SessionState::Collecting);

        mock.inject_read(b"0,3.0\nCapture complete\n");
        let written = runner.tick().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].samples, 1);
    }

    #[test]
    fn test_write_failure_does_not_stop_session() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new();
        let stats = create_shared_stats();
        let mut runner = CaptureRunner::new(
            mock.clone(),
            RecordWriter::new(dir.path().join("absent"), "wave", "tester"),
            stats.clone(),
            Duration::from_millis(1),
        );

        mock.inject_lines(&["-,-,-", "1,2,3", "Capture complete"]);
        assert!(runner.tick().unwrap().is_empty());
        assert_eq!(stats.stats().write_failures, 1);

        std::fs::create_dir_all(dir.path().join("absent")).unwrap();
        mock.inject_lines(&["-,-,-", "4,5,6", "Capture complete"]);
        assert_eq!(runner.tick().unwrap().len(), 1);
    }

    #[test]
    fn test_commands_are_relayed_each_tick() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new();
        let (sender, receiver) = bounded(4);
        let mut runner =
            runner(dir.path(), &mock).with_relay(CommandRelay::new(KeySource::from_receiver(receiver)));

        sender.send('o').unwrap();
        runner.tick().unwrap();
        assert_eq!(mock.written(), b"o".to_vec());
    }

    #[test]
    fn test_run_stops_on_transport_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new();
        let runner = runner(dir.path(), &mock);

        mock.inject_lines(&["-,-,-", "1,2,3"]);
        mock.close();

        let running = AtomicBool::new(true);
        assert!(runner.run(&running).is_err());
    }

    #[test]
    fn test_interrupt_discards_active_episode() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new();
        let stats = create_shared_stats();
        let mut runner = CaptureRunner::new(
            mock.clone(),
            RecordWriter::new(dir.path(), "wave", "tester"),
            stats.clone(),
            Duration::from_millis(1),
        );

        mock.inject_lines(&["-,-,-", "1,2,3", "4,5,6", "7,8,9"]);
        assert!(runner.tick().unwrap().is_empty());
        assert_eq!(runner.session().buffered(), 3);

        let running = AtomicBool::new(false);
        assert!(runner.run(&running).is_ok());

        let snapshot = stats.stats();
        assert_eq!(snapshot.samples_discarded, 3);
        assert_eq!(snapshot.records_written, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_wait_completes_while_running() {
        let running = AtomicBool::new(true);
        assert!(wait_while_running(
            Duration::from_millis(5),
            Duration::from_millis(1),
            &running
        ));
    }

    #[test]
    fn test_wait_stops_when_interrupted() {
        let running = AtomicBool::new(false);
        let start = Instant::now();
        assert!(!wait_while_running(
            Duration::from_secs(30),
            Duration::from_millis(10),
            &running
        ));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_run_returns_when_flag_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new();
        let runner = runner(dir.path(), &mock);

        let running = AtomicBool::new(false);
        assert!(runner.run(&running).is_ok());
    }
}
