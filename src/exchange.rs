use std::io;
use std::str;
use std::thread;
use std::time::Duration;

use log::{debug, trace};

/// An interface for the line-oriented duplex link the exchange loop drives.
///
/// Implemented by [`SerialChannel`](crate::SerialChannel) for real hardware and
/// by scripted responders in tests.
pub trait Channel {
    /// Writes `data` to the link and flushes it.
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Returns the number of bytes that can currently be read without blocking.
    fn available(&mut self) -> io::Result<u32>;

    /// Reads raw bytes up to and including the next newline, or whatever has
    /// arrived once the read timeout elapses.
    fn read_line(&mut self) -> io::Result<Vec<u8>>;
}

/// How an actual response is judged against the expected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The response must equal the expected value after trimming.
    Exact(&'static str),
    /// The response must start with the expected value.
    Prefix(&'static str),
    /// The response must equal one member of the expected set.
    OneOf(&'static [&'static str]),
}

impl Expectation {
    pub fn matches(&self, response: &str) -> bool {
        match self {
            Expectation::Exact(expected) => response == *expected,
            Expectation::Prefix(expected) => response.starts_with(expected),
            Expectation::OneOf(expected) => expected.contains(&response),
        }
    }
}

/// One command/expected-response pair under verification.
#[derive(Debug, Clone, Copy)]
pub struct TestCase {
    pub command: &'static str,
    pub expectation: Expectation,
}

/// The built-in command sequence exercised against the device. The two
/// `status` probes bracket the LED toggle so both states are observed.
pub const LINK_TEST_CASES: &[TestCase] = &[
    TestCase {
        command: "ping",
        expectation: Expectation::Exact("pong"),
    },
    TestCase {
        command: "led_on",
        expectation: Expectation::Exact("led_on_ok"),
    },
    TestCase {
        command: "status",
        expectation: Expectation::OneOf(&["led_on", "led_off"]),
    },
    TestCase {
        command: "led_off",
        expectation: Expectation::Exact("led_off_ok"),
    },
    TestCase {
        command: "status",
        expectation: Expectation::OneOf(&["led_on", "led_off"]),
    },
    TestCase {
        command: "test",
        expectation: Expectation::Exact("test_ok"),
    },
    TestCase {
        command: "invalid_cmd",
        expectation: Expectation::Exact("unknown_command"),
    },
];

/// The per-test-case verification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// The device answered, but not with the expected text.
    Mismatch { response: String },
    /// No bytes arrived within the settle delay, or the read came back empty.
    NoResponse,
    /// Writing, reading or decoding failed for this case.
    ChannelError { message: String },
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

/// Timing parameters for the exchange loop.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeConfig {
    /// Pause after writing a command, before attempting to read a response.
    pub settle: Duration,
    /// Pause between commands so the device is not overrun.
    pub pause: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            settle: Duration::from_millis(500),
            pause: Duration::from_secs(1),
        }
    }
}

/// Runs every test case against the channel, in order, and returns one
/// outcome per case. A failed case never aborts the run.
pub fn run_exchange<C: Channel>(
    channel: &mut C,
    cases: &[TestCase],
    config: &ExchangeConfig,
) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(cases.len());

    for (index, case) in cases.iter().enumerate() {
        debug!("Test {}: sending {:?}", index + 1, case.command);

        let outcome = run_case(channel, case, config);

        debug!("Test {}: {:?}", index + 1, outcome);
        outcomes.push(outcome);

        thread::sleep(config.pause);
    }

    outcomes
}

/// Returns true only if every outcome is a pass.
pub fn all_passed(outcomes: &[Outcome]) -> bool {
    outcomes.iter().all(Outcome::is_pass)
}

fn run_case<C: Channel>(channel: &mut C, case: &TestCase, config: &ExchangeConfig) -> Outcome {
    let mut frame = Vec::with_capacity(case.command.len() + 1);
    frame.extend_from_slice(case.command.as_bytes());
    frame.push(b'\n');

    if let Err(err) = channel.send(&frame) {
        return Outcome::ChannelError {
            message: err.to_string(),
        };
    }

    thread::sleep(config.settle);

    match channel.available() {
        Ok(0) => return Outcome::NoResponse,
        Ok(count) => trace!("{} bytes waiting", count),
        Err(err) => {
            return Outcome::ChannelError {
                message: err.to_string(),
            }
        }
    }

    let raw = match channel.read_line() {
        Ok(raw) => raw,
        Err(err) => {
            return Outcome::ChannelError {
                message: err.to_string(),
            }
        }
    };

    let response = match str::from_utf8(&raw) {
        Ok(text) => text.trim(),
        Err(err) => {
            return Outcome::ChannelError {
                message: err.to_string(),
            }
        }
    };

    // Bytes were reported waiting but the line read still came back empty.
    if response.is_empty() {
        return Outcome::NoResponse;
    }

    if case.expectation.matches(response) {
        Outcome::Pass
    } else {
        Outcome::Mismatch {
            response: response.to_owned(),
        }
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;
    use std::io;

    use super::Channel;

    /// One scripted reaction to a received command.
    #[derive(Debug, Clone, Copy)]
    pub enum Reply {
        /// Answer with the given text, newline-terminated.
        Line(&'static str),
        /// Answer with the given raw bytes, as-is.
        Raw(&'static [u8]),
        /// Never answer.
        Silence,
        /// Report a byte waiting but yield nothing on read.
        Ghost,
        /// Fail the write itself.
        Broken,
    }

    /// In-memory responder that plays back a fixed reply script.
    pub struct ScriptedChannel {
        replies: VecDeque<Reply>,
        pending: Option<Vec<u8>>,
        pub sent: Vec<Vec<u8>>,
    }

    impl ScriptedChannel {
        pub fn new(replies: &[Reply]) -> Self {
            ScriptedChannel {
                replies: replies.iter().copied().collect(),
                pending: None,
                sent: Vec::new(),
            }
        }
    }

    impl Channel for ScriptedChannel {
        fn send(&mut self, data: &[u8]) -> io::Result<()> {
            let reply = self.replies.pop_front();

            if let Some(Reply::Broken) = reply {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write failed"));
            }

            self.sent.push(data.to_vec());
            self.pending = match reply {
                Some(Reply::Line(text)) => {
                    let mut bytes = text.as_bytes().to_vec();
                    bytes.push(b'\n');
                    Some(bytes)
                }
                Some(Reply::Raw(bytes)) => Some(bytes.to_vec()),
                Some(Reply::Ghost) => Some(Vec::new()),
                Some(Reply::Silence) | Some(Reply::Broken) | None => None,
            };

            Ok(())
        }

        fn available(&mut self) -> io::Result<u32> {
            match &self.pending {
                Some(bytes) if bytes.is_empty() => Ok(1),
                Some(bytes) => Ok(bytes.len() as u32),
                None => Ok(0),
            }
        }

        fn read_line(&mut self) -> io::Result<Vec<u8>> {
            Ok(self.pending.take().unwrap_or_default())
        }
    }
}
