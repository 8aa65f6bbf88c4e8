pub mod discover;
mod error;
pub mod exchange;

use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

pub use error::Error;

use log::debug;
pub use serialport;
use serialport::{DataBits, FlowControl, Parity, StopBits};

use exchange::Channel;

/// Read and write timeout applied to every opened port.
pub const SERIAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Serial connection with an open serial port, configured for the 8N1 framing
/// the link uses.
pub struct SerialChannel {
    name: String,
    port: Box<dyn serialport::SerialPort>,
}

impl fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialChannel")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate().ok())
            .finish()
    }
}

impl SerialChannel {
    /// Opens the given `port` as a `SerialChannel` with the given `baud_rate`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use linkcheck::SerialChannel;
    ///
    /// let channel = SerialChannel::open("/dev/ttyAMA0", 9600)?;
    ///
    /// # Ok::<(), linkcheck::Error>(())
    /// ```
    pub fn open(port: &str, baud_rate: u32) -> Result<SerialChannel, Error> {
        debug!("Opening serial port {:?} at {} baud", port, baud_rate);

        let handle = serialport::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .flow_control(FlowControl::None)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(SERIAL_TIMEOUT)
            .open()
            .map_err(|err| Error::Open(port.to_owned(), err))?;

        Ok(SerialChannel {
            name: port.to_owned(),
            port: handle,
        })
    }

    /// Returns the device path this channel was opened on.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Channel for SerialChannel {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn available(&mut self) -> io::Result<u32> {
        self.port.bytes_to_read().map_err(io::Error::from)
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    line.push(byte[0]);

                    if byte[0] == b'\n' {
                        break;
                    }
                }
                // Timing out mid-line yields whatever arrived so far.
                Err(ref err) if err.kind() == io::ErrorKind::TimedOut => break,
                Err(err) => return Err(err),
            }
        }

        Ok(line)
    }
}
