use std::io;
use std::str::Utf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error when opening serial port {}: {}", _0, _1)]
    Open(String, #[source] serialport::Error),
    #[error("I/O error on serial channel: {}", _0)]
    Io(#[from] io::Error),
    #[error("Response is not valid UTF-8: {}", _0)]
    Decode(#[from] Utf8Error),
    #[error("None of the candidate serial ports could be opened")]
    NoPortAvailable,
}
