use structopt::StructOpt;

#[derive(StructOpt, Debug)]
pub struct Opts {
    /// The serial device to test, instead of probing the default candidates
    #[structopt(env = "SERIAL_PORT", short = "p", long = "port")]
    pub serial_port: Option<String>,

    /// The serial baud rate the device listens at
    #[structopt(
        env = "BAUD_RATE",
        short = "b",
        long = "baud-rate",
        default_value = "9600"
    )]
    pub baud_rate: u32,
}
