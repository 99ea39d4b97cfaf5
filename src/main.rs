use clap::Parser;
use rtu_serial_link::config::{Config, ConfigLoader};
use rtu_serial_link::logging::init_logging;
use rtu_serial_link::{
    hook_fn, HookContext, HookRegistry, Parity, RtuLink, SerialTransport, TransportError,
    TransportEvent,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, trace};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "rtu-probe",
    version,
    about = "Send one raw RTU frame over a serial line and print the response.",
    long_about = "Opens the configured serial device, writes a hex-encoded request frame, then reads the expected number of response bytes before the request deadline. Framing and CRC are the caller's responsibility."
)]
struct Args {
    /// Configuration file (defaults to the standard search path).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device path, overriding the configuration.
    #[arg(short, long)]
    device: Option<String>,

    /// Baud rate, overriding the configuration.
    #[arg(short, long)]
    baud: Option<u32>,

    /// Parity (none, even, odd), overriding the configuration.
    #[arg(long)]
    parity: Option<Parity>,

    /// Request deadline in milliseconds, overriding the configuration.
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Number of response bytes to wait for.
    #[arg(short = 'n', long, default_value_t = 0)]
    response_len: usize,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Save the effective configuration to this file and exit.
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Request frame as hex, e.g. 01030000000A C5CD
    #[arg(num_args = 0..)]
    frame: Vec<String>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(ref device) = self.device {
            config.serial.device = device.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(parity) = self.parity {
            config.serial.parity = parity;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.link.request_timeout_ms = timeout_ms;
        }
    }
}

fn trace_hooks() -> HookRegistry<TransportEvent> {
    let hook = hook_fn(|ctx: &HookContext<'_, TransportEvent>| {
        trace!(device = ctx.device, event = ?ctx.event, at = %ctx.timestamp, "hook");
    });
    HookRegistry::from_map(
        [
            "beforeReceive",
            "afterReceive",
            "beforeTransmit",
            "afterTransmit",
        ]
        .into_iter()
        .map(|name| (name, Arc::clone(&hook))),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = match args.config {
        Some(ref path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    args.apply(&mut loader.config);
    loader.config().validate()?;

    if args.print_config {
        print!("{}", toml::to_string_pretty(loader.config())?);
        return Ok(());
    }
    if let Some(ref path) = args.write_config {
        loader.save_to(path)?;
        println!("{}", path.display());
        return Ok(());
    }
    let config = loader.into_config();

    init_logging(&config.logging)?;

    let request = hex::decode(args.frame.concat())?;
    let port_config = Arc::new(config.serial.port_config()?);
    let mut link = SerialTransport::new(Arc::clone(&port_config), Arc::new(trace_hooks()))
        .with_poll_timeout(config.link.poll_timeout());

    link.open()?;
    info!(device = %port_config.device, baud = port_config.baud_rate, "port open");

    let started = Instant::now();
    let response = exchange_and_close(
        &mut link,
        &request,
        args.response_len,
        config.link.request_timeout(),
    )?;
    info!(
        sent = request.len(),
        received = response.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "exchange complete"
    );
    println!("{}", hex::encode_upper(&response));
    Ok(())
}

/// Run one exchange and close the link, reporting the exchange failure
/// ahead of any close failure.
fn exchange_and_close(
    link: &mut impl RtuLink,
    request: &[u8],
    response_len: usize,
    timeout: Duration,
) -> Result<Vec<u8>, TransportError> {
    let response = exchange(link, request, response_len, timeout);
    let closed = link.close();
    let response = response?;
    closed?;
    Ok(response)
}

fn exchange(
    link: &mut impl RtuLink,
    request: &[u8],
    response_len: usize,
    timeout: Duration,
) -> Result<Vec<u8>, TransportError> {
    if !request.is_empty() {
        link.write(request)?;
    }
    link.set_deadline(Instant::now() + timeout);

    let mut response = vec![0u8; response_len];
    link.read_full(&mut response)?;
    Ok(response)
}
