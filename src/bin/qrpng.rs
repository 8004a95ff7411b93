use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

use clap::Parser;
use qrpng::{EncodeError, QrCodeEcc, QrEncoder};
use tracing::info;

static TRACING_INIT: Once = Once::new();

/// Enable with `RUST_LOG=qrpng=debug` or `RUST_LOG=qrpng=trace`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}

#[derive(Parser, Debug)]
#[command(name = "qrpng", version, about = "Encode a file as a QR code PNG image")]
struct Cli {
    /// Error correction level: l, m, q or h
    #[arg(short, long, default_value = "m")]
    error: QrCodeEcc,
    /// Pixels per module (1 to 100)
    #[arg(short, long, default_value_t = 2)]
    module: u32,
    /// Quiet zone in pixels, at least four modules (default: the larger of 8 and four modules)
    #[arg(short, long)]
    quiet: Option<u32>,
    /// Read the input as UTF-8 text instead of raw bytes
    #[arg(short, long)]
    text: bool,
    /// ECI assignment value written ahead of the data (0 to 999999)
    #[arg(long)]
    eci: Option<u32>,
    /// File holding the data to encode
    input: PathBuf,
    /// Destination PNG file
    output: PathBuf,
}

/// Rewrites `/name:value` and `/flag` options into their `--name=value` form.
///
/// Anything that is not a known option name is passed through, so absolute
/// paths are left alone.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let rewritten = arg.to_str().and_then(|s| {
                let rest = s.strip_prefix('/')?;
                let (name, value) = match rest.split_once(':') {
                    Some((name, value)) => (name, Some(value)),
                    None => (rest, None),
                };
                let long = match (name.to_ascii_lowercase().as_str(), value) {
                    ("e" | "error", Some(_)) => "error",
                    ("m" | "module", Some(_)) => "module",
                    ("q" | "quiet", Some(_)) => "quiet",
                    ("eci", Some(_)) => "eci",
                    ("t" | "text", None) => "text",
                    _ => return None,
                };
                Some(match value {
                    Some(value) => format!("--{}={}", long, value),
                    None => format!("--{}", long),
                })
            });
            rewritten.map_or(arg, OsString::from)
        })
        .collect()
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

fn run(cli: &Cli) -> Result<(), EncodeError> {
    if !has_png_extension(&cli.output) {
        return Err(EncodeError::invalid(format!(
            "output file {} must end in .png",
            cli.output.display()
        )));
    }

    let mut encoder = QrEncoder::new()
        .error_correction(cli.error)
        .module_size(cli.module)?
        .eci(cli.eci)?;
    if let Some(quiet) = cli.quiet {
        encoder = encoder.quiet_zone(quiet)?;
    }

    let data = std::fs::read(&cli.input)?;
    let qr = if cli.text {
        let text = std::str::from_utf8(&data)
            .map_err(|e| EncodeError::invalid(format!("input is not valid UTF-8: {}", e)))?;
        encoder.encode_text(text)?
    } else {
        encoder.encode_bytes(&data)?
    };
    info!(
        version = qr.version().value(),
        size = qr.size(),
        mask = qr.mask().value(),
        "encoded {}",
        cli.input.display()
    );

    let file = File::create(&cli.output)?;
    encoder.write_png(file)?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("qrpng: {}", err);
            ExitCode::FAILURE
        }
    }
}
