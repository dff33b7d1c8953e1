//! CAN Codec CLI Application
//!
//! Command-line front end for the can-codec library:
//! - `decode`: decode candump lines (stdin or `--frame`) to physical values
//! - `encode`: build a frame from `SIGNAL=VALUE` pairs
//! - `dump`: print message layouts

use anyhow::{bail, Context, Result};
use can_codec::Codec;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

mod config;
mod frames;
mod report;

use config::{AppConfig, OutputFormat};

/// CAN Codec - Encode and decode CAN frames with DBC signal layouts
#[derive(Parser, Debug)]
#[command(name = "can-codec")]
#[command(about = "Encode and decode CAN frames using DBC files", long_about = None)]
#[command(version)]
struct Args {
    /// Path to DBC file(s) (can be repeated)
    #[arg(long, value_name = "FILE", global = true)]
    dbc: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode frames given as candump lines
    Decode {
        /// Frame to decode, e.g. 1F0#C006E00000000000; reads stdin if omitted
        #[arg(long, value_name = "ID#DATA")]
        frame: Vec<String>,

        /// Decode frames shorter than the message length
        #[arg(long)]
        allow_truncated: bool,

        /// Print each decoded message on the same line as its frame
        #[arg(long)]
        single_line: bool,
    },
    /// Encode signal values into a frame
    Encode {
        /// Message name or hex frame ID (0x1F0)
        #[arg(short, long)]
        message: String,

        /// Physical signal values as NAME=VALUE
        #[arg(value_name = "SIGNAL=VALUE", required = true)]
        signals: Vec<String>,

        /// Fail when a value is outside its signal's range
        #[arg(long)]
        enforce_ranges: bool,

        /// Skip signal names the message does not have
        #[arg(long)]
        lenient: bool,

        /// Fill bits no signal covers from this byte (e.g. 0xFF) instead of zeros
        #[arg(long, value_name = "BYTE", value_parser = parse_byte)]
        padding: Option<u8>,
    },
    /// Print message layouts
    Dump {
        /// Only these messages (name or hex frame ID)
        #[arg(short, long)]
        message: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("CAN Codec CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using codec library v{}", can_codec::VERSION);

    let mut app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    app_config.input.dbc_files.extend(args.dbc.iter().cloned());
    if let Some(format) = args.format {
        app_config.output.format = format;
    }

    match &args.command {
        Command::Decode { allow_truncated, .. } if *allow_truncated => {
            app_config.codec.allow_truncated = true;
        }
        Command::Encode {
            enforce_ranges,
            lenient,
            padding,
            ..
        } => {
            if *enforce_ranges {
                app_config.codec.range_policy = can_codec::RangePolicy::Enforce;
            }
            if *lenient {
                app_config.codec.strict = false;
            }
            if padding.is_some() {
                app_config.codec.padding = *padding;
            }
        }
        _ => {}
    }

    let codec = load_codec(&app_config)?;
    let format = app_config.output.format;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.command {
        Command::Decode { frame, single_line, .. } => {
            let style = match format {
                OutputFormat::Json => LineStyle::Json,
                OutputFormat::Text if *single_line => LineStyle::SingleLine,
                OutputFormat::Text => LineStyle::MultiLine,
            };
            if frame.is_empty() {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    let line = line.context("Failed to read stdin")?;
                    decode_line(&codec, &line, style, &mut out)?;
                }
            } else {
                for line in frame {
                    decode_line(&codec, line, style, &mut out)?;
                }
            }
        }
        Command::Encode { message, signals, .. } => encode(&codec, message, signals, format, &mut out)?,
        Command::Dump { message } => dump(&codec, message, format, &mut out)?,
    }

    Ok(())
}

/// Build the codec and load every DBC file
fn load_codec(app_config: &AppConfig) -> Result<Codec> {
    if app_config.input.dbc_files.is_empty() {
        bail!("No DBC file given (use --dbc or [input] dbc_files in the config file)");
    }

    let mut codec = Codec::with_config(app_config.codec.clone());
    for dbc_path in &app_config.input.dbc_files {
        codec
            .add_dbc(dbc_path)
            .with_context(|| format!("Error loading DBC: {:?}", dbc_path))?;
    }

    let stats = codec.database_stats();
    log::info!("Signal database: {} messages, {} signals", stats.num_messages, stats.num_signals);
    Ok(codec)
}

/// How decoded lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    MultiLine,
    SingleLine,
    Json,
}

/// Decode one input line and write the result
///
/// In text mode, lines that hold no frame (blank lines, `vcan0  ERROR`)
/// pass through unchanged. Frames that fail to decode are reported inline
/// and do not stop the run.
fn decode_line(codec: &Codec, line: &str, style: LineStyle, out: &mut impl Write) -> Result<()> {
    let frame = match frames::parse_frame_line(line) {
        Ok(frame) => frame,
        Err(e) => {
            log::debug!("Not a frame: {:?}: {}", line, e);
            match style {
                LineStyle::Json if !line.trim().is_empty() => {
                    writeln!(out, "{}", report::error_json(line, &e.to_string())?)?
                }
                LineStyle::Json => {}
                _ => writeln!(out, "{}", line)?,
            }
            return Ok(());
        }
    };

    let text = match (codec.decode_message(frame.id, &frame.data), style) {
        (Ok(message), LineStyle::MultiLine) => report::decoded_text(line, &message),
        (Ok(message), LineStyle::SingleLine) => report::decoded_single_line(line, &message),
        (Ok(message), LineStyle::Json) => report::decoded_json(&message)?,
        (Err(e), LineStyle::Json) => report::error_json(line, &e.to_string())?,
        (Err(e), _) => report::error_text(line, &e.to_string()),
    };
    writeln!(out, "{}", text)?;
    Ok(())
}

fn encode(codec: &Codec, message: &str, signals: &[String], format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let layout = find_message(codec, message)?;

    let mut values: Vec<(&str, f64)> = Vec::with_capacity(signals.len());
    for pair in signals {
        values.push(parse_assignment(pair)?);
    }

    let data = codec.encode_message(layout.name(), &values)?;
    match format {
        OutputFormat::Text => writeln!(out, "{}", frames::format_compact(layout.frame_id(), &data))?,
        OutputFormat::Json => {
            let encoded = report::EncodedFrame {
                frame_id: layout.frame_id(),
                name: layout.name().to_string(),
                data: data.iter().map(|b| format!("{:02X}", b)).collect(),
            };
            writeln!(out, "{}", serde_json::to_string(&encoded)?)?;
        }
    }
    Ok(())
}

fn dump(codec: &Codec, messages: &[String], format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let layouts = if messages.is_empty() {
        codec.database().messages()
    } else {
        messages
            .iter()
            .map(|m| find_message(codec, m))
            .collect::<Result<Vec<_>>>()?
    };

    match format {
        OutputFormat::Text => {
            writeln!(out, "================================= Messages =================================")?;
            for layout in layouts {
                writeln!(out, "\n  ------------------------------------------------------------------------\n")?;
                write!(out, "{}", report::layout_text(layout))?;
            }
        }
        OutputFormat::Json => {
            let summaries: Vec<report::LayoutSummary> =
                layouts.into_iter().map(report::LayoutSummary::from).collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&summaries)?)?;
        }
    }
    Ok(())
}

/// Look up by name first, then as a hex frame ID
fn find_message<'a>(codec: &'a Codec, key: &str) -> Result<&'a can_codec::MessageLayout> {
    if let Ok(layout) = codec.message(key) {
        return Ok(layout);
    }
    let id = parse_frame_id(key).with_context(|| format!("Message not found: {}", key))?;
    Ok(codec.message(id)?)
}

fn parse_frame_id(text: &str) -> Result<u32> {
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    Ok(u32::from_str_radix(hex, 16)?)
}

/// Byte given as hex (`0xFF`) or decimal (`255`)
fn parse_byte(text: &str) -> Result<u8> {
    let byte = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse(),
    };
    byte.with_context(|| format!("Invalid byte '{}'", text))
}

/// `NAME=VALUE` into a signal assignment
fn parse_assignment(pair: &str) -> Result<(&str, f64)> {
    let (name, value) = pair
        .split_once('=')
        .with_context(|| format!("Expected SIGNAL=VALUE, got '{}'", pair))?;
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for signal '{}': '{}'", name.trim(), value))?;
    Ok((name.trim(), value))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args()))
        .init();
}
