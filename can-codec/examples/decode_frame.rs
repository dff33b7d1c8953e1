//! Standalone frame decoder
//!
//! Loads one or more DBC files and decodes the frames given on the command
//! line, printing every signal with its raw and physical value.
//!
//! Usage:
//!   decode_frame <file.dbc> [<file.dbc> ...] <ID#DATA> [<ID#DATA> ...]
//!
//! Example:
//!   decode_frame motohawk.dbc 1F0#C006E00000000000

use can_codec::Codec;
use std::env;
use std::path::Path;

fn parse_frame(text: &str) -> Option<(u32, Vec<u8>)> {
    let (id, data) = text.split_once('#')?;
    let id = u32::from_str_radix(id, 16).ok()?;
    if data.len() % 2 != 0 || !data.is_ascii() {
        return None;
    }
    let data = (0..data.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&data[i..i + 2], 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    Some((id, data))
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: decode_frame <file.dbc> [...] <ID#DATA> [...]");
        std::process::exit(1);
    }

    let mut codec = Codec::new();
    let mut frames = Vec::new();
    for arg in &args {
        if arg.contains('#') {
            frames.push(arg.as_str());
        } else if let Err(e) = codec.add_dbc(Path::new(arg)) {
            eprintln!("Error loading DBC {}: {}", arg, e);
            std::process::exit(1);
        }
    }

    let stats = codec.database_stats();
    println!("Loaded {} messages, {} signals\n", stats.num_messages, stats.num_signals);

    for text in frames {
        let Some((id, data)) = parse_frame(text) else {
            println!("{}: not an ID#DATA frame", text);
            continue;
        };
        match codec.decode_message(id, &data) {
            Ok(message) => {
                println!("{} (0x{:X})", message.name, message.frame_id);
                for signal in &message.signals {
                    println!("  {}", signal);
                }
            }
            Err(e) => println!("{}: {}", text, e),
        }
    }
}
