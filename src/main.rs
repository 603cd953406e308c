//! ansi-cursor binary
//!
//! Run with: cargo run -- <mode> [options]
//!
//! Modes:
//!   encode   JSON commands on stdin, raw escape bytes on stdout
//!   decode   raw terminal input on stdin, JSON tokens on stdout
//!   replay   raw encoder output on stdin, JSON sequences on stdout
//!
//! Logs go to stderr (RUST_LOG, default "info").

use std::env;
use std::process;

use log::{debug, error, info};
use tokio::io::{self, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

use ansi_cursor_codec::protocol::{parse_command, serialize_response, Response};
use ansi_cursor_codec::{Capabilities, Coordinate, CursorReplay, Decoder, Encoder};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Encode,
    Decode,
    Replay,
}

fn print_help() {
    println!("ansi-cursor v0.1.0");
    println!();
    println!("Usage: ansi-cursor <encode|decode|replay> [options]");
    println!();
    println!("Options:");
    println!("  --no-cha              Terminal lacks CSI n G (horizontal absolute)");
    println!("  --no-cha-default      Terminal needs an explicit argument for CSI G");
    println!("  --no-vpa              Terminal lacks CSI n d (vertical absolute)");
    println!("  --capabilities <json> Capability profile as JSON");
    println!("  --help, -h            Show this help");
    println!();
    println!("Examples:");
    println!("  echo '{{\"cmd\":\"move_cursor\",\"x\":2,\"y\":2}}' | ansi-cursor encode");
    println!("  ansi-cursor decode < captured-input.bin");
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Try 'ansi-cursor --help'");
    process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let mut mode = None;
    let mut capabilities = Capabilities::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-cha" => capabilities.horizontal_absolute = false,
            "--no-cha-default" => capabilities.horizontal_absolute_default = false,
            "--no-vpa" => capabilities.vertical_absolute = false,
            "--capabilities" => {
                i += 1;
                let Some(json) = args.get(i) else {
                    usage_error("--capabilities requires a JSON object");
                };
                capabilities = match serde_json::from_str(json) {
                    Ok(caps) => caps,
                    Err(e) => usage_error(&format!("invalid capabilities: {}", e)),
                };
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "encode" => mode = Some(Mode::Encode),
            "decode" => mode = Some(Mode::Decode),
            "replay" => mode = Some(Mode::Replay),
            arg => usage_error(&format!("unknown argument '{}'", arg)),
        }
        i += 1;
    }

    let Some(mode) = mode else {
        usage_error("a mode is required");
    };

    match mode {
        Mode::Encode => run_encode(capabilities).await,
        Mode::Decode => run_decode().await,
        Mode::Replay => run_replay().await,
    }
}

/// JSON commands in, escape bytes out
async fn run_encode(capabilities: Capabilities) -> Result<(), Box<dyn std::error::Error>> {
    info!("encoding with {:?}", capabilities);

    let mut encoder = Encoder::new(capabilities);
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(cmd) => {
                let bytes = cmd.apply(&mut encoder);
                debug!("{:?} -> {} bytes", cmd, bytes.len());
                stdout.write_all(&bytes).await?;
            }
            Err(e) => {
                error!("line {}: {}", line_no, e);
            }
        }
    }

    stdout.flush().await?;
    Ok(())
}

/// Raw terminal input in, JSON tokens out
async fn run_decode() -> Result<(), Box<dyn std::error::Error>> {
    let mut decoder = Decoder::new();
    let mut stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buf = [0u8; 4096];

    loop {
        let n = stdin.read(&mut buf).await?;
        if n == 0 {
            break;
        }

        for token in decoder.parse(&buf[..n]) {
            write_response(&mut stdout, &Response::Token { token }).await?;
        }
    }

    // End of input: nothing more will complete a pending sequence
    if let Some(token) = decoder.flush() {
        write_response(&mut stdout, &Response::Token { token }).await?;
    }

    stdout.flush().await?;
    Ok(())
}

/// Encoder output in, recognized sequences out
async fn run_replay() -> Result<(), Box<dyn std::error::Error>> {
    let mut replay = CursorReplay::new(Coordinate::ORIGIN);
    let mut stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buf = [0u8; 4096];

    loop {
        let n = stdin.read(&mut buf).await?;
        if n == 0 {
            break;
        }

        for sequence in replay.process(&buf[..n]) {
            write_response(&mut stdout, &Response::Sequence { sequence }).await?;
        }
    }

    let summary = Response::Cursor {
        position: replay.cursor,
        visible: replay.cursor_visible,
    };
    write_response(&mut stdout, &summary).await?;

    stdout.flush().await?;
    Ok(())
}

async fn write_response(
    stdout: &mut io::Stdout,
    response: &Response,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut line = serialize_response(response)?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    Ok(())
}
