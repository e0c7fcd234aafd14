// A simple application to probe the port at one baud rate with a specific sequence.

use baud_scan::config::{PortParameters, ScanParameters};
use baud_scan::scan::port::{self, Connector, SerialConnector};
use baud_scan::scan::response::KnownTokens;
use clap::Parser;
use std::io::Write;

#[derive(Parser)]
struct Cli {
    #[arg(long, default_value = "/dev/ttyUSB0")]
    port: String,

    #[arg(long, default_value = "9600")]
    baud: u32,

    // "test\n"
    #[arg(long, default_value = "746573740a")]
    hex_string: String,

    #[arg(long, default_value = "500")]
    timeout_msec: u64,
}

#[derive(Debug, PartialEq)]
enum HexError {
    OddLength(usize),
    BadDigit(usize),
}

fn parse_hex_string(in_str: &str) -> Result<Vec<u8>, HexError> {
    if in_str.len() % 2 != 0 {
        return Err(HexError::OddLength(in_str.len()));
    }
    let mut bytes = Vec::with_capacity(in_str.len() / 2);
    for i in (0..in_str.len()).step_by(2) {
        let byte = in_str
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or(HexError::BadDigit(i))?;
        bytes.push(byte);
    }
    Ok(bytes)
}

fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn probe_port(args: &Cli, payload: &[u8]) -> baud_scan::Result<()> {
    let parameters = PortParameters {
        timeout_msec: args.timeout_msec,
        ..PortParameters::default()
    };
    let mut connector = SerialConnector::new(&parameters)?;
    let mut connection = connector.open(&args.port, args.baud, parameters.timeout())?;
    let io_error = |source| baud_scan::ScanError::Io {
        baud_rate: args.baud,
        source,
    };

    connection.write_all(payload).map_err(io_error)?;
    connection.flush().map_err(io_error)?;
    let response = port::read_response(
        &mut connection,
        ScanParameters::default().read_size,
        parameters.timeout(),
    )
    .map_err(io_error)?;

    println!("Received {} bytes at {} baud", response.len(), args.baud);
    println!("hex:  {}", hex_dump(&response));
    let text = String::from_utf8_lossy(&response);
    println!("text: {:?}", text);
    let tokens = KnownTokens::new(ScanParameters::default().known_good);
    match tokens.match_text(&text) {
        Some(token) => println!("Known good word: {}", token),
        None => println!("No known good word"),
    }
    Ok(())
}

fn main() {
    let args = Cli::parse();
    match parse_hex_string(args.hex_string.as_str()) {
        Ok(bytes) => {
            if let Err(e) = probe_port(&args, &bytes) {
                println!("Error {}", e);
                std::process::exit(1);
            }
        }
        Err(e) => println!("Error {:?} parsing {}", e, args.hex_string),
    }
}

#[cfg(test)]
#[test]
fn test_parse_hex_string() {
    assert_eq!(parse_hex_string("746573740a").unwrap(), b"test\n");
    assert_eq!(parse_hex_string("FF00").unwrap(), vec![0xff, 0x00]);
    assert_eq!(parse_hex_string("abc"), Err(HexError::OddLength(3)));
    assert_eq!(parse_hex_string("zz"), Err(HexError::BadDigit(0)));
    assert_eq!(hex_dump(&[0x0a, 0xff]), "0a ff");
}
