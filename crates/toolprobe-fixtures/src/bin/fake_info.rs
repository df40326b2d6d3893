//! Fake info tool: prints a fake image's header as an indented report.
//!
//! Usage: `toolprobe-fake-info [-v] file`
//!
//! ```text
//! File out.exr:
//!   size 8 x 8
//!   channels R G B
//!   preview 50 x 50
//! ```

// Test fixtures require special allowances - they are not production code
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
#![allow(clippy::exit)]

use std::env;
use std::process;
use toolprobe_fixtures::image::parse;

const USAGE: &str = "Usage: toolprobe-fake-info [-v] file";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let (verbose, file) = match args.as_slice() {
        [flag, file] if flag == "-v" => (true, file),
        [file] if !file.starts_with('-') => (false, file),
        _ => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let parsed = match std::fs::read_to_string(file)
        .map_err(|err| err.to_string())
        .and_then(|text| parse(&text).map_err(|err| err.to_string()))
    {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{file}: {err}");
            process::exit(1);
        }
    };

    println!("File {file}:");
    println!("  size {} x {}", parsed.width, parsed.height);
    println!("  channels {}", parsed.channels.join(" "));
    if let Some((w, h)) = parsed.preview {
        println!("  preview {w} x {h}");
    }
    if verbose {
        let verdict = match parsed.check_checksum() {
            Ok(()) => "ok".to_string(),
            Err(err) => err.to_string(),
        };
        println!("  checksum {verdict}");
    }
}
