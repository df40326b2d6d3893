//! Fake checker: validates a fake image in one of five modes.
//!
//! Usage: `toolprobe-fake-check [-m | -t | -s | -c] file`
//!
//! No flag runs every check. Exits 0 when the file passes, 1 otherwise.

// Test fixtures require special allowances - they are not production code
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
#![allow(clippy::exit)]

use std::env;
use std::process;
use toolprobe_fixtures::image::{parse, ImageError, Parsed};

const USAGE: &str = "Usage: toolprobe-fake-check [-m | -t | -s | -c] file";

fn usage() -> ! {
    eprintln!("{USAGE}");
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let (flag, file) = match args.as_slice() {
        [file] if !file.starts_with('-') => (None, file),
        [flag, file] if flag.starts_with('-') => (Some(flag.as_str()), file),
        _ => usage(),
    };
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{file}: cannot read: {err}");
            process::exit(1);
        }
    };

    let outcome: Result<(), ImageError> = match flag {
        None => parse(&text).and_then(Parsed::into_image).map(|_| ()),
        Some("-m") => parse(&text).map(|parsed| {
            println!(
                "{file}: {} x {}, channels {}",
                parsed.width,
                parsed.height,
                parsed.channels.join(" ")
            );
        }),
        Some("-t") => parse(&text).and_then(|p| p.check_types()),
        Some("-s") => parse(&text).and_then(|p| p.check_structure()).map(|_| ()),
        Some("-c") => parse(&text).and_then(|p| p.check_checksum()),
        Some(_) => usage(),
    };

    if let Err(err) = outcome {
        eprintln!("{file}: {err}");
        process::exit(1);
    }
}
