//! Fake preview generator: copies a fake image and records a preview size.
//!
//! Usage: `toolprobe-fake-preview [-w width] [-e exposure] [-v] infile outfile`
//!
//! The preview height follows the input's aspect ratio.

// Test fixtures require special allowances - they are not production code
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
#![allow(clippy::exit)]

use std::env;
use std::process;
use toolprobe_fixtures::image::{parse, Parsed};

const USAGE: &str = "Usage: toolprobe-fake-preview [-w width] [-e exposure] [-v] infile outfile";
const DEFAULT_WIDTH: u32 = 100;

struct Options {
    width: u32,
    exposure: f32,
    verbose: bool,
    input: String,
    output: String,
}

fn usage() -> ! {
    eprintln!("{USAGE}");
    process::exit(1);
}

fn fail(message: &str) -> ! {
    eprintln!("toolprobe-fake-preview: {message}");
    process::exit(1);
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Options {
    let mut args = args.into_iter();
    let mut width = DEFAULT_WIDTH;
    let mut exposure = 0.0;
    let mut verbose = false;
    let mut files = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" => usage(),
            "-w" => {
                width = match args.next().and_then(|v| v.parse::<u32>().ok()) {
                    Some(w) if w > 0 => w,
                    _ => usage(),
                };
            }
            "-e" => {
                exposure = match args.next().and_then(|v| v.parse::<f32>().ok()) {
                    Some(e) if e.is_finite() => e,
                    _ => usage(),
                };
            }
            "-v" => verbose = true,
            flag if flag.starts_with('-') => usage(),
            _ => files.push(arg),
        }
    }
    let mut files = files.into_iter();
    match (files.next(), files.next(), files.next()) {
        (Some(input), Some(output), None) => Options {
            width,
            exposure,
            verbose,
            input,
            output,
        },
        _ => usage(),
    }
}

fn main() {
    let options = parse_args(env::args().skip(1));

    let text = std::fs::read_to_string(&options.input)
        .unwrap_or_else(|err| fail(&format!("cannot read {}: {err}", options.input)));
    let mut image = parse(&text)
        .and_then(Parsed::into_image)
        .unwrap_or_else(|err| fail(&format!("{}: {err}", options.input)));

    let (width, height) = image.preview_size(options.width);
    image.preview = Some((width, height));
    if options.verbose {
        println!(
            "generating {width} x {height} preview (exposure {}) for {}",
            options.exposure, options.input
        );
    }

    std::fs::write(&options.output, image.render())
        .unwrap_or_else(|err| fail(&format!("cannot write {}: {err}", options.output)));
}
