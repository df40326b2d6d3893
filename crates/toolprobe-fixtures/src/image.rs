//! A line-oriented stand-in for an image container.
//!
//! ```text
//! FAKEIMG 1
//! size 8 x 8
//! channels R G B
//! preview 50 x 50
//! data 00ff10...
//! checksum 5a1c0e3f9b2d4e70
//! ```
//!
//! `preview` is optional. The checksum is FNV-1a over the `data` hex text, so
//! a checksum check works even when the data is structurally broken.

use std::fmt::Write as _;
use thiserror::Error;

pub const MAGIC: &str = "FAKEIMG 1";

/// Channel names the types check accepts.
pub const KNOWN_CHANNELS: [&str; 5] = ["R", "G", "B", "A", "Y"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("not a fake image (missing {MAGIC:?} header)")]
    BadMagic,
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("missing {0} line")]
    MissingField(&'static str),
    #[error("unknown channel type {0:?}")]
    UnknownChannel(String),
    #[error("pixel data is not valid hex")]
    BadData,
    #[error("pixel data holds {actual} bytes, expected {expected}")]
    DataLength { expected: usize, actual: usize },
    #[error("checksum mismatch: stored {stored}, computed {computed}")]
    Checksum { stored: String, computed: String },
}

/// A well-formed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeImage {
    pub width: u32,
    pub height: u32,
    pub channels: Vec<String>,
    pub preview: Option<(u32, u32)>,
    pub data: Vec<u8>,
}

impl FakeImage {
    /// RGB image whose value rises from left to right.
    #[must_use]
    pub fn gray_ramp(width: u32, height: u32) -> Self {
        let span = width.saturating_sub(1).max(1);
        let mut data = Vec::new();
        for _ in 0..height {
            for x in 0..width {
                let value = u8::try_from(x * 255 / span).unwrap_or(u8::MAX);
                data.extend([value, value, value]);
            }
        }
        Self {
            width,
            height,
            channels: vec!["R".into(), "G".into(), "B".into()],
            preview: None,
            data,
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let data = encode_hex(&self.data);
        let mut out = format!(
            "{MAGIC}\nsize {} x {}\nchannels {}\n",
            self.width,
            self.height,
            self.channels.join(" ")
        );
        if let Some((w, h)) = self.preview {
            let _ = writeln!(out, "preview {w} x {h}");
        }
        let _ = writeln!(out, "data {data}");
        let _ = writeln!(out, "checksum {}", checksum(&data));
        out
    }

    /// Preview size for `width`, keeping the aspect ratio.
    #[must_use]
    pub fn preview_size(&self, width: u32) -> (u32, u32) {
        let scaled = (u64::from(width) * u64::from(self.height) + u64::from(self.width) / 2)
            / u64::from(self.width.max(1));
        (width, u32::try_from(scaled).unwrap_or(u32::MAX).max(1))
    }
}

/// Header fields plus the raw payload, before any content checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub width: u32,
    pub height: u32,
    pub channels: Vec<String>,
    pub preview: Option<(u32, u32)>,
    data_hex: Option<String>,
    stored_checksum: Option<String>,
}

/// Parse the header strictly; payload lines are kept raw for later checks.
pub fn parse(text: &str) -> Result<Parsed, ImageError> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, line)) if line == MAGIC => {}
        _ => return Err(ImageError::BadMagic),
    }

    let mut size = None;
    let mut channels = None;
    let mut preview = None;
    let mut data_hex = None;
    let mut stored_checksum = None;
    for (index, line) in lines {
        let line_no = index + 1;
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        match key {
            "size" => size = Some(parse_dims(value, line_no)?),
            "channels" => {
                channels = Some(value.split_whitespace().map(str::to_string).collect());
            }
            "preview" => preview = Some(parse_dims(value, line_no)?),
            "data" => data_hex = Some(value.to_string()),
            "checksum" => stored_checksum = Some(value.to_string()),
            other => {
                return Err(ImageError::Malformed {
                    line: line_no,
                    reason: format!("unknown field {other:?}"),
                })
            }
        }
    }

    let (width, height) = size.ok_or(ImageError::MissingField("size"))?;
    let channels: Vec<String> = channels.ok_or(ImageError::MissingField("channels"))?;
    Ok(Parsed {
        width,
        height,
        channels,
        preview,
        data_hex,
        stored_checksum,
    })
}

impl Parsed {
    pub fn check_types(&self) -> Result<(), ImageError> {
        match self
            .channels
            .iter()
            .find(|c| !KNOWN_CHANNELS.contains(&c.as_str()))
        {
            Some(unknown) => Err(ImageError::UnknownChannel(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Pixel data must decode and hold exactly width x height x channels bytes.
    pub fn check_structure(&self) -> Result<Vec<u8>, ImageError> {
        let hex = self
            .data_hex
            .as_deref()
            .ok_or(ImageError::MissingField("data"))?;
        let data = decode_hex(hex).ok_or(ImageError::BadData)?;
        let expected = usize::try_from(self.width).unwrap_or(usize::MAX)
            * usize::try_from(self.height).unwrap_or(usize::MAX)
            * self.channels.len();
        if data.len() == expected {
            Ok(data)
        } else {
            Err(ImageError::DataLength {
                expected,
                actual: data.len(),
            })
        }
    }

    pub fn check_checksum(&self) -> Result<(), ImageError> {
        let stored = self
            .stored_checksum
            .as_deref()
            .ok_or(ImageError::MissingField("checksum"))?;
        let computed = checksum(self.data_hex.as_deref().unwrap_or_default());
        if stored == computed {
            Ok(())
        } else {
            Err(ImageError::Checksum {
                stored: stored.to_string(),
                computed,
            })
        }
    }

    /// Every check, in the order a default-mode checker runs them.
    pub fn into_image(self) -> Result<FakeImage, ImageError> {
        self.check_types()?;
        let data = self.check_structure()?;
        self.check_checksum()?;
        Ok(FakeImage {
            width: self.width,
            height: self.height,
            channels: self.channels,
            preview: self.preview,
            data,
        })
    }
}

fn parse_dims(value: &str, line: usize) -> Result<(u32, u32), ImageError> {
    let malformed = || ImageError::Malformed {
        line,
        reason: format!("expected \"<width> x <height>\", got {value:?}"),
    };
    let (w, h) = value.split_once(" x ").ok_or_else(malformed)?;
    let width = w.trim().parse().map_err(|_| malformed())?;
    let height = h.trim().parse().map_err(|_| malformed())?;
    Ok((width, height))
}

fn encode_hex(data: &[u8]) -> String {
    data.iter().fold(String::with_capacity(data.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).ok()?, 16).ok())
        .collect()
}

/// FNV-1a (64-bit) of `text`, as 16 hex digits.
#[must_use]
pub fn checksum(text: &str) -> String {
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    let hash = text.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    format!("{hash:016x}")
}
