//! Sample corpus helpers for integration tests.

use crate::image::FakeImage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Square sample the preview scenarios default to.
pub const GRAY_RAMPS: &str = "TestImages/GrayRampsHorizontal.exr";

/// Conformant corpus written by [`write_standard_assets`]: path, width, height.
pub const STANDARD_SAMPLES: [(&str, u32, u32); 3] = [
    (GRAY_RAMPS, 8, 8),
    ("TestImages/WideColorGamut.exr", 12, 6),
    ("ScanLines/Blobbies.exr", 5, 7),
];

/// Write `image` to `root/relative`, creating parent directories.
pub fn write_sample(root: &Path, relative: &str, image: &FakeImage) -> io::Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, image.render())?;
    Ok(path)
}

/// Populate `root` with [`STANDARD_SAMPLES`]; returns their relative paths.
pub fn write_standard_assets(root: &Path) -> io::Result<Vec<String>> {
    STANDARD_SAMPLES
        .iter()
        .map(|(relative, width, height)| {
            write_sample(root, relative, &FakeImage::gray_ramp(*width, *height))?;
            Ok((*relative).to_string())
        })
        .collect()
}
