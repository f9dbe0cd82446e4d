//! Map-file image deserializer
//!
//! A map file lists one example per line: an image path and a label column,
//! separated by whitespace (tab in the canonical files). The label column is
//! required by the format but unused here. Image files are raw 8-bit
//! grayscale, exactly `height * width` bytes each.

use crate::source::invalid_data;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Load every image listed in `map_path` as raw pixel values (0..255).
///
/// Returns one contiguous tensor of `examples * height * width` values plus
/// the example count. Relative image paths resolve against the map file's
/// directory. Any missing file, short line, or wrongly sized image is a
/// construction-time error.
pub(crate) fn load_channel_images(
    map_path: &str,
    height: usize,
    width: usize,
) -> Result<(Vec<f32>, usize), Box<dyn Error>> {
    let contents = fs::read_to_string(map_path)
        .map_err(|err| invalid_data(format!("cannot read map file {}: {}", map_path, err)))?;
    let base_dir = Path::new(map_path).parent().map(Path::to_path_buf);

    let plane = height * width;
    let mut pixels = Vec::new();
    let mut examples = 0usize;

    for (line_number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut columns = line.split_whitespace();
        let image_path = columns.next().ok_or_else(|| {
            invalid_data(format!("{}:{}: empty map line", map_path, line_number + 1))
        })?;
        if columns.next().is_none() {
            return Err(invalid_data(format!(
                "{}:{}: expected '<image-path>\\t<label>'",
                map_path,
                line_number + 1
            )));
        }

        let resolved = resolve(image_path, base_dir.as_deref());
        let data = fs::read(&resolved).map_err(|err| {
            invalid_data(format!(
                "{}:{}: cannot read image {}: {}",
                map_path,
                line_number + 1,
                resolved.display(),
                err
            ))
        })?;
        if data.len() != plane {
            return Err(invalid_data(format!(
                "{}:{}: image {} holds {} bytes, expected {}x{} = {}",
                map_path,
                line_number + 1,
                resolved.display(),
                data.len(),
                height,
                width,
                plane
            )));
        }

        pixels.extend(data.iter().map(|&byte| byte as f32));
        examples += 1;
    }

    Ok((pixels, examples))
}

fn resolve(image_path: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(image_path);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match base_dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
        _ => path.to_path_buf(),
    }
}
