//! CTF target deserializer
//!
//! Parses the subset of the CNTK Text Format that the target files use: one
//! example per line, sections separated by `|`, each section a stream name
//! followed by dense float values. The line may start with a sequence id
//! before the first `|`; sections whose name starts with `#` are comments.
//! Only the configured target stream is read.

use crate::source::invalid_data;
use std::error::Error;
use std::fs;

/// Load dense target vectors of `width` values from the stream named
/// `stream_name` in the CTF file at `path`.
///
/// Returns one contiguous tensor of `examples * width` values plus the
/// example count. Every non-empty line must carry the stream exactly once
/// with exactly `width` parseable floats.
pub(crate) fn load_targets(
    path: &str,
    stream_name: &str,
    width: usize,
) -> Result<(Vec<f32>, usize), Box<dyn Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|err| invalid_data(format!("cannot read target file {}: {}", path, err)))?;

    let mut values = Vec::new();
    let mut examples = 0usize;

    for (line_number, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let mut sections = line.split('|');
        // Anything before the first '|' is an optional sequence id.
        sections.next();

        let mut found = false;
        for section in sections {
            let mut tokens = section.split_whitespace();
            let name = match tokens.next() {
                Some(name) => name,
                None => continue,
            };
            if name.starts_with('#') || name != stream_name {
                continue;
            }
            if found {
                return Err(invalid_data(format!(
                    "{}:{}: stream '{}' appears more than once",
                    path,
                    line_number + 1,
                    stream_name
                )));
            }
            found = true;

            let mut count = 0usize;
            for token in tokens {
                let value: f32 = token.parse().map_err(|_| {
                    invalid_data(format!(
                        "{}:{}: '{}' is not a float",
                        path,
                        line_number + 1,
                        token
                    ))
                })?;
                values.push(value);
                count += 1;
            }
            if count != width {
                return Err(invalid_data(format!(
                    "{}:{}: stream '{}' holds {} values, expected {}",
                    path,
                    line_number + 1,
                    stream_name,
                    count,
                    width
                )));
            }
        }

        if !found {
            return Err(invalid_data(format!(
                "{}:{}: missing stream '{}'",
                path,
                line_number + 1,
                stream_name
            )));
        }
        examples += 1;
    }

    Ok((values, examples))
}
