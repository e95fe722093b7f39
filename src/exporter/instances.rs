use serde::Serialize;

/// Header line `wsl --list` prints before the instance names
pub const LIST_HEADER: &str = "Windows Subsystem for Linux Distributions:";

/// Suffix `wsl --list` appends to the default instance
pub const DEFAULT_MARKER: &str = "(Default)";

/// Characters Windows does not allow in file names
const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// A normalized WSL instance name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceName(String);

impl InstanceName {
    /// Normalize one line of `wsl --list` output.
    ///
    /// Returns `None` for blank lines and the header line.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == LIST_HEADER {
            return None;
        }

        let name = trimmed
            .strip_suffix(DEFAULT_MARKER)
            .unwrap_or(trimmed)
            .trim();
        if name.is_empty() {
            return None;
        }
        Some(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Characters in the name that Windows rejects in a file name
    pub fn unsafe_filename_chars(&self) -> Vec<char> {
        self.0
            .chars()
            .filter(|c| ILLEGAL_FILENAME_CHARS.contains(c) || c.is_control())
            .collect()
    }
}

impl std::fmt::Display for InstanceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize `wsl --list` output, keeping enumeration order
pub fn parse_instance_list(text: &str) -> Vec<InstanceName> {
    text.lines().filter_map(InstanceName::parse).collect()
}

/// Decode captured `wsl.exe` output.
///
/// With `WSL_UTF8=1` the output is UTF-8. Builds that ignore the variable
/// write UTF-16LE, which is detected by its BOM or by NUL high bytes and
/// decoded as such. Any NUL bytes or BOM left over are filtered out.
pub fn decode_output(bytes: &[u8]) -> String {
    let text = if looks_like_utf16le(bytes) {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    text.trim_start_matches('\u{feff}').replace('\0', "")
}

fn looks_like_utf16le(bytes: &[u8]) -> bool {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return true;
    }
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return false;
    }
    let high_bytes = bytes.len() / 2;
    let zero_high = bytes.iter().skip(1).step_by(2).filter(|b| **b == 0).count();
    zero_high * 2 > high_bytes
}
