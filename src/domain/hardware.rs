use serde::{Deserialize, Serialize};

/// Longest bus listing line considered, in bytes. Longer lines are truncated.
pub const MAX_LINE_LEN: usize = 512;

/// Vendor name used when a line carries no recognizable vendor.
pub const UNKNOWN_VENDOR: &str = "Unknown";

/// Hardware category a bus device is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareCategory {
    /// NVIDIA graphics adapter.
    GpuNvidia,
    /// AMD/ATI graphics adapter.
    GpuAmd,
    /// Intel graphics adapter.
    GpuIntel,
    /// Wired or wireless network controller.
    Network,
    /// Audio device.
    Audio,
    /// Display controller from an unrecognized vendor.
    Unknown,
}

impl std::fmt::Display for HardwareCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardwareCategory::GpuNvidia => write!(f, "NVIDIA GPU"),
            HardwareCategory::GpuAmd => write!(f, "AMD GPU"),
            HardwareCategory::GpuIntel => write!(f, "Intel GPU"),
            HardwareCategory::Network => write!(f, "Network"),
            HardwareCategory::Audio => write!(f, "Audio"),
            HardwareCategory::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A device found on the PCI bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareRecord {
    pub category: HardwareCategory,
    pub vendor: String,
    pub device_description: String,
    /// Bus address as printed by the enumeration tool (e.g. "01:00.0").
    pub bus_id: String,
}

type Extractor = fn(&str) -> (HardwareCategory, String);

/// Line markers in priority order. The first marker found in a line decides
/// how it is classified.
const LINE_MARKERS: &[(&str, Extractor)] = &[
    ("VGA compatible controller:", extract_display),
    ("Network controller:", extract_network),
    ("Ethernet controller:", extract_network),
    ("Audio device:", extract_audio),
];

/// GPU vendors in precedence order: canonical name and the case-sensitive
/// spellings that identify it.
const GPU_VENDORS: &[(HardwareCategory, &str, &[&str])] = &[
    (HardwareCategory::GpuNvidia, "NVIDIA", &["NVIDIA", "nVidia"]),
    (HardwareCategory::GpuAmd, "AMD", &["AMD", "ATI"]),
    (HardwareCategory::GpuIntel, "Intel", &["Intel"]),
];

fn extract_display(remainder: &str) -> (HardwareCategory, String) {
    GPU_VENDORS
        .iter()
        .find(|(_, _, needles)| needles.iter().any(|needle| remainder.contains(needle)))
        .map(|(category, name, _)| (*category, name.to_string()))
        .unwrap_or((HardwareCategory::Unknown, UNKNOWN_VENDOR.to_string()))
}

fn extract_network(remainder: &str) -> (HardwareCategory, String) {
    (HardwareCategory::Network, vendor_before_colon(remainder))
}

fn extract_audio(remainder: &str) -> (HardwareCategory, String) {
    (HardwareCategory::Audio, vendor_before_colon(remainder))
}

fn vendor_before_colon(remainder: &str) -> String {
    match remainder.split_once(':') {
        Some((vendor, _)) => vendor.to_string(),
        None => UNKNOWN_VENDOR.to_string(),
    }
}

/// Cut a line down to `MAX_LINE_LEN` bytes without splitting a character.
fn truncate_line(line: &str) -> &str {
    if line.len() <= MAX_LINE_LEN {
        return line;
    }
    let mut end = MAX_LINE_LEN;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Classify a single bus listing line.
///
/// Returns `None` for lines that carry none of the known markers.
pub fn classify_line(raw: &str) -> Option<HardwareRecord> {
    let line = truncate_line(raw).trim_end_matches(['\n', '\r']);

    let (marker_pos, marker, extract) = LINE_MARKERS
        .iter()
        .find_map(|(marker, extract)| line.find(marker).map(|pos| (pos, *marker, *extract)))?;

    let remainder = line[marker_pos + marker.len()..].trim_start_matches(' ');
    let (category, vendor) = extract(remainder);
    let bus_id = line.split_whitespace().next().unwrap_or_default().to_string();

    Some(HardwareRecord {
        category,
        vendor,
        device_description: remainder.to_string(),
        bus_id,
    })
}

/// Parse a complete bus listing into hardware records, in listing order.
pub fn parse_bus_listing(listing: &str) -> Vec<HardwareRecord> {
    listing.lines().filter_map(classify_line).collect()
}
