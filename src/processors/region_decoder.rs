//! Station identifier to voivodeship decoding.
//!
//! Station ids look like `PL0205001`: a country prefix followed by a
//! four-character window (offsets 2..6) that carries the region code.

/// NUTS-2 style codes of the 16 Polish voivodeships.
pub const POLAND_REGIONS: [(&str, &str); 16] = [
    ("02", "Dolnośląskie"),
    ("04", "Kujawsko-Pomorskie"),
    ("06", "Lubelskie"),
    ("08", "Lubuskie"),
    ("10", "Łódzkie"),
    ("12", "Małopolskie"),
    ("14", "Mazowieckie"),
    ("16", "Opolskie"),
    ("18", "Podkarpackie"),
    ("20", "Podlaskie"),
    ("22", "Pomorskie"),
    ("24", "Śląskie"),
    ("26", "Świętokrzyskie"),
    ("28", "Warmińsko-Mazurskie"),
    ("30", "Wielkopolskie"),
    ("32", "Zachodniopomorskie"),
];

/// Station-number ranges (`start..end`) for codes of three or more digits.
///
/// 100..200 is listed after Łódzkie and maps to Małopolskie.
pub const REGION_RANGES: [(u32, u32, &str); 16] = [
    (200, 300, "Dolnośląskie"),
    (300, 400, "Kujawsko-Pomorskie"),
    (400, 500, "Lubelskie"),
    (500, 600, "Lubuskie"),
    (600, 700, "Łódzkie"),
    (100, 200, "Małopolskie"),
    (700, 800, "Mazowieckie"),
    (800, 900, "Opolskie"),
    (900, 1000, "Podkarpackie"),
    (1000, 1100, "Podlaskie"),
    (1100, 1200, "Pomorskie"),
    (1200, 1300, "Śląskie"),
    (1300, 1400, "Świętokrzyskie"),
    (1400, 1500, "Warmińsko-Mazurskie"),
    (1500, 1600, "Wielkopolskie"),
    (1600, 1700, "Zachodniopomorskie"),
];

const MIN_STATION_ID_LEN: usize = 6;
const REGION_WINDOW: std::ops::Range<usize> = 2..6;

/// One step of the name resolution chain. `None` passes to the next rule.
type RegionRule = fn(u32) -> Option<String>;

const RESOLUTION_CHAIN: [RegionRule; 4] = [
    lookup_padded,
    resolve_short_code,
    lookup_range,
    lookup_prefix,
];

pub fn lookup_region(code: &str) -> Option<&'static str> {
    POLAND_REGIONS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, name)| *name)
}

/// Numeric region code carried by a station id; 0 when none can be read.
pub fn extract_region_code(station_id: &str) -> u32 {
    if station_id.chars().count() < MIN_STATION_ID_LEN {
        return 0;
    }

    let digits: String = station_id
        .chars()
        .skip(REGION_WINDOW.start)
        .take(REGION_WINDOW.len())
        .filter(|c| c.is_ascii_digit())
        .collect();

    // At most four ASCII digits, so the parse cannot overflow.
    digits.parse().unwrap_or(0)
}

/// `PL-XXX` label of a station's region code.
pub fn format_region_code(station_id: &str) -> String {
    format!("PL-{:03}", extract_region_code(station_id))
}

/// Voivodeship name for a region code. Total: unknown codes get a synthetic label.
pub fn map_region_code_to_name(code: u32) -> String {
    RESOLUTION_CHAIN
        .iter()
        .find_map(|rule| rule(code))
        .unwrap_or_else(|| format!("Unknown-{}", code))
}

fn lookup_padded(code: u32) -> Option<String> {
    lookup_region(&format!("{:02}", code)).map(str::to_string)
}

fn resolve_short_code(code: u32) -> Option<String> {
    if code >= 100 {
        return None;
    }
    Some(lookup_padded(code).unwrap_or_else(|| format!("Region-{}", code)))
}

fn lookup_range(code: u32) -> Option<String> {
    REGION_RANGES
        .iter()
        .find(|(start, end, _)| (*start..*end).contains(&code))
        .map(|(_, _, name)| name.to_string())
}

/// Leading two digits of codes beyond the range table, e.g. 2012 -> "20".
fn lookup_prefix(code: u32) -> Option<String> {
    let text = code.to_string();
    text.get(..2).and_then(lookup_region).map(str::to_string)
}
