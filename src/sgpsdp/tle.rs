use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::error::TleError;

const LINE_LEN: usize = 69;
const NAME_LEN: usize = 24;

/// Operational status, as encoded in brackets in the name line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalStatus {
    #[default]
    Unknown,
    Operational,
    #[strum(to_string = "Non-operational")]
    NonOperational,
    Partial,
    Standby,
    Spare,
    Extended,
}

impl OperationalStatus {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            b'+' => Some(Self::Operational),
            b'-' => Some(Self::NonOperational),
            b'P' => Some(Self::Partial),
            b'B' => Some(Self::Standby),
            b'S' => Some(Self::Spare),
            b'X' => Some(Self::Extended),
            _ => None,
        }
    }
}

/// How a failed checksum is treated by [`parse_tle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumPolicy {
    #[default]
    Strict,
    /// Accept the set and log a warning. Structural checks still apply.
    Lenient,
}

/// One two-line element set, fields as printed in the TLE.
///
/// Angles are degrees and mean motion is revolutions per day. The
/// propagators never read this record directly; they consume the
/// [`SelectedElements`](super::ephemeris::SelectedElements) produced from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalElements {
    pub name: String,
    pub catalog_number: u32,
    pub designator: String,
    pub status: OperationalStatus,
    /// YYDDD.FFFFFFFF
    pub epoch: f64,
    pub epoch_year: u32,
    pub epoch_day: u32,
    pub epoch_fod: f64,
    /// First time derivative of mean motion / 2, rev/day²
    pub xndt2o: f64,
    /// Second time derivative of mean motion / 6, rev/day³
    pub xndd6o: f64,
    pub bstar: f64,
    pub xincl: f64,
    pub xnodeo: f64,
    pub eo: f64,
    pub omegao: f64,
    pub xmo: f64,
    pub xno: f64,
    pub elset: u32,
    pub revnum: u32,
    #[serde(skip)]
    pub(crate) converted: bool,
}

impl OrbitalElements {
    /// True once the ephemeris selector has consumed this record.
    pub fn is_converted(&self) -> bool {
        self.converted
    }
}

/// Mod-10 checksum of the first 68 characters compared with column 69.
///
/// Digits count at face value, `-` counts as one, everything else as zero.
pub fn checksum_good(line: &str) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() < LINE_LEN {
        return false;
    }

    let sum: u32 = bytes[..LINE_LEN - 1]
        .iter()
        .map(|&c| match c {
            b'0'..=b'9' => (c - b'0') as u32,
            b'-' => 1,
            _ => 0,
        })
        .sum();

    let check = bytes[LINE_LEN - 1];
    check.is_ascii_digit() && sum % 10 == (check - b'0') as u32
}

/// Structural checks only: line markers, catalog numbers, decimal points and
/// the ephemeris type field.
pub fn check_structure(line1: &str, line2: &str) -> Result<(), TleError> {
    let l1 = line1.as_bytes();
    let l2 = line2.as_bytes();
    if l1.len() < LINE_LEN {
        return Err(TleError::LineTooShort { line: 1 });
    }
    if l2.len() < LINE_LEN {
        return Err(TleError::LineTooShort { line: 2 });
    }

    if l1[0] != b'1' {
        return Err(TleError::LineNumber { line: 1 });
    }
    if l2[0] != b'2' {
        return Err(TleError::LineNumber { line: 2 });
    }
    if l1[2..7] != l2[2..7] {
        return Err(TleError::CatalogMismatch);
    }

    for column in [23, 34] {
        if l1[column] != b'.' {
            return Err(TleError::Structure { line: 1, column });
        }
    }
    for column in [11, 20, 37, 46, 54] {
        if l2[column] != b'.' {
            return Err(TleError::Structure { line: 2, column });
        }
    }
    if &l1[61..64] != b" 0 " {
        return Err(TleError::EphemerisType);
    }

    Ok(())
}

/// Full validity gate: checksums of both lines plus [`check_structure`].
pub fn good_elements(line1: &str, line2: &str) -> Result<(), TleError> {
    let line1 = strip_eol(line1);
    let line2 = strip_eol(line2);
    if !checksum_good(line1) {
        return Err(TleError::Checksum { line: 1 });
    }
    if !checksum_good(line2) {
        return Err(TleError::Checksum { line: 2 });
    }
    check_structure(line1, line2)
}

/// Extracts the display name and operational status from a name line.
///
/// A status code `[+]`, `[-]`, `[P]`, `[B]`, `[S]` or `[X]` starting within
/// the first 23 characters ends the name, together with the character
/// preceding it. `&` becomes `/`. Trailing spaces are removed only when
/// the line ends within the first 24 characters.
pub fn parse_name(line: &str) -> (String, OperationalStatus) {
    let bytes = strip_eol(line).as_bytes();
    let mut name = Vec::with_capacity(NAME_LEN);
    let mut status = OperationalStatus::Unknown;

    for idx in 0..NAME_LEN {
        let c = match bytes.get(idx) {
            Some(&c) if c != b'\0' => c,
            _ => {
                // Trailing spaces are only dropped when the line ends.
                while name.last() == Some(&b' ') {
                    name.pop();
                }
                break;
            }
        };
        if idx < 23 && c == b'[' && bytes.get(idx + 2) == Some(&b']') {
            if let Some(code) = bytes.get(idx + 1).and_then(|&b| OperationalStatus::from_code(b)) {
                status = code;
                // the character before the bracket is dropped as well
                name.truncate(idx.saturating_sub(1));
                break;
            }
        }
        name.push(if c == b'&' { b'/' } else { c });
    }

    (String::from_utf8_lossy(&name).into_owned(), status)
}

/// Converts the fixed-column fields of a TLE set into numbers.
///
/// No validation beyond line length is done; see [`good_elements`].
/// Eccentricity is floored at 1e-6.
pub fn convert_satellite_data(line1: &str, line2: &str) -> Result<OrbitalElements, TleError> {
    let l1 = strip_eol(line1).as_bytes();
    let l2 = strip_eol(line2).as_bytes();
    if l1.len() < LINE_LEN {
        return Err(TleError::LineTooShort { line: 1 });
    }
    if l2.len() < LINE_LEN {
        return Err(TleError::LineTooShort { line: 2 });
    }

    // The DDD field may be space padded but is read as part of one number.
    let mut epoch_field = l1[18..32].to_vec();
    for b in &mut epoch_field[2..4] {
        if *b == b' ' {
            *b = b'0';
        }
    }

    let mut eo = strtod(&[b".", &l2[26..33]].concat());
    if eo < 1.0e-6 {
        eo = 1.0e-6;
    }

    Ok(OrbitalElements {
        name: String::new(),
        catalog_number: atoi(&l1[2..7]) as u32,
        designator: String::from_utf8_lossy(&l1[9..17]).into_owned(),
        status: OperationalStatus::Unknown,
        epoch: strtod(&epoch_field),
        epoch_year: 2000 + atoi(&l1[18..20]) as u32,
        epoch_day: atoi(&l1[20..23]) as u32,
        epoch_fod: strtod(&[b"0", &l1[23..32]].concat()),
        xndt2o: strtod(&l1[33..43]),
        xndd6o: strtod(&implied_decimal(l1[44], &l1[45..50], &l1[50..52])),
        bstar: strtod(&implied_decimal(l1[53], &l1[54..59], &l1[59..61])),
        xincl: strtod(&l2[8..16]),
        xnodeo: strtod(&l2[17..25]),
        eo,
        omegao: strtod(&l2[34..42]),
        xmo: strtod(&l2[43..51]),
        xno: strtod(&l2[52..62]),
        elset: atoi(&l1[64..68]) as u32,
        revnum: strtod(&l2[63..68]) as u32,
        converted: false,
    })
}

/// Parses a name line and two element lines.
///
/// Structural errors always fail. A checksum error fails under
/// [`ChecksumPolicy::Strict`] and is logged under
/// [`ChecksumPolicy::Lenient`].
pub fn parse_tle(
    name: Option<&str>,
    line1: &str,
    line2: &str,
    policy: ChecksumPolicy,
) -> Result<OrbitalElements, TleError> {
    let line1 = strip_eol(line1);
    let line2 = strip_eol(line2);
    check_structure(line1, line2)?;

    for (line, text) in [(1, line1), (2, line2)] {
        if !checksum_good(text) {
            match policy {
                ChecksumPolicy::Strict => return Err(TleError::Checksum { line }),
                ChecksumPolicy::Lenient => {
                    log::warn!("Accepting TLE line {} with bad checksum: {}", line, text)
                }
            }
        }
    }

    let mut elements = convert_satellite_data(line1, line2)?;
    match name {
        Some(n) => {
            let (name, status) = parse_name(n);
            elements.name = name;
            elements.status = status;
        }
        None => elements.name = format!("NORAD {}", elements.catalog_number),
    }
    Ok(elements)
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Builds "sX.XXXXXEyy" from a field with an implied leading decimal point.
fn implied_decimal(sign: u8, mantissa: &[u8], exponent: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(10);
    buf.push(sign);
    buf.push(b'.');
    buf.extend_from_slice(mantissa);
    buf.push(b'E');
    buf.extend_from_slice(exponent);
    buf
}

/// Locale-independent parse of the longest numeric prefix, skipping leading
/// blanks. Returns 0.0 when nothing parses.
fn strtod(field: &[u8]) -> f64 {
    let text = String::from_utf8_lossy(field);
    let text = text.trim_start();
    (1..=text.len())
        .rev()
        .filter(|&end| text.is_char_boundary(end))
        .find_map(|end| text[..end].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Integer parse of the leading digits, skipping leading blanks.
fn atoi(field: &[u8]) -> i64 {
    let text = String::from_utf8_lossy(field);
    let text = text.trim_start();
    let (neg, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = digits
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| acc * 10 + (b - b'0') as i64);
    if neg {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "ISS (ZARYA)             ";
    const LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn checksum_of_reference_lines() {
        assert!(checksum_good(LINE1));
        assert!(checksum_good(LINE2));
        assert!(good_elements(LINE1, LINE2).is_ok());
    }

    #[test]
    fn single_digit_flip_breaks_checksum() {
        let mut bytes = LINE2.as_bytes().to_vec();
        // 51.6416 -> 52.6416
        bytes[10] = b'2';
        let altered = String::from_utf8(bytes).unwrap();
        assert!(!checksum_good(&altered));
        assert_eq!(good_elements(LINE1, &altered), Err(TleError::Checksum { line: 2 }));
    }

    #[test]
    fn short_line_fails_checksum() {
        assert!(!checksum_good(&LINE1[..60]));
    }

    #[test]
    fn structure_errors_are_reported() {
        let wrong_number = LINE2.replacen("2 25544", "2 25545", 1);
        assert_eq!(check_structure(LINE1, &wrong_number), Err(TleError::CatalogMismatch));

        let swapped = LINE1.replacen('1', "3", 1);
        assert_eq!(check_structure(&swapped, LINE2), Err(TleError::LineNumber { line: 1 }));

        let mut bytes = LINE1.as_bytes().to_vec();
        bytes[62] = b'2';
        let eph = String::from_utf8(bytes).unwrap();
        assert_eq!(check_structure(&eph, LINE2), Err(TleError::EphemerisType));
    }

    #[test]
    fn fields_are_parsed_from_fixed_columns() {
        let el = parse_tle(Some(NAME), LINE1, LINE2, ChecksumPolicy::Strict).unwrap();
        assert_eq!(el.name, "ISS (ZARYA)");
        assert_eq!(el.catalog_number, 25544);
        assert_eq!(el.designator, "98067A  ");
        assert_eq!(el.epoch, 8264.51782528);
        assert_eq!(el.epoch_year, 2008);
        assert_eq!(el.epoch_day, 264);
        assert!((el.epoch_fod - 0.51782528).abs() < 1e-12);
        assert_eq!(el.xndt2o, -0.00002182);
        assert_eq!(el.xndd6o, 0.0);
        assert!((el.bstar - -0.11606e-4).abs() < 1e-15);
        assert_eq!(el.elset, 292);
        assert_eq!(el.xincl, 51.6416);
        assert_eq!(el.xnodeo, 247.4627);
        assert!((el.eo - 0.0006703).abs() < 1e-15);
        assert_eq!(el.omegao, 130.5360);
        assert_eq!(el.xmo, 325.0288);
        assert_eq!(el.xno, 15.72125391);
        assert_eq!(el.revnum, 56353);
        assert!(!el.is_converted());
    }

    #[test]
    fn eccentricity_is_floored() {
        let line2 = "2 25544  51.6416 247.4627 0000000 130.5360 325.0288 15.72125391563537";
        let el = convert_satellite_data(LINE1, line2).unwrap();
        assert_eq!(el.eo, 1.0e-6);
    }

    #[test]
    fn lenient_policy_accepts_bad_checksum() {
        let bad = format!("{}0", &LINE1[..68]);
        assert!(parse_tle(None, &bad, LINE2, ChecksumPolicy::Strict).is_err());
        let el = parse_tle(None, &bad, LINE2, ChecksumPolicy::Lenient).unwrap();
        assert_eq!(el.name, "NORAD 25544");
    }

    #[test]
    fn status_code_is_stripped_from_name() {
        assert_eq!(
            parse_name("AO-7 [P]\n"),
            ("AO-7".to_string(), OperationalStatus::Partial)
        );
        assert_eq!(
            parse_name("NOAA 19 [+]"),
            ("NOAA 19".to_string(), OperationalStatus::Operational)
        );
        assert_eq!(
            parse_name("FOO & BAR   \r\n"),
            ("FOO / BAR".to_string(), OperationalStatus::Unknown)
        );
        assert_eq!(
            parse_name("AO-7[P]"),
            ("AO-".to_string(), OperationalStatus::Partial)
        );
        assert_eq!(
            parse_name("ODD [Q] NAME"),
            ("ODD [Q] NAME".to_string(), OperationalStatus::Unknown)
        );
    }

    #[test]
    fn name_spaces_survive_status_tag_and_truncation() {
        // Only one character before the tag goes; the rest is kept as is.
        assert_eq!(
            parse_name("ISS  [+]"),
            ("ISS ".to_string(), OperationalStatus::Operational)
        );
        // Cut at the field width, so no line end is seen.
        assert_eq!(
            parse_name("SATELLITE WITH LONG NAME X"),
            ("SATELLITE WITH LONG NAME".to_string(), OperationalStatus::Unknown)
        );
        assert_eq!(
            parse_name("TWENTY THREE CHARACTERS  TAIL"),
            ("TWENTY THREE CHARACTERS ".to_string(), OperationalStatus::Unknown)
        );
    }

    #[test]
    fn numeric_prefix_parsing() {
        assert_eq!(strtod(b" .13844E-3"), 0.13844e-3);
        assert_eq!(strtod(b"-.11606E-4"), -0.11606e-4);
        assert_eq!(strtod(b" .12345E 3"), 0.12345);
        assert_eq!(strtod(b"   "), 0.0);
        assert_eq!(atoi(b"  292"), 292);
        assert_eq!(atoi(b"25544"), 25544);
    }
}
