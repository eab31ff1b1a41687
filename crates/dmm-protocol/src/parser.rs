//! Frame to measurement parser
//!
//! A frame is `<mode code><payload>`, e.g. `DC  -1.234 V`. The first
//! character picks the [`Mode`]; the payload is scanned for the reading
//! token and everything after it is the units.
//!
//! Parsing never fails. A frame that does not start with a known mode code
//! is rejected (`None`); a payload without a reading token still yields a
//! measurement, with an empty reading and the whole payload as units.

use tracing::trace;

use crate::mode::Mode;
use crate::record::Measurement;
use crate::scanner::find_reading;

/// Mangled degree sign as printed by the meter
const MANGLED_DEGREE: &str = "^C";

/// Replacement for [`MANGLED_DEGREE`]
const DEGREE_CELSIUS: &str = "°C";

/// Decode raw frame bytes as ASCII, dropping anything outside it
pub fn decode_frame(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| char::from(b))
        .collect()
}

/// Parse one frame (without terminator) into a measurement
pub fn parse_frame(bytes: &[u8]) -> Option<Measurement> {
    let decoded = decode_frame(bytes);
    let text = decoded.trim();

    let code = text.chars().next()?;
    if !Mode::is_known_code(code) {
        trace!("Rejecting frame with mode code {:?}", code);
        return None;
    }

    let mode = Mode::from_code(code);
    let payload = text[code.len_utf8()..].trim();

    let (reading, units) = match find_reading(payload) {
        Some(token) => (token.text.to_string(), payload[token.end..].trim()),
        None => (String::new(), payload),
    };

    Some(Measurement {
        mode,
        reading,
        units: fix_units(units),
        raw: text.to_string(),
    })
}

/// Repair known glyph damage in the units text
fn fix_units(units: &str) -> String {
    if units.contains(MANGLED_DEGREE) {
        units.replace(MANGLED_DEGREE, DEGREE_CELSIUS)
    } else {
        units.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(frame: &str) -> Measurement {
        parse_frame(frame.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_dc_voltage() {
        let m = parse("DC  -0.003 V");
        assert_eq!(m.mode, Mode::Dc);
        assert_eq!(m.reading, "-0.003");
        assert_eq!(m.units, "V");
        assert_eq!(m.raw, "DC  -0.003 V");
    }

    #[test]
    fn test_overload_marker() {
        let m = parse("D  OL  mV");
        assert_eq!(m.reading, "OL");
        assert_eq!(m.units, "mV");
    }

    #[test]
    fn test_suffix_and_units() {
        let m = parse("R-1.234k Ohm");
        assert_eq!(m.mode, Mode::Resistance);
        assert_eq!(m.reading, "-1.234k");
        assert_eq!(m.units, "Ohm");
    }

    #[test]
    fn test_leading_zeros_preserved() {
        assert_eq!(parse("D007.50 V").reading, "007.50");
    }

    #[test]
    fn test_stray_prefix_discarded() {
        // "RES" -> mode 'R', payload "ES 1.000 MOhm"; "ES" is skipped
        let m = parse("RES 1.000 MOhm");
        assert_eq!(m.mode, Mode::Resistance);
        assert_eq!(m.reading, "1.000");
        assert_eq!(m.units, "MOhm");
    }

    #[test]
    fn test_logic_level() {
        let m = parse("LOG High");
        assert_eq!(m.mode, Mode::Diode);
        assert_eq!(m.reading, "High");
        assert_eq!(m.units, "");
    }

    #[test]
    fn test_no_reading_token() {
        let m = parse("C  nF");
        assert_eq!(m.mode, Mode::Capacitance);
        assert_eq!(m.reading, "");
        assert_eq!(m.units, "nF");
    }

    #[test]
    fn test_mode_only() {
        let m = parse("D");
        assert_eq!(m.reading, "");
        assert_eq!(m.units, "");
    }

    #[test]
    fn test_degree_fix() {
        let m = parse("TEMP 23 ^C");
        assert_eq!(m.mode, Mode::Temperature);
        assert_eq!(m.reading, "23");
        assert_eq!(m.units, "°C");
    }

    #[test]
    fn test_degree_fix_leaves_other_chars() {
        let m = parse("T 23 x^Cy");
        assert_eq!(m.units, "x°Cy");
        let m = parse("T 23 ^F");
        assert_eq!(m.units, "^F");
    }

    #[test]
    fn test_reject_unknown_code() {
        assert!(parse_frame(b"Z 1.0 V").is_none());
        assert!(parse_frame(b"d 1.0 V").is_none());
        assert!(parse_frame(b"1.0 V").is_none());
    }

    #[test]
    fn test_reject_empty() {
        assert!(parse_frame(b"").is_none());
        assert!(parse_frame(b"   \t ").is_none());
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let m = parse("  A 230.1 V  ");
        assert_eq!(m.mode, Mode::Ac);
        assert_eq!(m.reading, "230.1");
        assert_eq!(m.units, "V");
    }

    #[test]
    fn test_non_ascii_bytes_dropped() {
        let m = parse_frame(b"D\xff 1.5\x80 V").unwrap();
        assert_eq!(m.raw, "D 1.5 V");
        assert_eq!(m.reading, "1.5");
        assert_eq!(m.units, "V");
    }

    #[test]
    fn test_decode_frame() {
        assert_eq!(decode_frame(b"AB\xc3\xa9C"), "ABC");
        assert_eq!(decode_frame(&[0xff, 0xfe]), "");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn decode_never_fails(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
                let decoded = decode_frame(&bytes);
                prop_assert!(decoded.is_ascii());
                prop_assert_eq!(decoded.len(), bytes.iter().filter(|b| b.is_ascii()).count());
            }

            #[test]
            fn parse_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
                let _ = parse_frame(&bytes);
            }

            #[test]
            fn unknown_code_is_rejected(
                code in (0u8..0x80).prop_map(char::from).prop_filter("not a mode code", |c| {
                    !c.is_whitespace() && !Mode::is_known_code(*c)
                }),
                rest in "[ -~]{0,20}"
            ) {
                let frame = format!("{code}{rest}");
                prop_assert!(parse_frame(frame.as_bytes()).is_none());
            }

            #[test]
            fn number_reading_is_verbatim(
                code in prop::sample::select(Mode::CODES.to_vec()),
                number in "[+-]?[0-9]{1,4}(\\.[0-9]{1,4})?",
                units in "(V|mV|Ohm|nF|Hz)"
            ) {
                let frame = format!("{code} {number} {units}");
                let m = parse_frame(frame.as_bytes()).unwrap();
                prop_assert_eq!(m.reading, number);
                prop_assert_eq!(m.units, units);
            }
        }
    }
}
