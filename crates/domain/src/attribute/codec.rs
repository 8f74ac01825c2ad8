//! Value codecs for raw attribute strings.

const TRUE_TOKEN: &str = "1";
const FALSE_TOKEN: &str = "0";

/// `"1"` → `true`, `"0"` → `false`, anything else → `None`.
#[must_use]
pub fn decode_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        TRUE_TOKEN => Some(true),
        FALSE_TOKEN => Some(false),
        _ => None,
    }
}

#[must_use]
pub fn encode_bool(value: bool) -> &'static str {
    if value { TRUE_TOKEN } else { FALSE_TOKEN }
}

/// Parse a decimal integer, tolerating surrounding whitespace.
#[must_use]
pub fn decode_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Convert tenths of a degree to degrees. The appliance uses `0` for
/// "no reading", so it maps to `None` rather than 0 °C.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn decode_tenths(raw: i64) -> Option<f64> {
    (raw != 0).then(|| raw as f64 / 10.0)
}

/// Encode degrees as rounded tenths of a degree.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode_tenths(celsius: f64) -> String {
    ((celsius * 10.0).round() as i64).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_decode_boolean_tokens() {
        assert_eq!(decode_bool("1"), Some(true));
        assert_eq!(decode_bool("0"), Some(false));
        assert_eq!(decode_bool("true"), None);
    }

    #[test]
    fn should_encode_booleans_as_tokens() {
        assert_eq!(encode_bool(true), "1");
        assert_eq!(encode_bool(false), "0");
    }

    #[test]
    fn should_parse_integers_or_give_up() {
        assert_eq!(decode_int("600"), Some(600));
        assert_eq!(decode_int(" 42 "), Some(42));
        assert_eq!(decode_int("4.2"), None);
        assert_eq!(decode_int(""), None);
    }

    #[test]
    fn should_encode_eighteen_and_a_half_degrees() {
        assert_eq!(encode_tenths(18.5), "185");
    }

    #[test]
    fn should_decode_tenths() {
        assert_eq!(decode_tenths(185), Some(18.5));
    }

    #[test]
    fn should_decode_zero_as_no_reading() {
        assert_eq!(decode_tenths(0), None);
    }

    #[test]
    fn should_round_to_nearest_tenth() {
        assert_eq!(encode_tenths(180.04), "1800");
        assert_eq!(encode_tenths(180.06), "1801");
        assert_eq!(encode_tenths(200.0), "2000");
    }
}
