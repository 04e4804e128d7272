//! FILETIME ([MS-DTYP] section 2.3.3) is a signed 64-bit count of 100-ns
//! intervals since 1601-01-01 00:00:00 UTC.

/// Seconds between 1601-01-01 and the Unix epoch (1970-01-01).
const EPOCH_DIFF_SECONDS: i64 = 11_644_473_600;
/// 100-ns ticks per second.
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Converts a FILETIME value to a short and long ISO-8601-ish display
/// string. `0` renders as the literal FILETIME epoch (the long form keeping
/// a literal `.0` fraction); a value whose Unix time doesn't fit in a
/// signed 32-bit `time_t` renders both forms as the literal
/// `Could not convert`, matching the reference tool's behavior on 32-bit
/// hosts. The long form's fractional 100-ns component is unpadded, as the
/// reference tool prints it.
pub fn filetime_to_iso(ft: i64) -> (String, String) {
    if ft == 0 {
        return (
            "1601-01-01 00:00:00 (UTC)".to_string(),
            "1601-01-01 00:00:00.0 (UTC)".to_string(),
        );
    }

    let seconds_since_epoch = ft / TICKS_PER_SECOND - EPOCH_DIFF_SECONDS;
    let fraction_100ns = ft.rem_euclid(TICKS_PER_SECOND);

    if seconds_since_epoch > i32::MAX as i64 || seconds_since_epoch < i32::MIN as i64 {
        return ("Could not convert".to_string(), "Could not convert".to_string());
    }

    let Some(naive) = chrono::DateTime::from_timestamp(seconds_since_epoch, 0) else {
        return ("Could not convert".to_string(), "Could not convert".to_string());
    };

    let short = format!("{} (UTC)", naive.format("%Y-%m-%d %H:%M:%S"));
    let long = format!(
        "{}.{} (UTC)",
        naive.format("%Y-%m-%d %H:%M:%S"),
        fraction_100ns
    );
    (short, long)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_filetime_is_the_epoch() {
        let (short, long) = filetime_to_iso(0);
        assert_eq!(short, "1601-01-01 00:00:00 (UTC)");
        assert_eq!(long, "1601-01-01 00:00:00.0 (UTC)");
    }

    #[test]
    fn unix_epoch_roundtrips() {
        let ft = EPOCH_DIFF_SECONDS * TICKS_PER_SECOND;
        let (short, long) = filetime_to_iso(ft);
        assert_eq!(short, "1970-01-01 00:00:00 (UTC)");
        assert_eq!(long, "1970-01-01 00:00:00.0 (UTC)");
    }

    #[test]
    fn long_form_fraction_is_unpadded() {
        let ft = EPOCH_DIFF_SECONDS * TICKS_PER_SECOND + 500;
        let (_, long) = filetime_to_iso(ft);
        assert_eq!(long, "1970-01-01 00:00:00.500 (UTC)");
    }

    #[test]
    fn overflow_renders_sentinel() {
        let (short, long) = filetime_to_iso(i64::MAX);
        assert_eq!(short, "Could not convert");
        assert_eq!(long, "Could not convert");
    }
}
