
use chrono::NaiveDate;


/// This is the standard way of converting a date to a record file name in wasted-time.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("wasted_time_%d%m%Y.csv").to_string()
}

/// Formats seconds as `HH:MM:SS`. Fractions of a second are dropped and hours keep growing
/// past 99.
pub fn format_hms(seconds: f64) -> String {
    let total = seconds.max(0.) as u64;
    let (minutes, seconds) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_to_record_name, format_hms};

    #[test]
    fn test_record_name_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(date_to_record_name(date), "wasted_time_09032024.csv");
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(date_to_record_name(date), "wasted_time_31122024.csv");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0.), "00:00:00");
        assert_eq!(format_hms(59.9), "00:00:59");
        assert_eq!(format_hms(61.), "00:01:01");
        assert_eq!(format_hms(3600. * 3. + 62.), "03:01:02");
        assert_eq!(format_hms(3600. * 123.), "123:00:00");
        assert_eq!(format_hms(-5.), "00:00:00");
    }
}
