use std::time::SystemTime;
use chrono::{DateTime, Local};

pub fn format_datetime(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn formats_to_seconds() {
        let formatted = format_datetime(UNIX_EPOCH + Duration::from_secs(86_400 * 365));
        assert_eq!(formatted.len(), "1971-01-01 00:00:00".len());
        assert!(formatted.starts_with("197"));
    }
}
