//! Text formatting shared by the panel, presence and notifications.

/// `"{hours}h {minutes}m"`, floor division, seconds dropped
pub fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}h {}m", hours, minutes)
}

/// `"{count}/{max}"`
pub fn format_players(count: u32, max: u32) -> String {
    format!("{}/{}", count, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_floors() {
        assert_eq!(format_uptime(3661), "1h 1m");
        assert_eq!(format_uptime(3599), "0h 59m");
        assert_eq!(format_uptime(0), "0h 0m");
        assert_eq!(format_uptime(59), "0h 0m");
    }

    #[test]
    fn test_uptime_past_a_day() {
        assert_eq!(format_uptime(90_000), "25h 0m");
    }

    #[test]
    fn test_players() {
        assert_eq!(format_players(12, 48), "12/48");
        assert_eq!(format_players(0, 0), "0/0");
    }
}
