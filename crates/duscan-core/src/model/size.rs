/// Human-readable byte formatting for the CLI front-end.
///
/// All internal sizes stay `u64`; floating point appears only at the
/// display boundary.

/// Format a byte count with a binary-unit suffix (1 KB = 1024 B here,
/// matching what disk tools conventionally display).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_print_without_fraction() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn kilobytes_and_up_carry_two_decimals() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
    }

    #[test]
    fn terabytes_cap_the_unit_ladder() {
        assert_eq!(format_size(1_099_511_627_776), "1.00 TB");
        assert!(format_size(u64::MAX).ends_with(" TB"));
    }
}
