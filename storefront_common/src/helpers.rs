/// Parse a whole number of seconds from an optional environment value. Blank, unparseable or zero values fall back
/// to `default`.
pub fn parse_seconds(value: Option<String>, default: u64) -> u64 {
    value.and_then(|s| s.trim().parse::<u64>().ok()).filter(|v| *v > 0).unwrap_or(default)
}
