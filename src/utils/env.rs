use std::time::Duration;

/// Read `WHARF_{key}`, falling back to plain `{key}`.
///
/// ```rust
/// use wharf::utils::get_env_with_prefix;
///
/// // WHARF_PORT wins over PORT when both are set
/// let port = get_env_with_prefix("PORT");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("WHARF_{key}"))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Parse `5h`, `30m`, `45s`, `250ms` or a bare number of seconds.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits.parse().ok()?;

    let duration = match unit.trim() {
        "" | "s" => Duration::from_secs(amount),
        "ms" => Duration::from_millis(amount),
        "m" => Duration::from_secs(amount.checked_mul(60)?),
        "h" => Duration::from_secs(amount.checked_mul(3600)?),
        "d" => Duration::from_secs(amount.checked_mul(86_400)?),
        _ => return None,
    };
    Some(duration)
}
