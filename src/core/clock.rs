//! `mm:ss` clock strings used by the HUD, the round summary and the
//! Match leaderboard's stored `time` field.

/// Format whole seconds as zero-padded `mm:ss`. Minutes do not wrap.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Parse `mm:ss` back into seconds.
pub fn parse_clock(text: &str) -> Option<u32> {
    let (minutes, seconds) = text.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes.checked_mul(60)?.checked_add(seconds)
}
