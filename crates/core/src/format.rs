use crate::types::Segment;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format a segment's span as `M:SS - M:SS`
pub fn format_segment_range(segment: &Segment) -> String {
    format!("{} - {}", short_time(segment.start), short_time(segment.end))
}

fn short_time(seconds: f64) -> String {
    let mins = (seconds / 60.0).floor() as u32;
    let secs = (seconds % 60.0).floor() as u32;
    format!("{}:{:02}", mins, secs)
}

/// Format transcript segments with timestamps
pub fn format_transcript_with_timestamps(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start), seg.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Index of the subtitle showing at `time`, first match wins on overlap.
pub fn active_segment(segments: &[Segment], time: f64) -> Option<usize> {
    segments.iter().position(|seg| seg.contains(time))
}

/// Parse `h:mm:ss`, `mm:ss` or plain seconds. Blank input yields `None`.
pub fn parse_time_to_seconds(input: &str) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut seconds = 0.0;
    for (unit, part) in parts.iter().rev().enumerate() {
        let value: f64 = part.trim().parse().ok()?;
        if value < 0.0 || !value.is_finite() {
            return None;
        }
        seconds += value * 60f64.powi(unit as i32);
    }
    Some(seconds)
}

/// Render segments as a SubRip (.srt) document
pub fn to_srt(segments: &[Segment]) -> String {
    let mut output = String::new();
    for (i, seg) in segments.iter().enumerate() {
        output.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            srt_time(seg.start),
            srt_time(seg.end),
            seg.text.trim()
        ));
    }
    output
}

fn srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let (hours, rest) = (total_ms / 3_600_000, total_ms % 3_600_000);
    let (mins, rest) = (rest / 60_000, rest % 60_000);
    let (secs, ms) = (rest / 1000, rest % 1000);
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Vec<Segment> {
        vec![
            Segment::new(0.0, 2.5, "Hola"),
            Segment::new(2.5, 5.0, " ¿Qué tal? "),
            Segment::new(65.25, 70.0, "Adiós"),
        ]
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.9), "01:05");
        assert_eq!(format_segment_range(&transcript()[2]), "1:05 - 1:10");
    }

    #[test]
    fn transcript_lines_are_trimmed() {
        let text = format_transcript_with_timestamps(&transcript());
        assert_eq!(text, "[00:00] Hola\n[00:02] ¿Qué tal?\n[01:05] Adiós");
    }

    #[test]
    fn active_segment_follows_playback() {
        let segs = transcript();
        assert_eq!(active_segment(&segs, 1.0), Some(0));
        // boundary belongs to the earlier segment
        assert_eq!(active_segment(&segs, 2.5), Some(0));
        assert_eq!(active_segment(&segs, 3.0), Some(1));
        assert_eq!(active_segment(&segs, 30.0), None);
        assert_eq!(active_segment(&[], 1.0), None);
    }

    #[test]
    fn parses_clock_times() {
        assert_eq!(parse_time_to_seconds("45"), Some(45.0));
        assert_eq!(parse_time_to_seconds("1:30"), Some(90.0));
        assert_eq!(parse_time_to_seconds("1:02:03"), Some(3723.0));
        assert_eq!(parse_time_to_seconds("  "), None);
        assert_eq!(parse_time_to_seconds("1:xx"), None);
        assert_eq!(parse_time_to_seconds("1:2:3:4"), None);
    }

    #[test]
    fn srt_export() {
        let srt = to_srt(&transcript()[1..]);
        assert_eq!(
            srt,
            concat!(
                "1\n00:00:02,500 --> 00:00:05,000\n¿Qué tal?\n\n",
                "2\n00:01:05,250 --> 00:01:10,000\nAdiós\n\n",
            )
        );
    }
}
