//! Transcoder progress-line scraping.

/// Progress reported by a single transcoder status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Output timestamp, e.g. `00:10:09.138`.
    pub time: String,
    /// Processing speed, e.g. `1.03x`.
    pub speed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressParseError {
    #[error("progress line has no '{0}=' field")]
    MissingField(&'static str),
}

/// Extract the `time=` and `speed=` fields from a status line such as
/// `frame=184 fps=9.7 size=364kB time=00:00:19.41 bitrate=153.7kbits/s speed=1.03x`.
///
/// Fields may appear in any order. The transcoder pads some values
/// (`speed= 1.2x`), so a key with an empty value takes the next token.
pub fn parse_progress_log(line: &str) -> Result<Progress, ProgressParseError> {
    let mut time = None;
    let mut speed = None;

    let mut tokens = line.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let value = if value.is_empty() {
            match tokens.peek() {
                Some(next) if !next.contains('=') => tokens.next().unwrap_or_default(),
                _ => value,
            }
        } else {
            value
        };

        match key {
            "time" if !value.is_empty() => time = Some(value.to_string()),
            "speed" if !value.is_empty() => speed = Some(value.to_string()),
            _ => {}
        }
    }

    Ok(Progress {
        time: time.ok_or(ProgressParseError::MissingField("time"))?,
        speed: speed.ok_or(ProgressParseError::MissingField("speed"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_lines() {
        let cases = [
            ("time=00:10:09.138 speed=1x", "00:10:09.138", "1x"),
            ("size=18859kB time=00:10:09.138 speed=1x", "00:10:09.138", "1x"),
            ("size=18859kB time=00:10:09.138 speed=1x dup=1", "00:10:09.138", "1x"),
            (
                "size=18859kB time=00:10:09.138 bitrate=253.5kbits/s speed=1x dup=1",
                "00:10:09.138",
                "1x",
            ),
            (
                "size=18859kB time=00:10:09.38 bitrate=253.5kbits/s speed=1x",
                "00:10:09.38",
                "1x",
            ),
            (
                "frame=184 fps=9.7 q=28.0 size=364kB time=00:00:19.41 bitrate=153.7kbits/s dup=0 drop=235 speed=1.03x",
                "00:00:19.41",
                "1.03x",
            ),
        ];
        for (line, time, speed) in cases {
            let progress = parse_progress_log(line).unwrap();
            assert_eq!(progress.time, time, "{line}");
            assert_eq!(progress.speed, speed, "{line}");
        }
    }

    #[test]
    fn test_padded_values() {
        let progress = parse_progress_log("frame=  12 time=00:00:01.00 speed= 1.2x").unwrap();
        assert_eq!(progress.time, "00:00:01.00");
        assert_eq!(progress.speed, "1.2x");
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            parse_progress_log("size=1kB speed=1x"),
            Err(ProgressParseError::MissingField("time"))
        );
        assert_eq!(
            parse_progress_log("time=00:00:01.00"),
            Err(ProgressParseError::MissingField("speed"))
        );
        assert_eq!(
            parse_progress_log("speed= time=00:00:01.00"),
            Err(ProgressParseError::MissingField("speed"))
        );
        assert!(parse_progress_log("").is_err());
    }
}
