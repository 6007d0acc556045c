use chrono::{DateTime, Duration, Utc};

/// A point in time given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeExpr {
    /// Offset from now: `now`, `T+2h`, `T-30m`
    Relative(Duration),
    Absolute(DateTime<Utc>),
}

impl TimeExpr {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("now") {
            return Ok(TimeExpr::Relative(Duration::zero()));
        }

        // Relative: T+10s, T-5m
        if s.to_lowercase().starts_with('t') {
            let (neg, rest) = split_sign(&s[1..]);
            let dur = parse_duration(rest)?;
            return Ok(TimeExpr::Relative(if neg { -dur } else { dur }));
        }

        // Absolute with offset: 2026-01-12T10:00:00Z - 10s
        if let Some(idx) = s.rfind(['+', '-']) {
            if idx > 10 {
                if let Ok(base) = DateTime::parse_from_rfc3339(s[..idx].trim()) {
                    let (neg, rest) = split_sign(&s[idx..]);
                    let dur = parse_duration(rest)?;
                    return Ok(TimeExpr::Absolute(
                        base.with_timezone(&Utc) + if neg { -dur } else { dur },
                    ));
                }
            }
        }

        // Plain absolute
        DateTime::parse_from_rfc3339(s)
            .map(|dt| TimeExpr::Absolute(dt.with_timezone(&Utc)))
            .map_err(|e| e.to_string())
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeExpr::Relative(d) => now + *d,
            TimeExpr::Absolute(t) => *t,
        }
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    }
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}
