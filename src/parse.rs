//! Output parsing shared by every backend

use chrono::NaiveDate;

use crate::error::{DialogError, Result};
use crate::request::{DialogKind, Rgb};

/// Field order of a printed date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `2009 01 15`
    YearMonthDay,
    /// `15/01/2009`
    DayMonthYear,
}

/// Split multi-value output on any of `separators`, keeping output order and dropping empty fields
pub fn split_values(raw: &str, separators: &[char]) -> Vec<String> {
    raw.split(separators)
        .map(|s| s.trim_end_matches('\r'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pull three integers out of `raw` in the given order
pub fn parse_date(raw: &str, order: DateOrder) -> Result<NaiveDate> {
    let numbers: Vec<i64> = raw
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| DialogError::parse(DialogKind::Calendar, raw))?;

    let [a, b, c] = numbers[..] else {
        return Err(DialogError::parse(DialogKind::Calendar, raw));
    };
    let (year, month, day) = match order {
        DateOrder::YearMonthDay => (a, b, c),
        DateOrder::DayMonthYear => (c, b, a),
    };

    let date = i32::try_from(year).ok().zip(u32::try_from(month).ok()).zip(u32::try_from(day).ok());
    date.and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
        .ok_or_else(|| DialogError::parse(DialogKind::Calendar, raw))
}

/// Parse `#rrggbb`, `#rrrrggggbbbb` or `rgb(r,g,b)` / `rgba(r,g,b,a)`
pub fn parse_color(raw: &str) -> Result<Rgb> {
    let fail = || DialogError::parse(DialogKind::Color, raw);
    let s = raw.trim();

    if let Some(hex) = s.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(fail());
        }
        let width = match hex.len() {
            6 => 2,
            12 => 4,
            _ => return Err(fail()),
        };
        // Only the high byte of each 16-bit channel matters
        let channel = |i: usize| u8::from_str_radix(&hex[i * width..i * width + 2], 16).map_err(|_| fail());
        return Ok(Rgb::new(channel(0)?, channel(1)?, channel(2)?));
    }

    let inner = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(fail)?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 4 {
        return Err(fail());
    }
    let channel = |p: &str| p.parse::<u8>().map_err(|_| fail());
    Ok(Rgb::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
}

/// Parse a slider value; some tools print `42.000000`
pub fn parse_integer(raw: &str, kind: DialogKind) -> Result<i64> {
    // Sliders printing partial values end with the final one
    let s = raw.lines().map(str::trim).rfind(|l| !l.is_empty()).unwrap_or("");
    if let Ok(n) = s.parse::<i64>() {
        return Ok(n);
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
        .ok_or_else(|| DialogError::parse(kind, raw))
}

/// Map printed tags back to entry identifiers, in output order.
///
/// `tags[i]` is what the backend prints for entry `ids[i]`.
pub fn map_tags(tokens: &[String], tags: &[String], ids: &[String], kind: DialogKind) -> Result<Vec<String>> {
    tokens
        .iter()
        .map(|token| {
            tags.iter()
                .position(|t| t == token)
                .map(|i| ids[i].clone())
                .ok_or_else(|| DialogError::parse(kind, token.as_str()))
        })
        .collect()
}

/// Map a row of on/off flags (`0 1 1`) to the identifiers switched on
pub fn map_flags(raw: &str, ids: &[String], kind: DialogKind) -> Result<Vec<String>> {
    let flags: Vec<&str> = raw.split_whitespace().collect();
    if flags.len() != ids.len() {
        return Err(DialogError::parse(kind, raw));
    }
    let mut chosen = Vec::new();
    for (flag, id) in flags.iter().zip(ids) {
        match *flag {
            "1" | "on" => chosen.push(id.clone()),
            "0" | "off" => {}
            _ => return Err(DialogError::parse(kind, raw)),
        }
    }
    Ok(chosen)
}
