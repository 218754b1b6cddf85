//! Chapter upload date parsing.
//!
//! Handles relative dates ("2 days ago", "hace 3 horas", "há 1 semana"),
//! the words for yesterday and today, ordinal suffixes, and absolute dates
//! with localized month names. Anything else parses to `0` (unknown).

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use regex::{Captures, Regex};

use crate::source::utils::compile_static_regex;

static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?i)\b(\d+)(st|nd|rd|th)\b"));
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\p{L}+"));
static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(\d+)\s*(\p{L}+)"));

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Spanish month names and abbreviations, by month index.
const SPANISH_MONTHS: &[(&str, usize)] = &[
    ("enero", 0),
    ("ene", 0),
    ("febrero", 1),
    ("feb", 1),
    ("marzo", 2),
    ("mar", 2),
    ("abril", 3),
    ("abr", 3),
    ("mayo", 4),
    ("may", 4),
    ("junio", 5),
    ("jun", 5),
    ("julio", 6),
    ("jul", 6),
    ("agosto", 7),
    ("ago", 7),
    ("septiembre", 8),
    ("setiembre", 8),
    ("sept", 8),
    ("sep", 8),
    ("octubre", 9),
    ("oct", 9),
    ("noviembre", 10),
    ("nov", 10),
    ("diciembre", 11),
    ("dic", 11),
];

const PORTUGUESE_MONTHS: &[(&str, usize)] = &[
    ("janeiro", 0),
    ("jan", 0),
    ("fevereiro", 1),
    ("fev", 1),
    ("março", 2),
    ("mar", 2),
    ("abril", 3),
    ("abr", 3),
    ("maio", 4),
    ("mai", 4),
    ("junho", 5),
    ("jun", 5),
    ("julho", 6),
    ("jul", 6),
    ("agosto", 7),
    ("ago", 7),
    ("setembro", 8),
    ("set", 8),
    ("outubro", 9),
    ("out", 9),
    ("novembro", 10),
    ("nov", 10),
    ("dezembro", 11),
    ("dez", 11),
];

const YESTERDAY: &[&str] = &["yesterday", "ayer", "ontem"];
const TODAY: &[&str] = &["today", "hoy", "hoje"];

/// A `chrono` date pattern plus the language its month names are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    /// `chrono::format::strftime` pattern, e.g. `"%B %d, %Y"`.
    pub pattern: &'static str,
    /// Language tag of month names: `"en"`, `"es"` or `"pt"`.
    pub locale: &'static str,
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new("%B %d, %Y", "en")
    }
}

impl DateFormat {
    #[must_use]
    pub const fn new(pattern: &'static str, locale: &'static str) -> Self {
        Self { pattern, locale }
    }

    /// Parses `text` into epoch milliseconds relative to `now`, `0` when the
    /// text is not a recognizable date.
    #[must_use]
    pub fn parse(&self, text: &str, now: DateTime<Utc>) -> i64 {
        let text = text.trim();
        if text.is_empty() {
            return 0;
        }
        let lower = text.to_lowercase();

        if is_relative(&lower) {
            return relative_date(&lower, now).map_or(0, |date| date.timestamp_millis());
        }
        if YESTERDAY.iter().any(|word| lower.starts_with(word)) {
            return start_of_day(now - Duration::days(1));
        }
        if TODAY.iter().any(|word| lower.starts_with(word)) {
            return start_of_day(now);
        }

        let cleaned = ORDINAL_RE.replace_all(text, "$1");
        let translated = self.translate_months(&cleaned);
        NaiveDate::parse_from_str(translated.trim(), self.pattern)
            .map(|date| date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
            .unwrap_or(0)
    }

    /// Replaces localized month names with English ones so `%B` can read them.
    fn translate_months(&self, text: &str) -> String {
        let table = match self.locale.split(['-', '_']).next().unwrap_or_default() {
            "es" => SPANISH_MONTHS,
            "pt" => PORTUGUESE_MONTHS,
            _ => return text.to_string(),
        };
        WORD_RE
            .replace_all(text, |caps: &Captures| {
                let word = caps[0].to_lowercase();
                table
                    .iter()
                    .find(|(name, _)| *name == word)
                    .map_or_else(|| caps[0].to_string(), |(_, index)| ENGLISH_MONTHS[*index].to_string())
            })
            .into_owned()
    }
}

fn is_relative(lower: &str) -> bool {
    lower.ends_with(" ago")
        || lower.starts_with("hace ")
        || lower.starts_with("há ")
        || lower.starts_with("ha ")
}

fn relative_date(lower: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let captures = RELATIVE_RE.captures(lower)?;
    let amount: u32 = captures[1].parse().ok()?;
    let unit = &captures[2];
    let amount_i64 = i64::from(amount);

    if unit.starts_with("sec") || unit.starts_with("seg") {
        Some(now - Duration::seconds(amount_i64))
    } else if unit.starts_with("min") {
        Some(now - Duration::minutes(amount_i64))
    } else if unit.starts_with("hour") || unit.starts_with("hora") || unit.starts_with("hr") {
        Some(now - Duration::hours(amount_i64))
    } else if unit.starts_with("day") || unit.starts_with("día") || unit.starts_with("dia") {
        Some(now - Duration::days(amount_i64))
    } else if unit.starts_with("week") || unit.starts_with("semana") {
        Some(now - Duration::weeks(amount_i64))
    } else if unit.starts_with("mo") || unit.starts_with("mes") || unit.starts_with("mês") {
        now.checked_sub_months(Months::new(amount))
    } else if unit.starts_with("year") || unit.starts_with("año") || unit.starts_with("ano") {
        now.checked_sub_months(Months::new(amount.saturating_mul(12)))
    } else {
        None
    }
}

fn start_of_day(moment: DateTime<Utc>) -> i64 {
    moment
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp_millis()
}
