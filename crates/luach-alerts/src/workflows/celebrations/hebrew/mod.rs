//! Hebrew calendar dates as returned by the conversion service.
//!
//! The service renders dates as whitespace-separated text: a day written in
//! Hebrew numerals, one or more month tokens (pointed, with the `ב` prefix),
//! and a trailing year numeral, e.g. `כ״א בַּאֲדָר א׳ תשפ״ד`. Matching works on
//! the parsed day and a normalized month key rather than raw token prefixes.

mod hebcal;
mod resolver;

pub use hebcal::{HebcalClient, DEFAULT_HEBCAL_URL};
pub use resolver::{ConversionError, HebrewCalendarGateway, HebrewDateResolver};

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HebrewDate {
    pub day: u8,
    /// Month name with niqqud and the `ב` prefix removed.
    pub month: String,
    pub year: u32,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HebrewDateParseError {
    #[error("expected day, month and year tokens in '{0}'")]
    MissingTokens(String),
    #[error("'{0}' is not a Hebrew day numeral")]
    InvalidDay(String),
    #[error("'{0}' is not a Hebrew year numeral")]
    InvalidYear(String),
    #[error("month name missing in '{0}'")]
    EmptyMonth(String),
}

impl HebrewDate {
    pub fn parse(text: &str) -> Result<Self, HebrewDateParseError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(HebrewDateParseError::MissingTokens(text.trim().to_string()));
        }

        let day_token = tokens[0];
        let year_token = tokens[tokens.len() - 1];
        let month_tokens = &tokens[1..tokens.len() - 1];

        let day = numeral_value(day_token)
            .filter(|value| (1..=30).contains(value))
            .and_then(|value| u8::try_from(value).ok())
            .ok_or_else(|| HebrewDateParseError::InvalidDay(day_token.to_string()))?;

        let year = numeral_value(year_token)
            .map(|value| if value < 1000 { 5000 + value } else { value })
            .ok_or_else(|| HebrewDateParseError::InvalidYear(year_token.to_string()))?;

        let month = month_key(month_tokens);
        if month.is_empty() {
            return Err(HebrewDateParseError::EmptyMonth(text.trim().to_string()));
        }

        Ok(Self {
            day,
            month,
            year,
            text: tokens.join(" "),
        })
    }

    /// Every token before the trailing year, as rendered by the service.
    pub fn day_month_text(&self) -> &str {
        match self.text.rfind(' ') {
            Some(idx) => &self.text[..idx],
            None => &self.text,
        }
    }

    pub fn as_text(&self) -> &str {
        &self.text
    }

    /// Yearly recurrence: same day and month key, any year.
    ///
    /// Month keys are compared as written, so a plain Adar date never matches
    /// Adar I or Adar II of a leap year.
    pub fn same_day_month(&self, other: &HebrewDate) -> bool {
        self.day == other.day && self.month == other.month
    }
}

impl fmt::Display for HebrewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn month_key(tokens: &[&str]) -> String {
    let mut parts = Vec::with_capacity(tokens.len());
    for (idx, token) in tokens.iter().enumerate() {
        let mut bare = strip_points(token);
        if idx == 0 && bare.starts_with('ב') && bare.chars().count() > 1 {
            bare.remove(0);
        }
        if !bare.is_empty() {
            parts.push(bare);
        }
    }
    parts.join(" ")
}

fn strip_points(token: &str) -> String {
    token.chars().filter(|c| !is_point(*c)).collect()
}

fn is_point(c: char) -> bool {
    matches!(
        c,
        '\u{0591}'..='\u{05BD}' | '\u{05BF}' | '\u{05C1}' | '\u{05C2}' | '\u{05C4}' | '\u{05C5}' | '\u{05C7}'
    )
}

/// Sum of the letter values of a Hebrew numeral, ignoring geresh marks.
fn numeral_value(token: &str) -> Option<u32> {
    let mut total = 0;
    let mut seen = false;
    for c in strip_points(token).chars() {
        if matches!(c, '\u{05F3}' | '\u{05F4}' | '\'' | '"') {
            continue;
        }
        total += letter_value(c)?;
        seen = true;
    }
    seen.then_some(total)
}

fn letter_value(c: char) -> Option<u32> {
    let value = match c {
        'א' => 1,
        'ב' => 2,
        'ג' => 3,
        'ד' => 4,
        'ה' => 5,
        'ו' => 6,
        'ז' => 7,
        'ח' => 8,
        'ט' => 9,
        'י' => 10,
        'כ' | 'ך' => 20,
        'ל' => 30,
        'מ' | 'ם' => 40,
        'נ' | 'ן' => 50,
        'ס' => 60,
        'ע' => 70,
        'פ' | 'ף' => 80,
        'צ' | 'ץ' => 90,
        'ק' => 100,
        'ר' => 200,
        'ש' => 300,
        'ת' => 400,
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_token_month() {
        let date = HebrewDate::parse("ה׳ בְּאָב תשפ״ד").expect("parses");
        assert_eq!(date.day, 5);
        assert_eq!(date.month, "אב");
        assert_eq!(date.year, 5784);
        assert_eq!(date.day_month_text(), "ה׳ בְּאָב");
        assert_eq!(date.as_text(), "ה׳ בְּאָב תשפ״ד");
    }

    #[test]
    fn parses_multi_token_month() {
        let date = HebrewDate::parse("כ״א בַּאֲדָר א׳ תשפ״ד").expect("parses");
        assert_eq!(date.day, 21);
        assert_eq!(date.month, "אדר א׳");
        assert_eq!(date.day_month_text(), "כ״א בַּאֲדָר א׳");
    }

    #[test]
    fn fifteen_and_thirty_decode() {
        let tu = HebrewDate::parse("ט״ו בִּשְׁבָט תשמ״ה").expect("parses");
        assert_eq!((tu.day, tu.month.as_str(), tu.year), (15, "שבט", 5745));

        let last = HebrewDate::parse("ל׳ בְּחֶשְׁוָן תשפ״ד").expect("parses");
        assert_eq!((last.day, last.month.as_str()), (30, "חשון"));
    }

    #[test]
    fn same_day_month_ignores_year() {
        let a = HebrewDate::parse("ה׳ בְּאָב תשפ״ד").expect("parses");
        let b = HebrewDate::parse("ה׳ בְּאָב תש״ן").expect("parses");
        assert!(a.same_day_month(&b));
    }

    #[test]
    fn differing_tokens_never_match() {
        let base = HebrewDate::parse("ה׳ בְּאָב תשפ״ד").expect("parses");
        let other_day = HebrewDate::parse("ו׳ בְּאָב תשפ״ד").expect("parses");
        let other_month = HebrewDate::parse("ה׳ בֶּאֱלוּל תשפ״ד").expect("parses");
        let adar_one = HebrewDate::parse("ה׳ בַּאֲדָר א׳ תשפ״ד").expect("parses");
        let adar_two = HebrewDate::parse("ה׳ בַּאֲדָר ב׳ תשפ״ד").expect("parses");

        assert!(!base.same_day_month(&other_day));
        assert!(!base.same_day_month(&other_month));
        assert!(!adar_one.same_day_month(&adar_two));
    }

    #[test]
    fn plain_adar_stays_apart_from_leap_year_adars() {
        let birth = HebrewDate::parse("ה׳ בַּאֲדָר תשפ״ג").expect("parses");
        let adar_one = HebrewDate::parse("ה׳ בַּאֲדָר א׳ תשפ״ד").expect("parses");
        let adar_two = HebrewDate::parse("ה׳ בַּאֲדָר ב׳ תשפ״ד").expect("parses");
        let next_plain = HebrewDate::parse("ה׳ בַּאֲדָר תשפ״ה").expect("parses");

        assert_eq!(birth.month, "אדר");
        assert!(!birth.same_day_month(&adar_one));
        assert!(!birth.same_day_month(&adar_two));
        assert!(birth.same_day_month(&next_plain));
    }

    #[test]
    fn collapses_whitespace_in_text() {
        let date = HebrewDate::parse("  ה׳   בְּאָב\tתשפ״ד ").expect("parses");
        assert_eq!(date.as_text(), "ה׳ בְּאָב תשפ״ד");
    }

    #[test]
    fn rejects_malformed_text() {
        assert_eq!(
            HebrewDate::parse("ה׳ תשפ״ד"),
            Err(HebrewDateParseError::MissingTokens("ה׳ תשפ״ד".to_string()))
        );
        assert!(matches!(
            HebrewDate::parse("5 בְּאָב תשפ״ד"),
            Err(HebrewDateParseError::InvalidDay(_))
        ));
        assert!(matches!(
            HebrewDate::parse("ה׳ בְּאָב 2024"),
            Err(HebrewDateParseError::InvalidYear(_))
        ));
        assert!(matches!(
            HebrewDate::parse("ת״ק בְּאָב תשפ״ד"),
            Err(HebrewDateParseError::InvalidDay(_))
        ));
    }
}
