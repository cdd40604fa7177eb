//! Fixed Hebrew message templates, one subject and body per event kind.

use super::domain::{Occasion, RenderedMessage};

const FOOTER: &str = "ההודעה נשלחה אלייך ממערך צל\"ע. לצערך הרב לא תוכל להסיר את עצמך אלא אם תתחנן ממש לזומר";

pub(crate) fn render(occasion: &Occasion, name: &str, years: u32) -> RenderedMessage {
    match occasion {
        Occasion::Birthday { .. } => RenderedMessage {
            subject: "יום הולדת לחייל".to_string(),
            body: format!("היום יום ההולדת של {name} הוא בן {years}\n\n{FOOTER}"),
        },
        // The event date is carried on the occasion but the message only counts years.
        Occasion::Anniversary { .. } => RenderedMessage {
            subject: "עופיון עשה סיבוב על הגריל".to_string(),
            body: format!(
                "העופיון {name} סיים {years} סיבובים על הגריל מאז שהשתחרר\n\n{FOOTER}"
            ),
        },
        Occasion::HebrewBirthday { hebrew_birth_date } => RenderedMessage {
            subject: "היום יום הולדת לצדיק".to_string(),
            body: format!(
                "היי,\n\n\
                 היום הזה, ביום {hebrew_birth_date}, {name} הצדיק בן צדיקים, חוגג {years} שנים של צדיקות, יראת השם, \
                 אהבת תורה, ומעשים טובים. מי ייתן והקדוש ברוך הוא יברך את {name} בשפע של ברכה והצלחה בכל מעשה ידיו, \
                 ושיזכה להמשיך בדרכו הנעלה ובנתיבי השם יתברך עד 120 שנה של בריאות, אושר ושמחה.\n\n\
                 {FOOTER}."
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn birthday_states_name_and_age() {
        let message = render(
            &Occasion::Birthday {
                birth_date: NaiveDate::from_ymd_opt(1990, 7, 27).expect("valid date"),
            },
            "Dana",
            34,
        );
        assert_eq!(message.subject, "יום הולדת לחייל");
        assert_eq!(
            message.body,
            format!("היום יום ההולדת של Dana הוא בן 34\n\n{FOOTER}")
        );
    }

    #[test]
    fn anniversary_counts_years() {
        let message = render(
            &Occasion::Anniversary {
                event_date: NaiveDate::from_ymd_opt(2010, 7, 4).expect("valid date"),
            },
            "Avi",
            14,
        );
        assert_eq!(message.subject, "עופיון עשה סיבוב על הגריל");
        assert!(message.body.starts_with("העופיון Avi סיים 14 סיבובים"));
        assert!(message.body.ends_with(FOOTER));
    }

    #[test]
    fn hebrew_birthday_quotes_the_hebrew_date() {
        let message = render(
            &Occasion::HebrewBirthday {
                hebrew_birth_date: "ה׳ בְּאָב תש״ן".to_string(),
            },
            "Dana",
            34,
        );
        assert_eq!(message.subject, "היום יום הולדת לצדיק");
        assert!(message.body.starts_with("היי,\n\n"));
        assert!(message
            .body
            .contains("ביום ה׳ בְּאָב תש״ן, Dana הצדיק בן צדיקים, חוגג 34 שנים של צדיקות, יראת השם, אהבת תורה"));
        assert!(message.body.ends_with(&format!("{FOOTER}.")));
    }
}
