//! iCalendar (RFC 5545) export of a single meal.

use chrono::{DateTime, Duration, Utc};

use crate::models::Meal;

const PRODID: &str = "-//Campus Meal Matching//EN";

fn ics_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value: backslash, comma, semicolon, newline.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Render a one-event calendar for `meal`. Without an end time the event
/// lasts one hour.
pub fn render_ics(meal: &Meal, host_name: &str, location_name: &str) -> String {
    let end = meal.end_time.unwrap_or(meal.start_time + Duration::hours(1));
    let description = format!(
        "Host: {}\\n{}",
        escape_text(host_name),
        escape_text(meal.description.as_deref().unwrap_or_default()),
    );

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@mealmatch", meal.id),
        format!("DTSTAMP:{}", ics_timestamp(meal.created_at)),
        format!("SUMMARY:{}", escape_text(&meal.title)),
        format!("DTSTART:{}", ics_timestamp(meal.start_time)),
        format!("DTEND:{}", ics_timestamp(end)),
        format!("DESCRIPTION:{description}"),
        format!("LOCATION:{}", escape_text(location_name)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut ics = lines.join("\r\n");
    ics.push_str("\r\n");
    ics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealStatus;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn meal() -> Meal {
        let start = Utc.with_ymd_and_hms(2025, 12, 3, 18, 30, 0).unwrap();
        Meal {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            title: "Dinner, then study".into(),
            description: Some("Bring notes; CS 330".into()),
            start_time: start,
            end_time: None,
            max_guests: 3,
            status: MealStatus::Open,
            created_at: start - Duration::days(2),
        }
    }

    #[test]
    fn defaults_to_one_hour_event() {
        let ics = render_ics(&meal(), "Sam", "Warren");
        assert!(ics.contains("DTSTART:20251203T183000Z\r\n"));
        assert!(ics.contains("DTEND:20251203T193000Z\r\n"));
    }

    #[test]
    fn uses_explicit_end_time() {
        let mut m = meal();
        m.end_time = Some(m.start_time + Duration::minutes(45));
        let ics = render_ics(&m, "Sam", "Warren");
        assert!(ics.contains("DTEND:20251203T191500Z\r\n"));
    }

    #[test]
    fn wraps_a_single_event_with_crlf_lines() {
        let ics = render_ics(&meal(), "Sam", "Warren");
        assert!(ics.starts_with(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Campus Meal Matching//EN\r\n"
        ));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(!ics.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn escapes_text_values() {
        let ics = render_ics(&meal(), "Sam", "Marciano; Level 2");
        assert!(ics.contains("SUMMARY:Dinner\\, then study\r\n"));
        assert!(ics.contains("DESCRIPTION:Host: Sam\\nBring notes\\; CS 330\r\n"));
        assert!(ics.contains("LOCATION:Marciano\\; Level 2\r\n"));
    }

    #[test]
    fn missing_description_leaves_host_line() {
        let mut m = meal();
        m.description = None;
        let ics = render_ics(&m, "Sam", "Warren");
        assert!(ics.contains("DESCRIPTION:Host: Sam\\n\r\n"));
    }
}
