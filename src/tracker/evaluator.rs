//! Which sections count as open, and how they're reported on the console.

use crate::usf::Section;
use chrono::Local;
use yansi::Paint;

/// Sections that should trigger a notification this tick.
///
/// There's no memory of earlier ticks: a section that stays open is
/// returned every time.
pub fn sections_to_notify(sections: &[Section]) -> Vec<&Section> {
    sections.iter().filter(|s| s.is_open()).collect()
}

/// `[Intro to X] 12345 :: Open 3/23`
pub fn status_line(section: &Section) -> String {
    format_line(section, status_word(section))
}

/// Print one timestamped line per section, open or not. Colors are used
/// only while `yansi` styling is enabled.
pub fn report(sections: &[Section]) {
    let timestamp = format!("[{}]", Local::now().format("%H:%M:%S"));
    for section in sections {
        let line = if yansi::is_enabled() {
            colored_line(section)
        } else {
            status_line(section)
        };
        println!("{} {}", timestamp.bright_black(), line);
    }
}

fn status_word(section: &Section) -> &'static str {
    if section.is_open() { "Open" } else { "Closed" }
}

fn colored_line(section: &Section) -> String {
    let word = status_word(section);
    if section.is_open() {
        format_line(section, word.bright_green())
    } else {
        format_line(section, word.red())
    }
}

fn format_line(section: &Section, status: impl std::fmt::Display) -> String {
    format!(
        "[{}] {} :: {} {}/{}",
        section.course_name, section.crn, status, section.open_seats, section.total_seats
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, open: i32, total: i32) -> Section {
        Section {
            course_name: name.into(),
            crn: "12345".into(),
            total_seats: total,
            open_seats: open,
        }
    }

    #[test]
    fn test_only_positive_open_seats_notify() {
        let sections = vec![
            section("Full", 0, 30),
            section("One left", 1, 30),
            section("Overbooked", -2, 30),
            section("Wide open", 25, 30),
        ];
        let names: Vec<&str> = sections_to_notify(&sections)
            .into_iter()
            .map(|s| s.course_name.as_str())
            .collect();
        assert_eq!(names, vec!["One left", "Wide open"]);
    }

    #[test]
    fn test_status_line() {
        assert_eq!(
            status_line(&section("Intro to X", 3, 23)),
            "[Intro to X] 12345 :: Open 3/23"
        );
        assert_eq!(
            status_line(&section("Intro to X", 0, 23)),
            "[Intro to X] 12345 :: Closed 0/23"
        );
    }
}
