//! Filling and submitting the schedule search form.
//!
//! The search page is a plain HTML form: a CRN text box (`P_REF`), a
//! semester drop-down (`P_SEMESTER`) and a `Search` submit button. Every other
//! control the form owns is round-tripped with its current value, the way a
//! browser would post it.

use crate::usf::errors::SearchError;
use crate::usf::models::TrackedCourse;
use crate::usf::session::{Document, SearchSession};
use crate::usf::terms::Term;
use html_scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, trace};
use url::Url;

static CRN_INPUT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("input#P_REF").unwrap());
static SEMESTER_SELECT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select#P_SEMESTER").unwrap());
static SEARCH_BUTTON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"button[type="submit"][value="Search"]"#).unwrap()
});
static CONTROLS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input, select, textarea").unwrap());
static OPTIONS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

impl FormMethod {
    /// HTML defaults to GET for anything that isn't `post`.
    fn from_attr(method: Option<&str>) -> Self {
        match method {
            Some(m) if m.trim().eq_ignore_ascii_case("post") => Self::Post,
            _ => Self::Get,
        }
    }
}

/// A filled-in form, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub action: Url,
    pub method: FormMethod,
    pub fields: Vec<(String, String)>,
}

/// The search form as found on the page, before the CRN and term are filled in.
#[derive(Debug, Clone)]
pub struct SearchForm {
    action: Url,
    method: FormMethod,
    fields: Vec<(String, String)>,
    crn_field: String,
    semester_field: String,
    semester_options: Vec<String>,
    submit: Option<(String, String)>,
}

impl SearchForm {
    /// Locate the search form on a parsed page.
    pub fn locate(html: &Html, page_url: &Url) -> Result<Self, SearchError> {
        let crn_input = html
            .select(&CRN_INPUT)
            .next()
            .ok_or(SearchError::MissingElement("CRN input (P_REF)"))?;
        let semester = html
            .select(&SEMESTER_SELECT)
            .next()
            .ok_or(SearchError::MissingElement("semester select (P_SEMESTER)"))?;
        let button = html
            .select(&SEARCH_BUTTON)
            .next()
            .ok_or(SearchError::MissingElement("Search button"))?;

        let form = crn_input
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "form")
            .ok_or(SearchError::MissingElement("form around P_REF"))?;

        let action = match form.attr("action").map(str::trim) {
            Some(action) if !action.is_empty() => page_url.join(action)?,
            _ => page_url.clone(),
        };
        let method = FormMethod::from_attr(form.attr("method"));

        let semester_options = semester
            .select(&OPTIONS)
            .map(option_value)
            .collect();

        let submit = button
            .attr("name")
            .filter(|name| !name.is_empty())
            .map(|name| (name.to_string(), "Search".to_string()));

        Ok(Self {
            action,
            method,
            fields: extract_fields(form),
            crn_field: control_name(crn_input),
            semester_field: control_name(semester),
            semester_options,
            submit,
        })
    }

    /// Type the CRN, pick the term, and press Search.
    pub fn fill(self, crn: u32, term: Term) -> Result<FormSubmission, SearchError> {
        let term_value = term.id().to_string();
        if !self.semester_options.iter().any(|v| *v == term_value) {
            return Err(SearchError::TermNotListed { term: term.id() });
        }

        let mut fields = self.fields;
        set_field(&mut fields, &self.crn_field, crn.to_string());
        set_field(&mut fields, &self.semester_field, term_value);
        if let Some(pair) = self.submit {
            fields.push(pair);
        }

        Ok(FormSubmission {
            action: self.action,
            method: self.method,
            fields,
        })
    }
}

/// Outcome of submitting a search.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub document: Document,
    /// Whether the response is the HTML page we expect rather than some
    /// other kind of payload.
    pub is_expected_page: bool,
}

/// GET the search page, fill in the course, and submit.
pub async fn search(
    session: &SearchSession,
    search_url: &Url,
    course: &TrackedCourse,
    term: Term,
) -> Result<SearchResponse, SearchError> {
    let page = session.get(search_url).await?;

    let submission = {
        let html = page.html();
        SearchForm::locate(&html, &page.url)?.fill(course.crn, term)?
    };
    debug!(
        crn = course.crn,
        term = %term,
        action = %submission.action,
        method = ?submission.method,
        "submitting search form"
    );
    trace!(fields = ?submission.fields, "form fields");

    let document = session.submit(&submission).await?;
    Ok(SearchResponse {
        is_expected_page: document.is_html,
        document,
    })
}

/// Collect the controls a browser would submit for this form.
fn extract_fields(form: ElementRef<'_>) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    for control in form.select(&CONTROLS) {
        let name = match control.attr("name") {
            Some(n) if !n.is_empty() => n,
            _ => continue,
        };
        if control.attr("disabled").is_some() {
            continue;
        }

        match control.value().name() {
            "input" => {
                let input_type = control.attr("type").unwrap_or("text").to_ascii_lowercase();
                // Buttons only submit when clicked
                if matches!(
                    input_type.as_str(),
                    "submit" | "image" | "button" | "reset" | "file"
                ) {
                    continue;
                }
                if (input_type == "radio" || input_type == "checkbox")
                    && control.attr("checked").is_none()
                {
                    continue;
                }
                let default = if input_type == "radio" || input_type == "checkbox" {
                    "on"
                } else {
                    ""
                };
                let value = control.attr("value").unwrap_or(default);
                fields.push((name.to_string(), value.to_string()));
            }
            "select" => {
                let options: Vec<_> = control.select(&OPTIONS).collect();
                let selected: Vec<_> = options
                    .iter()
                    .filter(|opt| opt.attr("selected").is_some())
                    .collect();
                if selected.is_empty() {
                    if control.attr("multiple").is_none()
                        && let Some(first) = options.first()
                    {
                        fields.push((name.to_string(), option_value(*first)));
                    }
                } else {
                    for opt in selected {
                        fields.push((name.to_string(), option_value(*opt)));
                    }
                }
            }
            "textarea" => {
                fields.push((name.to_string(), control.text().collect()));
            }
            _ => {}
        }
    }

    fields
}

/// An option's `value` attribute, or its text when the attribute is absent.
fn option_value(option: ElementRef<'_>) -> String {
    match option.attr("value") {
        Some(value) => value.to_string(),
        None => option
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// The name a control submits under; falls back to its id.
fn control_name(control: ElementRef<'_>) -> String {
    control
        .attr("name")
        .filter(|n| !n.is_empty())
        .or_else(|| control.attr("id"))
        .unwrap_or_default()
        .to_string()
}

/// Replace every value for `name`, or append it if the form didn't carry it.
fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: String) {
    fields.retain(|(n, _)| n != name);
    fields.push((name.to_string(), value));
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://usfweb.usf.edu/DSS/StaffScheduleSearch/";

    fn search_page(form_attrs: &str, extra: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><body>
            <form {form_attrs}>
              <input type="hidden" name="P_SESSION" value="abc123">
              <input type="text" id="P_REF" name="P_REF" value="">
              <input type="text" name="P_SUBJ">
              <select id="P_SEMESTER" name="P_SEMESTER">
                <option value="202101">Spring 2021</option>
                <option value="202105" selected>Summer 2021</option>
                <option value="202108">Fall 2021</option>
              </select>
              <input type="checkbox" name="P_OPEN_ONLY" value="Y">
              <input type="checkbox" name="P_ONLINE" checked>
              <input type="submit" name="P_RESET" value="Reset">
              {extra}
              <button type="submit" name="P_ACTION" value="Search">Search</button>
            </form>
            </body></html>"#
        ))
    }

    fn fall_2021() -> Term {
        Term::from_id(202108).unwrap()
    }

    #[test]
    fn test_fill_round_trips_form_state() {
        let html = search_page(r#"action="results" method="post""#, "");
        let url = Url::parse(PAGE_URL).unwrap();
        let submission = SearchForm::locate(&html, &url)
            .unwrap()
            .fill(12345, fall_2021())
            .unwrap();

        assert_eq!(submission.method, FormMethod::Post);
        assert_eq!(
            submission.action.as_str(),
            "https://usfweb.usf.edu/DSS/StaffScheduleSearch/results"
        );
        let fields: Vec<(&str, &str)> = submission
            .fields
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("P_SESSION", "abc123"),
                ("P_SUBJ", ""),
                ("P_ONLINE", "on"),
                ("P_REF", "12345"),
                ("P_SEMESTER", "202108"),
                ("P_ACTION", "Search"),
            ]
        );
    }

    #[test]
    fn test_missing_action_posts_back_to_page() {
        let html = search_page("", "");
        let url = Url::parse(PAGE_URL).unwrap();
        let submission = SearchForm::locate(&html, &url)
            .unwrap()
            .fill(1, fall_2021())
            .unwrap();
        assert_eq!(submission.method, FormMethod::Get);
        assert_eq!(submission.action, url);
    }

    #[test]
    fn test_term_not_in_dropdown() {
        let html = search_page(r#"method="post""#, "");
        let url = Url::parse(PAGE_URL).unwrap();
        let err = SearchForm::locate(&html, &url)
            .unwrap()
            .fill(1, Term::from_id(202201).unwrap())
            .unwrap_err();
        assert!(matches!(err, SearchError::TermNotListed { term: 202201 }));
        assert!(err.is_page_structure());
    }

    #[test]
    fn test_missing_controls_are_page_structure_errors() {
        let url = Url::parse(PAGE_URL).unwrap();
        let cases = [
            r#"<form><select id="P_SEMESTER"></select><button type="submit" value="Search"></button></form>"#,
            r#"<form><input id="P_REF"><button type="submit" value="Search"></button></form>"#,
            r#"<form><input id="P_REF"><select id="P_SEMESTER"></select><button type="button" value="Search"></button></form>"#,
            r#"<input id="P_REF"><select id="P_SEMESTER"></select><button type="submit" value="Search"></button>"#,
        ];
        for body in cases {
            let html = Html::parse_document(body);
            let err = SearchForm::locate(&html, &url).unwrap_err();
            assert!(err.is_page_structure(), "{body}: {err}");
        }
    }

    #[test]
    fn test_disabled_and_unnamed_controls_are_skipped() {
        let html = search_page(
            r#"method="post""#,
            r#"<input type="text" name="P_LOCKED" value="x" disabled><input type="text" value="anon"><textarea name="P_NOTE">hi</textarea>"#,
        );
        let url = Url::parse(PAGE_URL).unwrap();
        let submission = SearchForm::locate(&html, &url)
            .unwrap()
            .fill(1, fall_2021())
            .unwrap();
        let names: Vec<&str> = submission.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert!(!names.contains(&"P_LOCKED"));
        assert!(names.contains(&"P_NOTE"));
        assert_eq!(names.iter().filter(|n| **n == "P_SEMESTER").count(), 1);
    }
}
