//! Public-API checks for the report assembler: the documented formatting
//! contract, exercised the way a consuming application would.

use chrono::NaiveDate;
use eventdesk::report::format::{format_time_12h, reference_code, reformat_department};
use eventdesk::report::{EventRecord, assemble, fallback_overview, render_html};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn time_formatting_contract() {
    assert_eq!(format_time_12h(Some("00:30")), "12:30 AM");
    assert_eq!(format_time_12h(Some("13:05")), "01:05 PM");
    assert_eq!(format_time_12h(None), "N/A");
    assert_eq!(format_time_12h(Some("not-a-time")), "not-a-time");
}

#[test]
fn department_reformat_contract() {
    assert_eq!(reformat_department("(CSE) (B.Tech)"), "(B.Tech)-(CSE)");
}

#[test]
fn reference_code_embeds_academic_year() {
    let code = reference_code(Some("Physics (M.Sc)"), Some("EV-100"), date(2026, 1, 10));
    assert_eq!(code, "2025-2026/(M.Sc)-Physics/EV-100");
}

#[test]
fn overview_marks_missing_record_only_when_absent() {
    assert!(fallback_overview(None).contains("Event details are missing."));
    assert!(
        !fallback_overview(Some(&EventRecord::default()))
            .contains("Event details are missing.")
    );
}

#[test]
fn assembled_record_round_trips_through_json_record() {
    // Records arrive from the backing store as JSON; unknown shapes must not
    // break assembly.
    let raw = r#"{
        "title": "Orientation Day",
        "venue": {"name": "Main Auditorium", "capacity": 0},
        "expected_participants": 300,
        "approvals": {"hod_approved_at": "2025-07-10 09:00"}
    }"#;
    let record: EventRecord = serde_json::from_str(raw).unwrap();
    let report = assemble(&record, date(2025, 8, 25));

    assert_eq!(report.title, "Orientation Day");
    assert_eq!(report.venue, "Main Auditorium");
    // Capacity of zero is treated as unknown.
    assert_eq!(report.venue_capacity, "N/A");
    assert_eq!(report.expected_participants, "300");
    assert_eq!(report.hod_approved_at, "2025-07-10 09:00");
    assert_eq!(report.dean_approved_at, "N/A");

    let html = render_html(&report).unwrap();
    assert!(html.contains("Orientation Day"));
    assert!(html.contains("Main Auditorium"));
}
