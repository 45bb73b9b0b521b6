//! Report assembler: a stateless, idempotent transform from a stored event
//! record to a fixed-layout printable document.
//!
//! Assembly never fails on data — every missing or malformed field degrades
//! to a visible "N/A" or an inline "Invalid URL" marker. The only fallible
//! step is the template render, and only on a programming error in the
//! built-in template.

pub mod format;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use format::{
    NOT_AVAILABLE, count_or_na, format_slug_list, format_time_12h, or_na, platform_from_url,
    reference_code,
};

// ─── Input record ────────────────────────────────────────────────────────────

/// Backend-stored representation of one academic event submission.
///
/// Every attribute is optional: records arrive from an external store at
/// various stages of the approval workflow, and the assembler must render
/// whatever is present. The assembler treats this as read-only input.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EventRecord {
    pub title: Option<String>,
    pub objective: Option<String>,
    pub description: Option<String>,
    /// Organizing department, stored as "Name (Degree)".
    pub department: Option<String>,
    /// Department-unique event code, the last segment of the reference code.
    pub unique_code: Option<String>,
    pub venue: Option<Venue>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// 24-hour "HH:MM".
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub expected_participants: Option<u32>,
    pub actual_participants: Option<u32>,
    pub coordinators: Vec<String>,
    /// snake_case tags ("guest_lecture", "hands_on_session", ...).
    pub event_types: Vec<String>,
    pub remarks: Option<String>,
    pub proposed_outcomes: Option<String>,
    /// Overview paragraph previously produced by the generation proxy and
    /// stored alongside the record.
    pub generated_overview: Option<String>,
    pub photo_urls: Vec<String>,
    pub social_links: Vec<SocialLink>,
    pub approvals: Approvals,
}

/// Joined venue sub-record.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Venue {
    pub name: Option<String>,
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SocialLink {
    pub url: Option<String>,
}

/// Approval timestamps for the three-stage workflow.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Approvals {
    pub hod_approved_at: Option<String>,
    pub dean_approved_at: Option<String>,
    pub principal_approved_at: Option<String>,
}

// ─── Assembled document ──────────────────────────────────────────────────────

/// Fully-defaulted flat view of the printable report. Every field is a
/// display-ready string; lists are already formatted.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub reference_code: String,
    pub title: String,
    pub department: String,
    pub venue: String,
    pub venue_capacity: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub expected_participants: String,
    pub actual_participants: String,
    pub coordinators: String,
    pub event_types: String,
    pub overview: String,
    pub outcomes: String,
    pub remarks: String,
    pub photo_urls: Vec<String>,
    pub social_links: Vec<SocialLinkView>,
    pub hod_approved_at: String,
    pub dean_approved_at: String,
    pub principal_approved_at: String,
    pub generated_on: String,
}

/// One rendered social-media entry: derived platform name plus the stored
/// URL (or an inline marker when the URL does not parse).
#[derive(Debug, Clone, Serialize)]
pub struct SocialLinkView {
    pub platform: String,
    pub url: String,
}

/// Map a record to its display form. Pure and idempotent for a fixed
/// `today`; only the academic-year component of the reference code depends
/// on the supplied date.
pub fn assemble(record: &EventRecord, today: NaiveDate) -> Report {
    let overview = record
        .generated_overview
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_overview(Some(record)));

    let social_links = record
        .social_links
        .iter()
        .map(|link| {
            let url = link.url.as_deref().unwrap_or("").trim().to_string();
            SocialLinkView {
                platform: platform_from_url(&url),
                url,
            }
        })
        .collect();

    let coordinators: Vec<String> = record
        .coordinators
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    Report {
        reference_code: reference_code(
            record.department.as_deref(),
            record.unique_code.as_deref(),
            today,
        ),
        title: or_na(record.title.as_deref()),
        department: or_na(record.department.as_deref()),
        venue: or_na(record.venue.as_ref().and_then(|v| v.name.as_deref())),
        venue_capacity: count_or_na(record.venue.as_ref().and_then(|v| v.capacity)),
        start_date: or_na(record.start_date.as_deref()),
        end_date: or_na(record.end_date.as_deref()),
        start_time: format_time_12h(record.start_time.as_deref()),
        end_time: format_time_12h(record.end_time.as_deref()),
        expected_participants: count_or_na(record.expected_participants),
        actual_participants: count_or_na(record.actual_participants),
        coordinators: if coordinators.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            coordinators.join(", ")
        },
        event_types: format_slug_list(&record.event_types),
        overview,
        outcomes: or_na(record.proposed_outcomes.as_deref()),
        remarks: or_na(record.remarks.as_deref()),
        photo_urls: record
            .photo_urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect(),
        social_links,
        hod_approved_at: or_na(record.approvals.hod_approved_at.as_deref()),
        dean_approved_at: or_na(record.approvals.dean_approved_at.as_deref()),
        principal_approved_at: or_na(record.approvals.principal_approved_at.as_deref()),
        generated_on: today.format("%d %B %Y").to_string(),
    }
}

/// Convenience wrapper over [`assemble`] using the wall-clock date.
pub fn assemble_now(record: &EventRecord) -> Report {
    assemble(record, Utc::now().date_naive())
}

// ─── Fallback overview ───────────────────────────────────────────────────────

/// Deterministic three-sentence summary used when no generated overview was
/// stored with the record. Independent of the generation proxy.
pub fn fallback_overview(record: Option<&EventRecord>) -> String {
    let Some(record) = record else {
        return "Event details are missing. No summary could be prepared for this report. \
                Please refer to the submission records of the organising department."
            .to_string();
    };

    let title = nonblank(record.title.as_deref()).unwrap_or("the event");
    let objective = nonblank(record.objective.as_deref())
        .unwrap_or("achieving the stated academic goals of the department");
    let outcomes = nonblank(record.proposed_outcomes.as_deref())
        .unwrap_or("enhanced knowledge and practical skills among the participants");

    format!(
        "{title} was organised with the objective of {objective}. \
         The event was conducted as planned and proceeded in accordance with the \
         approved proposal. The expected outcomes were {outcomes}."
    )
}

fn nonblank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ─── Printable rendering ─────────────────────────────────────────────────────

const REPORT_TEMPLATE: &str = include_str!("report.html.tera");

/// Render the fixed-layout printable page. The host environment's native
/// print facility turns this into paper or a PDF; no PDF encoding happens
/// here.
pub fn render_html(report: &Report) -> anyhow::Result<String> {
    let mut tera = tera::Tera::default();
    // The ".html" template name would otherwise enable Tera's autoescaping,
    // which rewrites "/" as "&#x2F;" and corrupts "N/A" and reference codes.
    tera.autoescape_on(vec![]);
    tera.add_raw_template("report.html", REPORT_TEMPLATE)
        .context("registering report template")?;
    let context =
        tera::Context::from_serialize(report).context("building report template context")?;
    tera.render("report.html", &context)
        .context("rendering report template")
}
