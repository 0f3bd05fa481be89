// 🔎 View Pipeline - filter, sort and derive display data
//
// Pure functions over a snapshot of the store. Nothing here mutates
// the collection; the table always shows sort(filter(list())).

use crate::record::{Record, Status};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

const MS_PER_DAY: i64 = 86_400_000;

/// Largest timestamp a date can hold (ms); blank expirations sort here
const FAR_FUTURE_MS: i64 = 8_640_000_000_000_000;

/// Days before expiration at which the badge turns to "warn"
pub const WARN_WINDOW_DAYS: i64 = 60;

/// Renewal window length before expiration
pub const RENEWAL_WINDOW_DAYS: i64 = 180;

// ============================================================================
// FILTER
// ============================================================================

/// Search text plus level/status restrictions. Empty sets = no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub query: String,
    pub levels: Vec<String>,
    pub statuses: Vec<String>,
}

impl FilterCriteria {
    pub fn query(query: &str) -> Self {
        FilterCriteria {
            query: query.to_string(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.levels.is_empty() && self.statuses.is_empty()
    }

    /// Add the value if absent, remove it if present
    pub fn toggle_level(&mut self, level: &str) {
        toggle(&mut self.levels, level);
    }

    pub fn toggle_status(&mut self, status: &str) {
        toggle(&mut self.statuses, status);
    }

    pub fn matches(&self, record: &Record) -> bool {
        let q = self.query.trim().to_lowercase();
        if !q.is_empty() {
            let haystack =
                format!("{} {} {}", record.name, record.codes, record.domain).to_lowercase();
            if !haystack.contains(&q) {
                return false;
            }
        }

        if !self.levels.is_empty() && !self.levels.iter().any(|l| *l == record.level) {
            return false;
        }

        if !self.statuses.is_empty() && !self.statuses.iter().any(|s| *s == record.status) {
            return false;
        }

        true
    }
}

fn toggle(values: &mut Vec<String>, value: &str) {
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
    } else {
        values.push(value.to_string());
    }
}

pub fn filter_records(records: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

// ============================================================================
// SORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Name, A-Z
    Name,
    /// Exam code, A-Z
    Code,
    /// Date passed, most recent first (blank = oldest)
    DatePassed,
    /// Expiration, soonest first (blank = never)
    Expiration,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Name,
        SortKey::Code,
        SortKey::DatePassed,
        SortKey::Expiration,
    ];

    pub fn parse(key: &str) -> Option<SortKey> {
        match key.trim() {
            "name" => Some(SortKey::Name),
            "code" | "codes" => Some(SortKey::Code),
            "datePassed" | "date-passed" | "date_passed" => Some(SortKey::DatePassed),
            "expiration" => Some(SortKey::Expiration),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Code => "code",
            SortKey::DatePassed => "datePassed",
            SortKey::Expiration => "expiration",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Code => "Code",
            SortKey::DatePassed => "Date passed",
            SortKey::Expiration => "Expiration",
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortKey::Name => compare_text(&a.name, &b.name),
            SortKey::Code => compare_text(&a.codes, &b.codes),
            SortKey::DatePassed => {
                timestamp_or(&b.date_passed, 0).cmp(&timestamp_or(&a.date_passed, 0))
            }
            SortKey::Expiration => timestamp_or(&a.expiration, FAR_FUTURE_MS)
                .cmp(&timestamp_or(&b.expiration, FAR_FUTURE_MS)),
        }
    }
}

// Case-insensitive first, raw text only to break ties
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn timestamp_or(date: &str, fallback: i64) -> i64 {
    parse_date(date)
        .map(|d| d.timestamp_millis())
        .unwrap_or(fallback)
}

/// Stable sort; `None` keeps the input order
pub fn sort_records(mut records: Vec<Record>, key: Option<SortKey>) -> Vec<Record> {
    if let Some(key) = key {
        records.sort_by(|a, b| key.compare(a, b));
    }
    records
}

/// Sort by a key name as the UI submits it.
///
/// An unrecognized key leaves the order untouched instead of reporting
/// the bad request; callers that can should use [`SortKey::parse`].
pub fn sort_by_key_name(records: Vec<Record>, key: &str) -> Vec<Record> {
    let parsed = SortKey::parse(key);
    if parsed.is_none() && !key.trim().is_empty() {
        debug!(key, "unrecognized sort key, keeping stored order");
    }
    sort_records(records, parsed)
}

/// filter then sort
pub fn apply_view(records: &[Record], criteria: &FilterCriteria, sort: Option<SortKey>) -> Vec<Record> {
    sort_records(filter_records(records, criteria), sort)
}

// ============================================================================
// DATES & BADGES
// ============================================================================

/// Parse a record date. Accepts `YYYY-MM-DD`, RFC 3339 and `MM/DD/YYYY`;
/// date-only values are midnight UTC.
pub fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Whole days from now until `date`, rounded up; negative when past
pub fn days_until(date: &str) -> Option<i64> {
    days_until_at(date, Utc::now())
}

pub fn days_until_at(date: &str, now: DateTime<Utc>) -> Option<i64> {
    let target = parse_date(date)?;
    let ms = (target - now).num_milliseconds();

    // integer division truncates toward zero, which is ceil for ms <= 0
    Some(if ms > 0 { (ms + MS_PER_DAY - 1) / MS_PER_DAY } else { ms / MS_PER_DAY })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeSeverity {
    Danger,
    Warn,
    Ok,
}

impl BadgeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeSeverity::Danger => "danger",
            BadgeSeverity::Warn => "warn",
            BadgeSeverity::Ok => "ok",
        }
    }

    pub fn for_days(days: i64) -> Self {
        if days < 0 {
            BadgeSeverity::Danger
        } else if days <= WARN_WINDOW_DAYS {
            BadgeSeverity::Warn
        } else {
            BadgeSeverity::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpirationBadge {
    pub label: String,
    pub severity: BadgeSeverity,
}

impl ExpirationBadge {
    pub fn for_days(days: i64) -> Self {
        let label = if days >= 0 {
            format!("{} days", days)
        } else {
            format!("{} days ago", days.abs())
        };

        ExpirationBadge {
            label,
            severity: BadgeSeverity::for_days(days),
        }
    }
}

/// Badge for the record's expiration; `None` when unset or unparsable
pub fn expiration_badge(record: &Record) -> Option<ExpirationBadge> {
    expiration_badge_at(record, Utc::now())
}

pub fn expiration_badge_at(record: &Record, now: DateTime<Utc>) -> Option<ExpirationBadge> {
    days_until_at(&record.expiration, now).map(ExpirationBadge::for_days)
}

// ============================================================================
// RENEWAL WINDOW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenewalState {
    /// No expiration date (fundamentals-style certifications)
    Lifetime,
    Active,
    /// Inside the renewal window before expiration
    RenewalOpen,
    Expired,
}

impl RenewalState {
    pub fn label(&self) -> &'static str {
        match self {
            RenewalState::Lifetime => "Lifetime",
            RenewalState::Active => "Active",
            RenewalState::RenewalOpen => "Renewal open",
            RenewalState::Expired => "Expired",
        }
    }
}

/// First day of the renewal window
pub fn renewal_window_opens(record: &Record) -> Option<NaiveDate> {
    let expires = parse_date(&record.expiration)?.date_naive();
    expires.checked_sub_signed(Duration::days(RENEWAL_WINDOW_DAYS))
}

pub fn renewal_state_at(record: &Record, today: NaiveDate) -> RenewalState {
    let expires = match parse_date(&record.expiration) {
        Some(dt) => dt.date_naive(),
        None => return RenewalState::Lifetime,
    };

    if today >= expires {
        RenewalState::Expired
    } else if renewal_window_opens(record).map_or(false, |opens| today >= opens) {
        RenewalState::RenewalOpen
    } else {
        RenewalState::Active
    }
}

pub fn renewal_state(record: &Record) -> RenewalState {
    renewal_state_at(record, Utc::now().date_naive())
}

/// One-line renewal text: state plus the window date when it matters
pub fn renewal_note_at(record: &Record, today: NaiveDate) -> String {
    let state = renewal_state_at(record, today);
    match (state, renewal_window_opens(record)) {
        (RenewalState::Active, Some(opens)) => format!("{}, window opens {}", state.label(), opens),
        (RenewalState::RenewalOpen, Some(opens)) => format!("{} since {}", state.label(), opens),
        _ => state.label().to_string(),
    }
}

pub fn renewal_note(record: &Record) -> String {
    renewal_note_at(record, Utc::now().date_naive())
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub planned: usize,
    pub scheduled: usize,
    pub active: usize,
    pub expired: usize,
    pub retired: usize,
}

impl StatusSummary {
    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Planned => self.planned,
            Status::Scheduled => self.scheduled,
            Status::PassedActive => self.active,
            Status::PassedExpired => self.expired,
            Status::Retired => self.retired,
        }
    }
}

/// Total plus per-status counts; unknown statuses only count toward total
pub fn summarize(records: &[Record]) -> StatusSummary {
    let mut summary = StatusSummary {
        total: records.len(),
        ..StatusSummary::default()
    };

    for record in records {
        match record.known_status() {
            Some(Status::Planned) => summary.planned += 1,
            Some(Status::Scheduled) => summary.scheduled += 1,
            Some(Status::PassedActive) => summary.active += 1,
            Some(Status::PassedExpired) => summary.expired += 1,
            Some(Status::Retired) => summary.retired += 1,
            None => {}
        }
    }

    summary
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{seed_records, RecordFields};

    fn create_test_record(name: &str, codes: &str) -> Record {
        Record::from_fields(
            format!("id-{}", codes),
            RecordFields {
                codes: codes.to_string(),
                ..RecordFields::named(name)
            },
        )
    }

    fn at(date: &str) -> DateTime<Utc> {
        parse_date(date).unwrap()
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_filter_query_on_seed() {
        let seeds = seed_records();
        let result = filter_records(&seeds, &FilterCriteria::query("SC-2"));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].codes, "SC-200");
    }

    #[test]
    fn test_filter_query_case_insensitive_and_domain() {
        let seeds = seed_records();

        let by_domain = filter_records(&seeds, &FilterCriteria::query("  purview "));
        assert_eq!(names(&by_domain), vec!["Information Protection Administrator Associate"]);

        let by_name = filter_records(&seeds, &FilterCriteria::query("IDENTITY"));
        assert_eq!(by_name.len(), 1);
    }

    #[test]
    fn test_filter_sets_compose_with_and() {
        let mut planned = create_test_record("Planned Expert", "AZ-305");
        planned.level = "Expert".to_string();
        let mut passed = create_test_record("Passed Expert", "AZ-400");
        passed.level = "Expert".to_string();
        passed.status = "Passed (Active)".to_string();
        let associate = create_test_record("Planned Associate", "AZ-104");
        let records = vec![planned, passed, associate];

        let mut criteria = FilterCriteria::default();
        criteria.toggle_level("Expert");
        assert_eq!(filter_records(&records, &criteria).len(), 2);

        criteria.toggle_status("Planned");
        assert_eq!(names(&filter_records(&records, &criteria)), vec!["Planned Expert"]);

        criteria.toggle_level("Expert");
        assert_eq!(filter_records(&records, &criteria).len(), 2);
    }

    #[test]
    fn test_empty_criteria_keeps_everything() {
        let seeds = seed_records();
        assert!(FilterCriteria::default().is_empty());
        assert_eq!(filter_records(&seeds, &FilterCriteria::default()), seeds);
    }

    #[test]
    fn test_sort_by_name_case_insensitive() {
        let records = vec![
            create_test_record("beta", "B"),
            create_test_record("Alpha", "A"),
            create_test_record("gamma", "G"),
        ];
        let sorted = sort_records(records, Some(SortKey::Name));
        assert_eq!(names(&sorted), vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_sort_by_date_passed_blank_is_oldest() {
        let mut old = create_test_record("Old", "O");
        old.date_passed = "2023-01-10".to_string();
        let blank = create_test_record("Blank", "B");
        let mut recent = create_test_record("Recent", "R");
        recent.date_passed = "2025-05-01".to_string();

        let sorted = sort_records(vec![old, blank, recent], Some(SortKey::DatePassed));
        assert_eq!(names(&sorted), vec!["Recent", "Old", "Blank"]);
    }

    #[test]
    fn test_sort_by_expiration_blank_is_last() {
        let blank = create_test_record("Never", "N");
        let mut late = create_test_record("Late", "L");
        late.expiration = "2028-01-01".to_string();
        let mut soon = create_test_record("Soon", "S");
        soon.expiration = "2026-11-01".to_string();

        let sorted = sort_records(vec![blank, late, soon], Some(SortKey::Expiration));
        assert_eq!(names(&sorted), vec!["Soon", "Late", "Never"]);
    }

    #[test]
    fn test_unrecognized_sort_key_is_identity() {
        let records = vec![
            create_test_record("b", "2"),
            create_test_record("a", "1"),
            create_test_record("c", "3"),
        ];
        let sorted = sort_by_key_name(records.clone(), "popularity");
        assert_eq!(sorted, records);
        assert_eq!(SortKey::parse("popularity"), None);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut first = create_test_record("Same", "1");
        first.id = "first".to_string();
        let mut second = create_test_record("Same", "2");
        second.id = "second".to_string();

        let sorted = sort_records(vec![first, second], Some(SortKey::Name));
        assert_eq!(sorted[0].id, "first");
    }

    #[test]
    fn test_sort_key_names() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SortKey::parse("date-passed"), Some(SortKey::DatePassed));
    }

    #[test]
    fn test_apply_view_filters_then_sorts() {
        let records = vec![
            create_test_record("SC Zeta", "SC-900"),
            create_test_record("AZ Admin", "AZ-104"),
            create_test_record("SC Alpha", "SC-100"),
        ];
        let view = apply_view(&records, &FilterCriteria::query("sc-"), Some(SortKey::Code));
        assert_eq!(names(&view), vec!["SC Alpha", "SC Zeta"]);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(at("2026-10-16"), at("10/16/2026"));
        assert_eq!(at("2026-10-16T00:00:00Z"), at("2026-10-16"));
        assert!(parse_date("").is_none());
        assert!(parse_date("not-a-date").is_none());
    }

    #[test]
    fn test_days_until_none_for_blank_or_garbage() {
        assert_eq!(days_until(""), None);
        assert_eq!(days_until("not-a-date"), None);
    }

    #[test]
    fn test_days_until_today_is_zero() {
        let now = at("2026-10-16T15:30:00Z");
        assert_eq!(days_until_at("2026-10-16", now), Some(0));

        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(days_until(&today), Some(0));
    }

    #[test]
    fn test_days_until_rounds_up() {
        let now = at("2026-10-16T15:30:00Z");
        assert_eq!(days_until_at("2026-10-17", now), Some(1));
        assert_eq!(days_until_at("2026-12-15", now), Some(60));
        assert_eq!(days_until_at("2026-10-15", now), Some(-1));
        assert_eq!(days_until_at("2026-10-14", now), Some(-2));
    }

    #[test]
    fn test_badge_severity_boundaries() {
        assert_eq!(ExpirationBadge::for_days(60).severity, BadgeSeverity::Warn);
        assert_eq!(ExpirationBadge::for_days(61).severity, BadgeSeverity::Ok);
        assert_eq!(ExpirationBadge::for_days(0).severity, BadgeSeverity::Warn);
        assert_eq!(ExpirationBadge::for_days(-1).severity, BadgeSeverity::Danger);
    }

    #[test]
    fn test_badge_labels() {
        assert_eq!(ExpirationBadge::for_days(5).label, "5 days");
        assert_eq!(ExpirationBadge::for_days(0).label, "0 days");
        assert_eq!(ExpirationBadge::for_days(-3).label, "3 days ago");
    }

    #[test]
    fn test_expiration_badge_at() {
        let now = at("2026-10-16T08:00:00Z");
        let mut record = create_test_record("Expiring", "E");

        assert_eq!(expiration_badge_at(&record, now), None);

        record.expiration = "2026-12-15".to_string();
        let badge = expiration_badge_at(&record, now).unwrap();
        assert_eq!(badge.label, "60 days");
        assert_eq!(badge.severity, BadgeSeverity::Warn);

        record.expiration = "2026-12-16".to_string();
        assert_eq!(expiration_badge_at(&record, now).unwrap().severity, BadgeSeverity::Ok);
    }

    #[test]
    fn test_renewal_state() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut record = create_test_record("Renewable", "R");

        assert_eq!(renewal_state_at(&record, today), RenewalState::Lifetime);

        record.expiration = "2027-12-31".to_string();
        assert_eq!(renewal_state_at(&record, today), RenewalState::Active);

        record.expiration = "2027-03-01".to_string();
        assert_eq!(renewal_state_at(&record, today), RenewalState::RenewalOpen);
        assert_eq!(
            renewal_window_opens(&record),
            NaiveDate::from_ymd_opt(2026, 9, 2)
        );

        record.expiration = "2026-10-16".to_string();
        assert_eq!(renewal_state_at(&record, today), RenewalState::Expired);
    }

    #[test]
    fn test_renewal_note() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut record = create_test_record("Renewable", "R");
        assert_eq!(renewal_note_at(&record, today), "Lifetime");

        record.expiration = "2027-12-31".to_string();
        assert_eq!(renewal_note_at(&record, today), "Active, window opens 2027-07-04");

        record.expiration = "2027-03-01".to_string();
        assert_eq!(renewal_note_at(&record, today), "Renewal open since 2026-09-02");

        record.expiration = "2026-01-01".to_string();
        assert_eq!(renewal_note_at(&record, today), "Expired");
    }

    #[test]
    fn test_summarize_seed() {
        let summary = summarize(&seed_records());
        assert_eq!(
            summary,
            StatusSummary {
                total: 5,
                active: 5,
                ..StatusSummary::default()
            }
        );
    }

    #[test]
    fn test_summarize_unknown_status_only_in_total() {
        let mut odd = create_test_record("Odd", "O");
        odd.status = "Archived".to_string();
        let mut retired = create_test_record("Old", "R");
        retired.status = "Retired".to_string();

        let summary = summarize(&[odd, retired, create_test_record("New", "N")]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.retired, 1);
        assert_eq!(summary.planned, 1);
        assert_eq!(summary.count(Status::PassedActive), 0);
    }
}
