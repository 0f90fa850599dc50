// Waste-collection calendar clients.
//
// Two independent providers feed one merged calendar:
//
// - an OpenERZ-style GET endpoint returning several categories with ISO
//   dates, and
// - a pickup-service POST endpoint returning a single category with
//   German-formatted dates ("5. Januar 2025") that need locale-aware
//   conversion.
//
// Category keys are fixed: consumers rely on every key being present in
// each snapshot, empty or not.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, ensure_success, parse_json};

/// German month names to month numbers, as the pickup provider prints them.
const GERMAN_MONTHS: [(&str, u32); 12] = [
    ("Januar", 1),
    ("Februar", 2),
    ("März", 3),
    ("April", 4),
    ("Mai", 5),
    ("Juni", 6),
    ("Juli", 7),
    ("August", 8),
    ("September", 9),
    ("Oktober", 10),
    ("November", 11),
    ("Dezember", 12),
];

/// Convert a provider date like `"5. Januar 2025"` to a [`NaiveDate`].
pub fn convert_german_date(raw: &str) -> Result<NaiveDate, Error> {
    let mut parts = raw.split_whitespace();
    let (Some(day), Some(month), Some(year)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::InvalidDate(raw.to_owned()));
    };

    let day: u32 = day
        .trim_end_matches('.')
        .parse()
        .map_err(|_| Error::InvalidDate(raw.to_owned()))?;
    let month = GERMAN_MONTHS
        .iter()
        .find(|(name, _)| *name == month)
        .map(|(_, n)| *n)
        .ok_or_else(|| Error::InvalidDate(raw.to_owned()))?;
    let year: i32 = year.parse().map_err(|_| Error::InvalidDate(raw.to_owned()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| Error::InvalidDate(raw.to_owned()))
}

/// Merged waste-pickup calendar.
///
/// All category keys are always present; a category the upstream omitted
/// in a cycle is an empty list, never a missing key. Dates serialize as
/// ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WasteCalendar {
    pub cardboard: Vec<NaiveDate>,
    pub paper: Vec<NaiveDate>,
    pub mrgreen: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ErzResponse {
    #[serde(default)]
    result: Vec<ErzEntry>,
}

#[derive(Debug, Deserialize)]
struct ErzEntry {
    date: NaiveDate,
    waste_type: String,
}

#[derive(Debug, Deserialize)]
struct PickupResponse {
    #[serde(default)]
    dates_data: Vec<PickupDates>,
}

#[derive(Debug, Deserialize)]
struct PickupDates {
    #[serde(default)]
    date: Vec<String>,
}

/// Client merging both calendar providers into one [`WasteCalendar`].
pub struct WasteClient {
    http: reqwest::Client,
    erz_url: Url,
    pickup_url: Url,
    zip: String,
    /// Subscription type sent to the pickup provider.
    pickup_type: String,
    /// `limit` query parameter for the ERZ request.
    fetch_limit: u32,
    /// Per-category cap applied to the merged snapshot.
    entry_limit: usize,
}

impl WasteClient {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        http: reqwest::Client,
        erz_url: Url,
        pickup_url: Url,
        zip: String,
        pickup_type: String,
        fetch_limit: u32,
        entry_limit: usize,
    ) -> Self {
        Self {
            http,
            erz_url,
            pickup_url,
            zip,
            pickup_type,
            fetch_limit,
            entry_limit,
        }
    }

    /// Fetch from both providers and merge into one calendar.
    ///
    /// A failure in either upstream fails the whole cycle — the caller
    /// keeps its previous snapshot rather than mixing fresh and stale
    /// categories.
    pub async fn fetch(&self) -> Result<WasteCalendar, Error> {
        let mut calendar = WasteCalendar::default();
        self.fetch_erz(&mut calendar).await?;
        calendar.mrgreen = self.fetch_pickup_dates().await?;
        Ok(calendar)
    }

    async fn fetch_erz(&self, calendar: &mut WasteCalendar) -> Result<(), Error> {
        let start = Local::now().date_naive();
        let mut url = self.erz_url.clone();
        url.query_pairs_mut()
            .append_pair("zip", &self.zip)
            .append_pair("types", "cardboard")
            .append_pair("types", "paper")
            .append_pair("start", &start.to_string())
            .append_pair("sort", "date")
            .append_pair("offset", "0")
            .append_pair("limit", &self.fetch_limit.to_string());
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        let data: ErzResponse = parse_json(resp).await?;

        for entry in data.result {
            let bucket = match entry.waste_type.as_str() {
                "cardboard" => &mut calendar.cardboard,
                "paper" => &mut calendar.paper,
                // Categories we don't track are dropped, not an error.
                _ => continue,
            };
            if bucket.len() < self.entry_limit {
                bucket.push(entry.date);
            }
        }
        Ok(())
    }

    async fn fetch_pickup_dates(&self) -> Result<Vec<NaiveDate>, Error> {
        debug!("POST {}", self.pickup_url);
        let resp = self
            .http
            .post(self.pickup_url.clone())
            .json(&serde_json::json!({ "zip": self.zip, "type": self.pickup_type }))
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let data: PickupResponse = parse_json(resp).await?;

        let entry = data
            .dates_data
            .first()
            .ok_or(Error::UnexpectedPayload("pickup response has no dates_data"))?;

        entry
            .date
            .iter()
            .take(self.entry_limit)
            .map(|raw| convert_german_date(raw))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn converts_single_digit_day_with_zero_padding() {
        let date = convert_german_date("5. Januar 2025").unwrap();
        assert_eq!(date.to_string(), "2025-01-05");
    }

    #[test]
    fn converts_two_digit_day() {
        let date = convert_german_date("23. Dezember 2024").unwrap();
        assert_eq!(date.to_string(), "2024-12-23");
    }

    #[test]
    fn converts_umlaut_month() {
        let date = convert_german_date("1. März 2025").unwrap();
        assert_eq!(date.to_string(), "2025-03-01");
    }

    #[test]
    fn rejects_unknown_month() {
        assert!(matches!(
            convert_german_date("5. Brumaire 2025"),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(matches!(
            convert_german_date("5. Januar"),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_day() {
        assert!(matches!(
            convert_german_date("32. Januar 2025"),
            Err(Error::InvalidDate(_))
        ));
    }
}
