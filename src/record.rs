//! Deal records as the service stores them.
//!
//! The uncompressed path carries the minimal shape
//! `{origin, departure_date, destination, return_date, direct, price}`;
//! the compressed path adds `trips`, `destination_country` and
//! `dateCreated`. One struct covers both: every field defaults, and the
//! extended fields are skipped on output when absent so a minimal record
//! serializes back to exactly the minimal shape.
//!
//! Field conversion is lenient: any JSON object becomes a record. A null
//! or mistyped field falls back to its default, a float price is rounded
//! and a scalar in a string field is kept as its JSON text.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// One travel offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub origin: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub departure_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub destination: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub return_date: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub direct: bool,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub price: i64,

    /// Flight legs, in travel order.
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub trips: Option<Vec<Trip>>,

    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub destination_country: Option<String>,

    /// When the service stored the deal.
    #[serde(
        rename = "dateCreated",
        default,
        deserialize_with = "lenient::date_created",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_created: Option<DateCreated>,
}

/// One leg of a deal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default, deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub to: String,
    #[serde(rename = "startDate", default, deserialize_with = "lenient::string")]
    pub start_date: String,
    /// The next leg continues the same journey (a stopover, not a return).
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub continued: bool,
}

/// Creation timestamp: epoch milliseconds or a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateCreated {
    Millis(i64),
    Text(String),
}

impl DateCreated {
    /// UTC timestamp, if the value is understood.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            DateCreated::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            DateCreated::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                        .ok()
                        .map(|naive| naive.and_utc())
                }),
        }
    }

    /// `YYYY-MM-DDTHH:MM:SS` in UTC; unparseable text is cut to 19 chars.
    pub fn render(&self) -> String {
        match (self.to_utc(), self) {
            (Some(dt), _) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            (None, DateCreated::Text(text)) => text.chars().take(19).collect(),
            (None, DateCreated::Millis(ms)) => ms.to_string(),
        }
    }
}

/// Field deserializers that never reject a value.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::{Number, Value};

    use super::DateCreated;

    fn number_to_i64(n: &Number) -> i64 {
        n.as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or_default()
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => s == "true",
            _ => false,
        })
    }

    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => number_to_i64(&n),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| s.trim().parse::<f64>().ok().map(|f| f.round() as i64))
                .unwrap_or_default(),
            _ => 0,
        })
    }

    pub fn or_none<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).ok())
    }

    pub fn date_created<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateCreated>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => Some(DateCreated::Millis(number_to_i64(&n))),
            Value::String(s) => Some(DateCreated::Text(s)),
            _ => None,
        })
    }
}

impl DealRecord {
    /// Build a record from a decoded JSON object.
    pub fn from_object(object: Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Route segments joined the way the decode tool prints them:
    /// `FROMTO(date)` per leg, `-` between continued legs and `===`
    /// between outbound and return.
    pub fn segments_joined(&self) -> String {
        let trips = self.trips.as_deref().unwrap_or_default();
        let mut out = String::new();
        for (i, trip) in trips.iter().enumerate() {
            out.push_str(&trip.from);
            out.push_str(&trip.to);
            out.push('(');
            out.push_str(&trip.start_date);
            out.push(')');
            if i + 1 < trips.len() {
                out.push_str(if trip.continued { "-" } else { "===" });
            }
        }
        out
    }

    /// One human-readable line:
    /// `origin-destination:country price segments created`.
    pub fn render_line(&self) -> String {
        let created = self
            .date_created
            .as_ref()
            .map(DateCreated::render)
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{}-{}:{} {} {} {}",
            self.origin,
            self.destination,
            self.destination_country.as_deref().unwrap_or(""),
            self.price,
            self.segments_joined(),
            created
        )
    }
}
