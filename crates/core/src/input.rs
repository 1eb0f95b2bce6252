//! Lenient decoders for request payloads.
//!
//! Form clients send numbers as strings (`"1500"`) and leave optional inputs
//! as empty strings. These helpers are used with `#[serde(deserialize_with)]`
//! to coerce such input at the boundary, so domain types only ever see
//! `f64` / `NaiveDate` / `Option<_>`.
//!
//! The `patch_*` variants return `Option<Option<T>>`: `None` when the field is
//! absent, `Some(None)` when the client cleared it. They must be combined with
//! `#[serde(default)]`.

use core::fmt::Display;
use core::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::de::{DeserializeOwned, Error as _, value::StringDeserializer};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn coerce_number<E: serde::de::Error>(raw: NumberOrText) -> Result<Option<f64>, E> {
    match raw {
        NumberOrText::Number(n) => Ok(Some(n)),
        NumberOrText::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("`{s}` is not a number")))
        }
    }
}

fn finite<E: serde::de::Error>(n: Option<f64>) -> Result<Option<f64>, E> {
    match n {
        Some(v) if !v.is_finite() => Err(E::custom("number must be finite")),
        other => Ok(other),
    }
}

/// Required number; accepts `12.5` or `"12.5"`.
pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let raw = NumberOrText::deserialize(d)?;
    finite(coerce_number(raw)?)?.ok_or_else(|| D::Error::custom("a number is required"))
}

/// Optional number; `null`, `""` and absence all mean `None`.
pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Option::<NumberOrText>::deserialize(d)? {
        Some(raw) => finite(coerce_number(raw)?),
        None => Ok(None),
    }
}

pub fn patch_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<f64>>, D::Error> {
    opt_number(d).map(Some)
}

fn coerce_date<E: serde::de::Error>(s: &str) -> Result<Option<NaiveDate>, E> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Some(d));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| E::custom(format!("`{s}` is not a date (expected YYYY-MM-DD)")))
}

/// Required date; accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let s = String::deserialize(d)?;
    coerce_date(&s)?.ok_or_else(|| D::Error::custom("a date is required"))
}

pub fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(d)? {
        Some(s) => coerce_date(&s),
        None => Ok(None),
    }
}

pub fn patch_date<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Option<NaiveDate>>, D::Error> {
    opt_date(d).map(Some)
}

/// Optional free text; trimmed, blank means `None`.
pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

pub fn patch_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<String>>, D::Error> {
    opt_text(d).map(Some)
}

/// Optional reference id; blank strings (unselected form options) mean `None`.
pub fn opt_ref<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(d)? {
        Some(s) if !s.trim().is_empty() => s.trim().parse().map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// Reference id in a patch: absent = keep, `null` or blank = unassign.
pub fn patch_ref<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    opt_ref(d).map(Some)
}

/// Optional enum label (`"in"`, `"Shipped"`); blank means `None`.
///
/// Select inputs left on their "all" option submit an empty value.
pub fn opt_choice<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(d)? {
        Some(s) if !s.trim().is_empty() => {
            T::deserialize(StringDeserializer::<D::Error>::new(s.trim().to_string())).map(Some)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(deserialize_with = "number")]
        quantity: f64,
        #[serde(default, deserialize_with = "opt_number")]
        budget: Option<f64>,
        #[serde(default, deserialize_with = "opt_date")]
        start: Option<NaiveDate>,
        #[serde(default, deserialize_with = "patch_number")]
        rate: Option<Option<f64>>,
        #[serde(default, deserialize_with = "opt_text")]
        notes: Option<String>,
        #[serde(default, deserialize_with = "opt_ref")]
        owner: Option<uuid::Uuid>,
        #[serde(default, deserialize_with = "opt_choice")]
        shift: Option<Shift>,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Shift {
        Day,
        Night,
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let f: Form = serde_json::from_value(json!({ "quantity": "12.5", "budget": " 1000 " })).unwrap();
        assert_eq!(f.quantity, 12.5);
        assert_eq!(f.budget, Some(1000.0));
    }

    #[test]
    fn empty_strings_mean_absent() {
        let f: Form =
            serde_json::from_value(json!({ "quantity": 1, "budget": "", "start": "", "notes": "  " })).unwrap();
        assert_eq!(f.budget, None);
        assert_eq!(f.start, None);
        assert_eq!(f.notes, None);
    }

    #[test]
    fn non_numeric_text_is_rejected() {
        let err = serde_json::from_value::<Form>(json!({ "quantity": "ten" })).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let f: Form = serde_json::from_value(json!({ "quantity": 1, "start": "2024-03-01" })).unwrap();
        assert_eq!(f.start, NaiveDate::from_ymd_opt(2024, 3, 1));

        let f: Form =
            serde_json::from_value(json!({ "quantity": 1, "start": "2024-03-01T08:30:00Z" })).unwrap();
        assert_eq!(f.start, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn patch_fields_distinguish_absent_from_cleared() {
        let f: Form = serde_json::from_value(json!({ "quantity": 1 })).unwrap();
        assert_eq!(f.rate, None);

        let f: Form = serde_json::from_value(json!({ "quantity": 1, "rate": null })).unwrap();
        assert_eq!(f.rate, Some(None));

        let f: Form = serde_json::from_value(json!({ "quantity": 1, "rate": "45" })).unwrap();
        assert_eq!(f.rate, Some(Some(45.0)));
    }

    #[test]
    fn blank_reference_means_unassigned() {
        let f: Form = serde_json::from_value(json!({ "quantity": 1, "owner": "" })).unwrap();
        assert_eq!(f.owner, None);

        let id = uuid::Uuid::now_v7();
        let f: Form = serde_json::from_value(json!({ "quantity": 1, "owner": id.to_string() })).unwrap();
        assert_eq!(f.owner, Some(id));

        assert!(serde_json::from_value::<Form>(json!({ "quantity": 1, "owner": "nope" })).is_err());
    }

    #[test]
    fn blank_choice_means_any() {
        let f: Form = serde_json::from_value(json!({ "quantity": 1, "shift": "" })).unwrap();
        assert_eq!(f.shift, None);

        let f: Form = serde_json::from_value(json!({ "quantity": 1, "shift": " night " })).unwrap();
        assert_eq!(f.shift, Some(Shift::Night));

        assert!(serde_json::from_value::<Form>(json!({ "quantity": 1, "shift": "dusk" })).is_err());
    }
}
