//! Wire-level helpers shared by the payload models, and the HTTP plumbing on
//! either side of the core (the webhook ingress and the queue client).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

#[macro_use]
pub(crate) mod macros;
pub(crate) mod client;
pub(crate) mod server;

/// A field that distinguishes *absent* from *present but `null`*.
///
/// `Option` collapses both cases into `None`. Webhook payloads are
/// partially populated, and whether Meta sent `"field": null` or left the
/// key out is worth keeping (it shows up in logs and can be branched on).
///
/// Use together with `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`:
/// a missing key deserializes to [`Nullable::Absent`] and is skipped again on
/// serialization, `null` round-trips as `null`.
///
/// # Example
/// ```rust
/// use serde::Deserialize;
/// use whatsapp_webhook_events::Nullable;
///
/// #[derive(Deserialize)]
/// struct Score {
///     #[serde(default)]
///     previous: Nullable<String>,
///     #[serde(default)]
///     new: Nullable<String>,
/// }
///
/// let score: Score = serde_json::from_str(r#"{"previous": null}"#).unwrap();
/// assert!(score.previous.is_null());
/// assert!(score.new.is_absent());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Nullable<T> {
    /// The key was not sent.
    #[default]
    Absent,
    /// The key was sent with a `null` value.
    Null,
    /// The key was sent with a value.
    Present(T),
}

impl<T> Nullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Nullable::Present(_))
    }

    /// Borrow the value, if one was sent.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Nullable::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Nullable::Null, Nullable::Present)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Nullable::from)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Present(value) => serializer.serialize_some(value),
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
        }
    }
}

/// Renders `absent` / `null` placeholders so log lines keep a stable shape.
impl<T: fmt::Display> fmt::Display for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nullable::Absent => f.write_str("absent"),
            Nullable::Null => f.write_str("null"),
            Nullable::Present(value) => value.fmt(f),
        }
    }
}

/// Display adapter for optional log fields: the value, or `null`.
pub(crate) struct OrNull<'a, T: ?Sized>(pub(crate) Option<&'a T>);

impl<T: fmt::Display + ?Sized> fmt::Display for OrNull<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("null"),
        }
    }
}

pub(crate) fn or_null<T: ?Sized>(value: Option<&T>) -> OrNull<'_, T> {
    OrNull(value)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOr<T> {
    Raw(String),
    Tee(T),
}

/// Accepts either the value itself or its string rendering (`12` or `"12"`).
pub(crate) fn deserialize_str<'de, T, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr + Deserialize<'de>,
    T::Err: fmt::Display,
{
    let v = <RawOr<T>>::deserialize(deserializer)?;
    match v {
        RawOr::Raw(s) => T::from_str(&s)
            .map_err(|err| <D::Error as serde::de::Error>::custom(format!("parsing value: {err}"))),
        RawOr::Tee(n) => Ok(n),
    }
}

pub(crate) fn deserialize_str_opt<'de, T, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<T>, D::Error>
where
    T: FromStr + Deserialize<'de>,
    T::Err: fmt::Display,
{
    let v = <Option<RawOr<T>>>::deserialize(deserializer)?;
    if let Some(v) = v {
        Ok(match v {
            RawOr::Raw(s) => Some(T::from_str(&s).map_err(|err| {
                <D::Error as serde::de::Error>::custom(format!("parsing value: {err}"))
            })?),
            RawOr::Tee(n) => Some(n),
        })
    } else {
        Ok(None)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(serde_json::Number),
}

impl From<StrOrNum> for String {
    fn from(value: StrOrNum) -> Self {
        match value {
            StrOrNum::Str(s) => s,
            StrOrNum::Num(n) => n.to_string(),
        }
    }
}

/// Strings that some senders write as bare numbers (`"1000"` or `1000`).
pub(crate) fn deserialize_string_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<StrOrNum>::deserialize(deserializer).map(|value| value.map(String::from))
}

/// Ids arrive as strings or bare integers (`"123"` or `123`).
pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Nullable<String>, D::Error> {
    deserialize_string_opt(deserializer).map(Nullable::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize, Serialize, Debug, PartialEq)]
    struct Scored {
        #[serde(default, skip_serializing_if = "Nullable::is_absent")]
        score: Nullable<String>,
    }

    #[test]
    fn nullable_keeps_three_states() {
        let absent: Scored = serde_json::from_value(json!({})).unwrap();
        let null: Scored = serde_json::from_value(json!({ "score": null })).unwrap();
        let present: Scored = serde_json::from_value(json!({ "score": "GREEN" })).unwrap();

        assert_eq!(absent.score, Nullable::Absent);
        assert_eq!(null.score, Nullable::Null);
        assert_eq!(present.score, Nullable::Present("GREEN".to_owned()));

        assert_eq!(serde_json::to_value(&absent).unwrap(), json!({}));
        assert_eq!(serde_json::to_value(&null).unwrap(), json!({ "score": null }));
    }

    #[test]
    fn placeholders() {
        assert_eq!(Nullable::<String>::Absent.to_string(), "absent");
        assert_eq!(Nullable::<String>::Null.to_string(), "null");
        assert_eq!(or_null::<str>(None).to_string(), "null");
        assert_eq!(or_null(Some("x")).to_string(), "x");
    }

    #[test]
    fn deserialize_str_test() {
        #[derive(Deserialize)]
        struct Coordinates {
            #[serde(deserialize_with = "deserialize_str::<f64, __D>")]
            latitude: f64,
            #[serde(default, deserialize_with = "deserialize_str_opt::<f64, __D>")]
            longitude: Option<f64>,
        }

        let c: Coordinates =
            serde_json::from_value(json!({ "latitude": "6.5", "longitude": 3.25 })).unwrap();
        assert_eq!(c.latitude, 6.5);
        assert_eq!(c.longitude, Some(3.25));

        let c: Coordinates = serde_json::from_value(json!({ "latitude": 1 })).unwrap();
        assert_eq!(c.longitude, None);
    }

    #[test]
    fn strings_and_numbers() {
        #[derive(Deserialize)]
        struct Stamped {
            #[serde(default, deserialize_with = "deserialize_string_opt")]
            at: Option<String>,
            #[serde(default, deserialize_with = "deserialize_id")]
            id: Nullable<String>,
        }

        let s: Stamped = serde_json::from_value(json!({ "at": 1000, "id": 42 })).unwrap();
        assert_eq!(s.at.as_deref(), Some("1000"));
        assert_eq!(s.id, Nullable::Present("42".to_owned()));

        let s: Stamped = serde_json::from_value(json!({ "at": "1000", "id": null })).unwrap();
        assert_eq!(s.at.as_deref(), Some("1000"));
        assert_eq!(s.id, Nullable::Null);

        let s: Stamped = serde_json::from_value(json!({})).unwrap();
        assert_eq!(s.at, None);
        assert_eq!(s.id, Nullable::Absent);

        assert!(serde_json::from_value::<Stamped>(json!({ "at": true })).is_err());
    }
}
