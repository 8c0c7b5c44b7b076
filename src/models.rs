use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `user_logs.action` values written by this service.
pub const ACTION_LOGIN: &str = "login";
pub const ACTION_UPDATE_PROFILE: &str = "update_profile";

/// Calendar dates travel as `YYYY-MM-DD`.
pub mod iso_date {
    use serde::Serializer;
    use time::{macros::format_description, Date};

    pub fn parse(text: &str) -> Result<Date, time::error::Parse> {
        Date::parse(text, format_description!("[year]-[month]-[day]"))
    }

    pub fn serialize_option<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => {
                let text = d
                    .format(format_description!("[year]-[month]-[day]"))
                    .map_err(serde::ser::Error::custom)?;
                s.serialize_some(&text)
            }
            None => s.serialize_none(),
        }
    }
}

/// Free-form part of a user profile, stored as JSONB in `users.profile`.
///
/// Decoding never fails on shape. A missing, `null` or mistyped field decodes as empty;
/// non-string list entries are dropped and scalar social-media values become text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(deserialize_with = "lenient::object")]
    pub preferences: BTreeMap<String, Value>,
    #[serde(alias = "social_media", deserialize_with = "lenient::text_map")]
    pub social_media: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub interests: Vec<String>,
}

mod lenient {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn object<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, Value>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        })
    }

    pub fn text_map<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, String>, D::Error> {
        Ok(object(d)?
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                Value::Number(n) => Some((k, n.to_string())),
                Value::Bool(b) => Some((k, b.to_string())),
                _ => None,
            })
            .collect())
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }
}
