//! Result mapping.
//!
//! Raw rows come back from the executor as column maps. They are bound to
//! row records with serde (column names via `#[serde(rename)]`), then
//! converted to the plain records callers see.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::core::traits::Row;
use crate::error::{Result, SdkError};

/// A row record that converts to a plain record.
pub trait ConvertibleRow {
    type Plain;

    fn convert(&self) -> Result<Self::Plain>;
}

/// Bind one raw row to a row record.
pub fn bind_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}

/// Bind every raw row, stopping at the first failure.
pub fn bind_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter().map(bind_row).collect()
}

/// Apply `convert` to every row, preserving order.
pub fn map_rows<R, T, F>(rows: &[R], convert: F) -> Result<Vec<T>>
where
    F: FnMut(&R) -> Result<T>,
{
    rows.iter().map(convert).collect()
}

/// Convert every row record to its plain record.
pub fn convert_rows<R: ConvertibleRow>(rows: &[R]) -> Result<Vec<R::Plain>> {
    map_rows(rows, R::convert)
}

/// First element satisfying `predicate`.
pub fn find_one<T, P>(items: Vec<T>, mut predicate: P) -> Result<T>
where
    P: FnMut(&T) -> bool,
{
    items
        .into_iter()
        .find(|item| predicate(item))
        .ok_or(SdkError::ObjectNotFound)
}

/// Snowflake reports flags as `true`/`false`, `Y`/`N` or real booleans
/// depending on the command. Accept all of them.
pub fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "y" | "yes" | "on" => Ok(true),
            "false" | "n" | "no" | "off" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid flag value: {other}"))),
        },
    }
}

/// Like [`deserialize_flag`] but NULL maps to `false`.
pub fn deserialize_optional_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_flag")] bool);

    Ok(Option::<Wrapper>::deserialize(deserializer)?
        .map(|w| w.0)
        .unwrap_or(false))
}

/// Numeric columns sometimes arrive as strings. Accept both.
pub fn deserialize_lenient_int<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Text(String),
    }

    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Number::Int(n)) => Ok(Some(n)),
        Some(Number::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Number::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid integer: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct ThingRow {
        #[serde(rename = "name")]
        name: String,
        #[serde(rename = "comment")]
        comment: Option<String>,
        #[serde(rename = "is_default", deserialize_with = "deserialize_flag")]
        is_default: bool,
        #[serde(rename = "size", default, deserialize_with = "deserialize_lenient_int")]
        size: Option<i64>,
    }

    #[derive(Debug, PartialEq)]
    struct Thing {
        name: String,
        comment: String,
        is_default: bool,
    }

    impl ConvertibleRow for ThingRow {
        type Plain = Thing;

        fn convert(&self) -> Result<Thing> {
            if self.name == "broken" {
                return Err(SdkError::invalid_enum("thing", "broken"));
            }
            Ok(Thing {
                name: self.name.clone(),
                comment: self.comment.clone().unwrap_or_default(),
                is_default: self.is_default,
            })
        }
    }

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_bind_and_convert() {
        let rows = vec![
            row(json!({"name": "a", "comment": null, "is_default": "Y", "size": "3"})),
            row(json!({"name": "b", "comment": "c", "is_default": false})),
        ];
        let bound: Vec<ThingRow> = bind_rows(rows).unwrap();
        assert_eq!(bound[0].size, Some(3));
        assert_eq!(bound[1].size, None);

        let plain = convert_rows(&bound).unwrap();
        assert_eq!(
            plain,
            vec![
                Thing {
                    name: "a".into(),
                    comment: String::new(),
                    is_default: true
                },
                Thing {
                    name: "b".into(),
                    comment: "c".into(),
                    is_default: false
                },
            ]
        );
    }

    #[test]
    fn test_bind_missing_column_fails() {
        let rows = vec![row(json!({"comment": "c", "is_default": "N"}))];
        let err = bind_rows::<ThingRow>(rows).unwrap_err();
        assert!(matches!(err, SdkError::Json(_)));
    }

    #[test]
    fn test_bind_null_into_required_field_fails() {
        let rows = vec![row(json!({"name": null, "is_default": "N"}))];
        assert!(bind_rows::<ThingRow>(rows).is_err());
    }

    #[test]
    fn test_convert_error_is_propagated() {
        let rows = vec![row(json!({"name": "broken", "is_default": "N"}))];
        let bound: Vec<ThingRow> = bind_rows(rows).unwrap();
        let err = convert_rows(&bound).unwrap_err();
        assert!(matches!(err, SdkError::InvalidEnum { kind: "thing", .. }));
    }

    #[test]
    fn test_map_rows_preserves_order() {
        let doubled = map_rows(&[1, 2, 3], |n| Ok(n * 2)).unwrap();
        assert_eq!(doubled, vec![2, 4, 6]);
    }

    #[test]
    fn test_find_one_first_match_wins() {
        let items = vec![("a", 1), ("b", 2), ("b", 3)];
        assert_eq!(find_one(items.clone(), |i| i.0 == "b").unwrap(), ("b", 2));
        assert!(matches!(
            find_one(items, |i| i.0 == "z"),
            Err(SdkError::ObjectNotFound)
        ));
    }
}
