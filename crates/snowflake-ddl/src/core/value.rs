//! Scalar values as they appear in rendered SQL.

use std::fmt;

use super::identifier::{
    AccountIdentifier, AccountLocator, AccountObjectIdentifier, DatabaseObjectIdentifier,
    ExternalObjectIdentifier, Identifier, ObjectIdentifier, SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments, TableColumnIdentifier,
};

/// A single value before quoting.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Rendered as `true` / `false`.
    Bool(bool),

    /// Rendered in decimal.
    Int(i64),

    /// Rendered as the shortest decimal that round-trips.
    Float(f64),

    /// Rendered as-is.
    Str(String),

    /// Fully qualified identifier. Never wrapped in quotes by modifiers;
    /// the name already carries its own quoting.
    Ident(String),

    /// Member of a value enum, rendered as its SQL spelling.
    Enum(&'static str),
}

impl SqlValue {
    /// Short name of the value type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Str(_) => "string",
            SqlValue::Ident(_) => "identifier",
            SqlValue::Enum(_) => "enum",
        }
    }

    /// Render the value without any quoting.
    pub fn render(&self) -> String {
        match self {
            SqlValue::Bool(v) => v.to_string(),
            SqlValue::Int(v) => v.to_string(),
            SqlValue::Float(v) => v.to_string(),
            SqlValue::Str(v) => v.clone(),
            SqlValue::Ident(v) => v.clone(),
            SqlValue::Enum(v) => (*v).to_string(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Conversion of a field value into a [`SqlValue`].
pub trait ToSqlValue {
    fn to_sql_value(&self) -> SqlValue;
}

impl<T: ToSqlValue + ?Sized> ToSqlValue for &T {
    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

macro_rules! int_to_sql_value {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Int(i64::from(*self))
                }
            }
        )+
    };
}

int_to_sql_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for f64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }
}

impl ToSqlValue for str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Str(self.to_string())
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Str(self.clone())
    }
}

macro_rules! ident_to_sql_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Ident(self.fully_qualified_name())
                }
            }
        )+
    };
}

ident_to_sql_value!(
    AccountObjectIdentifier,
    DatabaseObjectIdentifier,
    SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments,
    TableColumnIdentifier,
    ExternalObjectIdentifier,
    AccountIdentifier,
    AccountLocator,
    Identifier,
);

/// Declare a value enum with its SQL spelling and accepted aliases.
///
/// Generates `as_str`, `Display`, `FromStr` (case-insensitive, erroring with
/// [`SdkError::InvalidEnum`](crate::error::SdkError::InvalidEnum)),
/// [`ToSqlValue`] and serde impls that go through the string form.
macro_rules! sql_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $sql:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical SQL spelling.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $sql,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::SdkError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let upper = s.trim().to_uppercase();
                $(
                    if upper == $sql $(|| upper == $alias)* {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::error::SdkError::invalid_enum($kind, s))
            }
        }

        impl $crate::core::value::ToSqlValue for $name {
            fn to_sql_value(&self) -> $crate::core::value::SqlValue {
                $crate::core::value::SqlValue::Enum(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::std::result::Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use sql_enum;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;

    sql_enum! {
        enum Flavor ("flavor") {
            Vanilla = "VANILLA",
            DarkChocolate = "DARK_CHOCOLATE" | "DARK-CHOCOLATE",
        }
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(true.to_sql_value().render(), "true");
        assert_eq!(42i32.to_sql_value().render(), "42");
        assert_eq!((-7i64).to_sql_value().render(), "-7");
        assert_eq!(1.5f64.to_sql_value().render(), "1.5");
        assert_eq!(10.0f64.to_sql_value().render(), "10");
        assert_eq!(0.1f64.to_sql_value().render(), "0.1");
        assert_eq!("abc".to_sql_value().render(), "abc");
    }

    #[test]
    fn test_render_identifier_value() {
        let id = SchemaObjectIdentifier::new("db", "sch", "r1");
        assert_eq!(id.to_sql_value(), SqlValue::Ident("\"db\".\"sch\".\"r1\"".into()));
    }

    #[test]
    fn test_enum_parse_accepts_cases_and_aliases() {
        assert_eq!("VANILLA".parse::<Flavor>().unwrap(), Flavor::Vanilla);
        assert_eq!("vanilla".parse::<Flavor>().unwrap(), Flavor::Vanilla);
        assert_eq!("dark-chocolate".parse::<Flavor>().unwrap(), Flavor::DarkChocolate);
        assert_eq!(Flavor::DarkChocolate.to_sql_value(), SqlValue::Enum("DARK_CHOCOLATE"));
        assert_eq!(Flavor::ALL.len(), 2);
    }

    #[test]
    fn test_enum_parse_rejects_unknown() {
        let err = "strawberry".parse::<Flavor>().unwrap_err();
        match err {
            SdkError::InvalidEnum { kind, value } => {
                assert_eq!(kind, "flavor");
                assert_eq!(value, "strawberry");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_enum_serde_round_trip() {
        let parsed: Flavor = serde_json::from_str("\"dark_chocolate\"").unwrap();
        assert_eq!(parsed, Flavor::DarkChocolate);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"DARK_CHOCOLATE\"");
        assert!(serde_json::from_str::<Flavor>("\"mint\"").is_err());
    }
}
