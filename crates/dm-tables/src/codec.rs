//! Persisted form of range tables.
//!
//! JSON object keys must be strings, so a [`Span`] key is written as text:
//!
//! ```text
//! span   := number ( "-" number )?
//! number := [0-9]+
//! ```
//!
//! [`encode`] always writes `start-end`, even for single values. [`decode`]
//! also accepts a lone number as shorthand for `n-n` and tolerates spaces
//! around the numbers. Decoding only ever splits and parses integers.
//!
//! A table is stored as a flat descriptor:
//!
//! ```json
//! {"dice": 2, "sides": 6, "name": "Wandering", "description": "",
//!  "entries": {"2-4": "Goblins", "7-7": "Orc"}}
//! ```
//!
//! Loading a descriptor checks the dice, keeps every span inside the domain,
//! and refuses overlapping entries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dice::DiceSpec;
use crate::error::{TableError, TableResult};
use crate::span::Span;
use crate::table::RangeTable;

/// Write a span as `start-end`.
pub fn encode(span: Span) -> String {
    format!("{}-{}", span.start(), span.end())
}

/// Parse a span written as `start-end` or `n`.
pub fn decode(text: &str) -> TableResult<Span> {
    let invalid = || TableError::InvalidSpan(text.to_string());
    let number = |part: &str| {
        let part = part.trim();
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        part.parse::<u32>().map_err(|_| invalid())
    };

    match text.split_once('-') {
        Some((start, end)) => Span::new(number(start)?, number(end)?),
        None => Ok(Span::single(number(text)?)),
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}

impl FromStr for Span {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(*self))
    }
}

impl<'de> Deserialize<'de> for Span {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpanVisitor;

        impl Visitor<'_> for SpanVisitor {
            type Value = Span;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a range such as \"3-5\" or \"7\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Span, E> {
                decode(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(SpanVisitor)
    }
}

/// The flat, string-keyed descriptor a [`RangeTable`] is stored as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDocument {
    /// Number of dice.
    pub dice: u32,
    /// Faces per die.
    pub sides: u32,
    /// Table name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Entries keyed by encoded span.
    #[serde(default)]
    pub entries: BTreeMap<Span, String>,
}

impl From<RangeTable> for TableDocument {
    fn from(table: RangeTable) -> Self {
        let dice = table.dice();
        let (name, description, entries) = table.into_parts();
        Self {
            dice: dice.count(),
            sides: dice.sides(),
            name,
            description,
            entries,
        }
    }
}

impl TryFrom<TableDocument> for RangeTable {
    type Error = TableError;

    fn try_from(doc: TableDocument) -> Result<Self, Self::Error> {
        let dice = DiceSpec::new(doc.dice, doc.sides)?;
        let mut previous: Option<Span> = None;
        for &span in doc.entries.keys() {
            if span.start() < dice.min() || span.end() > dice.max() {
                return Err(TableError::OutOfDomain {
                    start: span.start(),
                    end: span.end(),
                    low: dice.min(),
                    high: dice.max(),
                });
            }
            if let Some(prev) = previous.filter(|p| p.overlaps(span)) {
                return Err(TableError::Overlap {
                    first: encode(prev),
                    second: encode(span),
                });
            }
            previous = Some(span);
        }
        Ok(RangeTable::from_parts(
            dice,
            doc.name,
            doc.description,
            doc.entries,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn span(a: u32, b: u32) -> Span {
        Span::new(a, b).unwrap()
    }

    #[test]
    fn encode_format() {
        assert_eq!(encode(span(2, 4)), "2-4");
        assert_eq!(encode(Span::single(7)), "7-7");
        assert_eq!(span(10, 12).to_string(), "10-12");
    }

    #[test]
    fn decode_forms() {
        assert_eq!(decode("2-4").unwrap(), span(2, 4));
        assert_eq!(decode(" 2 - 4 ").unwrap(), span(2, 4));
        assert_eq!(decode("7").unwrap(), Span::single(7));
        assert_eq!("5-9".parse::<Span>().unwrap(), span(5, 9));
    }

    #[test]
    fn decode_rejects_expressions() {
        for bad in [
            "",
            "-",
            "3-",
            "-3",
            "(2, 4)",
            "2-4-6",
            "+2-4",
            "2..4",
            "__import__('os')",
            "99999999999-1",
        ] {
            assert!(decode(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn decode_rejects_reversed_range() {
        assert_eq!(
            decode("9-3"),
            Err(TableError::InvalidRange { start: 9, end: 3 })
        );
    }

    #[test]
    fn descriptor_json_shape() {
        let mut table = RangeTable::new(DiceSpec::new(2, 6).unwrap(), "Wandering");
        table.assign(2, 4, "Goblins").unwrap();
        table.assign(7, 7, "Orc").unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "dice": 2,
                "sides": 6,
                "name": "Wandering",
                "description": "",
                "entries": {"2-4": "Goblins", "7-7": "Orc"}
            })
        );
    }

    #[test]
    fn descriptor_round_trip_preserves_entries() {
        let mut table = RangeTable::new(DiceSpec::new(1, 20).unwrap(), "Loot");
        table.assign(1, 10, "Copper").unwrap();
        table.assign(11, 19, "").unwrap();
        table.assign(20, 20, "Sword").unwrap();
        table.set_description("Roll once per room");

        let json = serde_json::to_string(&table).unwrap();
        let back: RangeTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn descriptor_with_shorthand_keys_loads() {
        let json = r#"{"dice": 1, "sides": 6, "name": "T", "entries": {"3": "x", "4-6": "y"}}"#;
        let table: RangeTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.lookup(3), Some("x"));
        assert_eq!(table.lookup(5), Some("y"));
        assert_eq!(table.description(), "");
    }

    #[test]
    fn descriptor_rejects_overlap() {
        let json = r#"{"dice": 1, "sides": 6, "name": "T", "entries": {"1-3": "x", "3-6": "y"}}"#;
        let err = serde_json::from_str::<RangeTable>(json).unwrap_err();
        assert!(err.to_string().contains("overlap"), "{err}");
    }

    #[test]
    fn descriptor_rejects_oversized_pool() {
        let json = r#"{"dice": 2, "sides": 1000000000, "name": "T"}"#;
        let err = serde_json::from_str::<RangeTable>(json).unwrap_err();
        assert!(err.to_string().contains("invalid dice"), "{err}");
    }

    #[test]
    fn descriptor_rejects_out_of_domain() {
        let json = r#"{"dice": 2, "sides": 6, "name": "T", "entries": {"1-3": "x"}}"#;
        assert!(serde_json::from_str::<RangeTable>(json).is_err());
    }

    #[test]
    fn descriptor_rejects_bad_dice() {
        let json = r#"{"dice": 0, "sides": 6, "name": "T"}"#;
        assert!(serde_json::from_str::<RangeTable>(json).is_err());
    }

    #[test]
    fn descriptor_rejects_unparsable_key() {
        let json = r#"{"dice": 1, "sides": 6, "name": "T", "entries": {"(1, 3)": "x"}}"#;
        assert!(serde_json::from_str::<RangeTable>(json).is_err());
    }

    proptest! {
        #[test]
        fn span_text_round_trip(a in any::<u32>(), b in any::<u32>()) {
            let s = Span::new(a.min(b), a.max(b)).unwrap();
            prop_assert_eq!(decode(&encode(s)).unwrap(), s);
        }

        #[test]
        fn span_json_key_round_trip(a in 0u32..1000, w in 0u32..1000) {
            let mut map = BTreeMap::new();
            map.insert(Span::new(a, a + w).unwrap(), "v".to_string());
            let json = serde_json::to_string(&map).unwrap();
            let back: BTreeMap<Span, String> = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, map);
        }
    }
}
