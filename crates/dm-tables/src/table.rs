//! Range tables: dice sums mapped to text outcomes.
//!
//! A [`RangeTable`] maps disjoint spans of the sums its dice can produce to
//! text. Assigning a span that overlaps existing entries trims or splits
//! them so the entries stay disjoint. Values not covered by any entry are
//! free slots.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::iter::FusedIterator;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::codec::TableDocument;
use crate::dice::DiceSpec;
use crate::error::{TableError, TableResult};
use crate::odds::SumDistribution;
use crate::span::Span;

/// A random table rolled with a fixed pool of dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDocument", into = "TableDocument")]
pub struct RangeTable {
    dice: DiceSpec,
    name: String,
    description: String,
    entries: BTreeMap<Span, String>,
}

/// The outcome of rolling a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRoll<'a> {
    /// The value that was rolled.
    pub value: u32,
    /// The entry text at that value, if the slot is taken.
    pub text: Option<&'a str>,
}

/// Display switches for [`RangeTable::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append each row's chance of being rolled.
    pub show_probabilities: bool,
    /// Include free slots as rows of their own.
    pub show_free: bool,
}

/// One line of a rendered table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<'a> {
    /// The values this row covers.
    pub span: Span,
    /// Entry text, or `None` for a free slot.
    pub text: Option<&'a str>,
    /// Rounded chance of rolling inside the span, when requested.
    pub probability: Option<f64>,
}

impl RangeTable {
    /// Create an empty table.
    pub fn new(dice: DiceSpec, name: impl Into<String>) -> Self {
        Self {
            dice,
            name: name.into(),
            description: String::new(),
            entries: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(
        dice: DiceSpec,
        name: String,
        description: String,
        entries: BTreeMap<Span, String>,
    ) -> Self {
        Self {
            dice,
            name,
            description,
            entries,
        }
    }

    pub(crate) fn into_parts(self) -> (String, String, BTreeMap<Span, String>) {
        (self.name, self.description, self.entries)
    }

    /// The dice this table is rolled with.
    pub fn dice(&self) -> DiceSpec {
        self.dice
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the table.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Smallest and largest obtainable sums, inclusive.
    pub fn domain(&self) -> (u32, u32) {
        (self.dice.min(), self.dice.max())
    }

    /// All entries in ascending order.
    pub fn entries(&self) -> impl Iterator<Item = (Span, &str)> {
        self.entries.iter().map(|(span, text)| (*span, text.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every domain value not covered by an entry, lowest first.
    ///
    /// The iterator borrows the table and can be cloned to start over.
    pub fn free_slots(&self) -> FreeSlots<'_> {
        FreeSlots {
            table: self,
            next: Some(self.dice.min()),
        }
    }

    /// The lowest free slot, if any.
    pub fn first_free(&self) -> Option<u32> {
        self.free_slots().next()
    }

    /// Whether every domain value is covered.
    pub fn is_full(&self) -> bool {
        self.first_free().is_none()
    }

    /// Sum distribution of this table's dice.
    pub fn distribution(&self) -> SumDistribution {
        SumDistribution::new(self.dice)
    }

    /// Chance, rounded to two decimals, that a roll lands in `[start, end]`.
    pub fn probability(&self, start: u32, end: u32) -> f64 {
        self.distribution().probability(start, end)
    }

    /// Chance, rounded to two decimals, of rolling exactly `value`.
    pub fn entry_probability(&self, value: u32) -> f64 {
        self.probability(value, value)
    }

    /// Map `[start, end]` to `text`.
    ///
    /// Existing entries inside the span are dropped, entries sticking out of
    /// it are trimmed, and an entry enclosing it is split in two. Nothing
    /// changes if the span is reversed or leaves the domain.
    pub fn assign(&mut self, start: u32, end: u32, text: impl Into<String>) -> TableResult<()> {
        let span = Span::new(start, end)?;
        self.check_domain(span)?;

        let hits: Vec<Span> = self
            .entries
            .range(..=Span::probe(span.end()))
            .rev()
            .take_while(|(existing, _)| existing.end() >= span.start())
            .map(|(existing, _)| *existing)
            .collect();

        for existing in hits {
            let Some(old) = self.entries.remove(&existing) else {
                continue;
            };
            match existing.carve(span) {
                (None, None) => {}
                (Some(piece), None) | (None, Some(piece)) => {
                    self.entries.insert(piece, old);
                }
                (Some(below), Some(above)) => {
                    self.entries.insert(below, old.clone());
                    self.entries.insert(above, old);
                }
            }
            tracing::trace!(table = %self.name, %existing, "resolved overlap");
        }

        let text = text.into();
        tracing::debug!(table = %self.name, %span, text = %text, "assigned entry");
        self.entries.insert(span, text);
        Ok(())
    }

    /// Map a single value to `text`.
    pub fn assign_one(&mut self, value: u32, text: impl Into<String>) -> TableResult<()> {
        self.assign(value, value, text)
    }

    /// Remove the entry keyed exactly `[start, end]` and return its text.
    ///
    /// Entries that merely overlap the span are left alone.
    pub fn remove(&mut self, start: u32, end: u32) -> Option<String> {
        let span = Span::new(start, end).ok()?;
        let removed = self.entries.remove(&span);
        if removed.is_some() {
            tracing::debug!(table = %self.name, %span, "removed entry");
        }
        removed
    }

    /// Text of the entry covering `value`.
    pub fn lookup(&self, value: u32) -> Option<&str> {
        self.entry_at(value).map(|(_, text)| text)
    }

    /// The entry covering `value`, with its span.
    pub fn entry_at(&self, value: u32) -> Option<(Span, &str)> {
        self.entries
            .range(..=Span::probe(value))
            .next_back()
            .filter(|(span, _)| span.contains(value))
            .map(|(span, text)| (*span, text.as_str()))
    }

    /// Draw a value uniformly from the domain and look it up.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> TableRoll<'_> {
        let (low, high) = self.domain();
        let value = rng.random_range(low..=high);
        TableRoll {
            value,
            text: self.lookup(value),
        }
    }

    /// Roll the table's dice, sum them, and look the sum up.
    pub fn roll_dice<R: Rng + ?Sized>(&self, rng: &mut R) -> TableRoll<'_> {
        let value = self.dice.roll(rng);
        TableRoll {
            value,
            text: self.lookup(value),
        }
    }

    /// Entries, and optionally free slots, in ascending order.
    pub fn rows(&self, show_probabilities: bool, show_free: bool) -> Vec<TableRow<'_>> {
        let odds = show_probabilities.then(|| self.distribution());
        let chance = |span: Span| {
            odds.as_ref()
                .map(|d| d.probability(span.start(), span.end()))
        };

        let mut rows: Vec<TableRow<'_>> = self
            .entries()
            .map(|(span, text)| TableRow {
                span,
                text: Some(text),
                probability: chance(span),
            })
            .collect();

        if show_free {
            rows.extend(self.free_slots().map(|value| {
                let span = Span::single(value);
                TableRow {
                    span,
                    text: None,
                    probability: chance(span),
                }
            }));
            rows.sort_by_key(|row| row.span);
        }
        rows
    }

    /// Human-readable table listing.
    ///
    /// ```text
    ///  2d6   | Wandering
    /// -------+------------
    ///  2 - 4 | Goblins (17%)
    ///  7     | Orc (17%)
    /// ```
    pub fn render(&self, options: RenderOptions) -> String {
        let rows = self.rows(options.show_probabilities, options.show_free);
        let labels: Vec<String> = rows
            .iter()
            .map(|row| {
                if row.span.start() == row.span.end() {
                    format!(" {}", row.span.start())
                } else {
                    format!(" {} - {}", row.span.start(), row.span.end())
                }
            })
            .collect();

        let dice = self.dice.to_string();
        let width = labels
            .iter()
            .map(|l| l.len() + 1)
            .chain(std::iter::once(dice.len() + 2))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "{:<width$}| {}", format!(" {dice}"), self.name);
        if !self.description.is_empty() {
            let _ = writeln!(out, "{:<width$}| {}", "", self.description);
        }
        let _ = writeln!(out, "{}+{}", "-".repeat(width), "-".repeat(12));

        for (row, label) in rows.iter().zip(&labels) {
            let text = row.text.unwrap_or("(free)");
            let _ = write!(out, "{label:<width$}| {text}");
            if let Some(p) = row.probability {
                let _ = write!(out, " ({:.0}%)", p * 100.0);
            }
            out.push('\n');
        }
        out
    }

    fn check_domain(&self, span: Span) -> TableResult<()> {
        let (low, high) = self.domain();
        if span.start() < low || span.end() > high {
            return Err(TableError::OutOfDomain {
                start: span.start(),
                end: span.end(),
                low,
                high,
            });
        }
        Ok(())
    }
}

/// Iterator over a table's free slots. See [`RangeTable::free_slots`].
#[derive(Debug, Clone)]
pub struct FreeSlots<'a> {
    table: &'a RangeTable,
    next: Option<u32>,
}

impl Iterator for FreeSlots<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let high = self.table.dice.max();
        loop {
            let value = self.next.filter(|v| *v <= high)?;
            match self.table.entry_at(value) {
                Some((span, _)) => self.next = span.end().checked_add(1),
                None => {
                    self.next = value.checked_add(1);
                    return Some(value);
                }
            }
        }
    }
}

impl FusedIterator for FreeSlots<'_> {}
