//! Columns and the extractor that binds them to a collection.
//!
//! An [`Extractor`] compiles its column specifications once, against the
//! element type's shape, and borrows the backing slice. Rebinding swaps the
//! slice without recompiling anything; because the slice's element type is a
//! type parameter, binding a wrong-typed collection is a compile error
//! rather than a runtime contract violation.

use std::any::Any;

use crate::error::{Error, Result};
use crate::path::{compile, AccessPath};
use crate::shape::{DerefFn, ShapeData, Shaped};
use crate::value::{Kind, Value};

/// A named, typed, compiled extraction rule producing one value per record.
///
/// Columns are created by [`Extractor::new`]. The name defaults to the
/// dot-joined access path and may be changed freely afterwards; the compiled
/// path and kind are fixed.
#[derive(Debug)]
pub struct Column {
    name: String,
    path: AccessPath,
}

impl Column {
    /// The column's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the column. The compiled access path is unaffected.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The column's semantic value kind, fixed at compilation.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.path.kind()
    }

    /// Whether the column reads an unsigned integer representation.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.path.is_unsigned()
    }

    /// Whether extraction can yield absent cells: a nilable pointer layer or
    /// a fallible accessor somewhere on the path.
    ///
    /// Primary collection-level indirection is not included; a collection of
    /// nilable pointers can always produce absent rows.
    #[must_use]
    pub fn may_fail(&self) -> bool {
        self.path.may_fail()
    }

    pub(crate) fn extract(&self, record: &dyn Any) -> Option<Value> {
        self.path.extract(record)
    }
}

/// Extracts a fixed set of columns from a borrowed slice of records.
///
/// The element type `T` may be the record type itself or a pointer wrapping
/// of it (`Option<Box<Obs>>`, `Box<Obs>`, ...); collection-level indirection
/// is stripped per row, and a nil element yields absent cells across all
/// columns of that row.
///
/// After construction the extractor is read-only per row and safe to share
/// across reader threads as long as the backing slice is not mutated.
#[derive(Debug)]
pub struct Extractor<'a, T: Shaped> {
    rows: &'a [T],
    primary: Vec<DerefFn>,
    columns: Vec<Column>,
}

impl<'a, T: Shaped> Extractor<'a, T> {
    /// Build an extractor over `rows`, compiling every specification in
    /// order.
    ///
    /// # Errors
    ///
    /// Fails if the element type (after stripping pointer layers) is not a
    /// record type, or if any specification does not compile; the first
    /// failing column aborts construction.
    pub fn new<S: AsRef<str>>(rows: &'a [T], specs: &[S]) -> Result<Self> {
        let mut shape = T::shape();
        let mut primary = Vec::new();
        while let ShapeData::Pointer(pointer) = shape.data() {
            primary.push(pointer.deref);
            shape = (pointer.target)();
        }
        if !matches!(shape.data(), ShapeData::Struct(_)) {
            return Err(Error::not_a_record(shape.name()));
        }

        let mut columns = Vec::with_capacity(specs.len());
        for spec in specs {
            let path = compile(shape, spec.as_ref())?;
            columns.push(Column {
                name: path.name().to_string(),
                path,
            });
        }

        Ok(Self {
            rows,
            primary,
            columns,
        })
    }

    /// Rebind to a different collection of the same element type.
    ///
    /// Compiled columns are reused as-is; only the row source and row count
    /// change. Rebinding may be repeated any number of times.
    pub fn bind(&mut self, rows: &'a [T]) {
        self.rows = rows;
    }

    /// The number of rows in the currently bound collection.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// How many pointer layers the element type wraps around the record
    /// (`0` for `Vec<Obs>`, `2` for `Vec<Option<Box<Obs>>>`).
    #[must_use]
    pub fn primary_indirection(&self) -> usize {
        self.primary.len()
    }

    /// Whether the currently bound collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The columns, in output order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to the columns: rename, reorder, or drop entries.
    pub fn columns_mut(&mut self) -> &mut Vec<Column> {
        &mut self.columns
    }

    /// Extract the cell at (`col`, `row`).
    ///
    /// Returns `None` for absent cells — a nil pointer or failed accessor on
    /// the path, a nil collection element — and for out-of-range indexes.
    #[must_use]
    pub fn value_at(&self, col: usize, row: usize) -> Option<Value> {
        let column = self.columns.get(col)?;
        let record = self.rows.get(row)?;
        let mut current: &dyn Any = record;
        for deref in &self.primary {
            current = deref(current)?;
        }
        column.extract(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    crate::record! {
        #[derive(Debug, Clone)]
        struct Reading {
            flag: bool,
            count: i64,
            ratio: f64,
            label: String,
            at: DateTime<Utc>,
        }
        accessors {
            fn flag_m(&self) -> bool;
            fn count_m(&self) -> i64;
            fn ratio_m(&self) -> f64;
            fn label_m(&self) -> String;
            fn at_m(&self) -> DateTime<Utc>;
            fn flag_e(&self) -> Result<bool, String>;
            fn count_e(&self) -> Result<i64, String>;
            fn ratio_e(&self) -> Result<f64, String>;
            fn label_e(&self) -> Result<String, String>;
            fn at_e(&self) -> Result<DateTime<Utc>, String>;
        }
    }

    impl Reading {
        fn flag_m(&self) -> bool {
            self.flag
        }
        fn count_m(&self) -> i64 {
            self.count
        }
        fn ratio_m(&self) -> f64 {
            self.ratio
        }
        fn label_m(&self) -> String {
            self.label.clone()
        }
        fn at_m(&self) -> DateTime<Utc> {
            self.at
        }
        fn flag_e(&self) -> std::result::Result<bool, String> {
            if self.flag {
                Ok(true)
            } else {
                Err("some error".to_string())
            }
        }
        fn count_e(&self) -> std::result::Result<i64, String> {
            if self.count > 10 {
                Ok(self.count)
            } else {
                Err("some error".to_string())
            }
        }
        fn ratio_e(&self) -> std::result::Result<f64, String> {
            if self.ratio > 10.0 {
                Ok(self.ratio)
            } else {
                Err("some error".to_string())
            }
        }
        fn label_e(&self) -> std::result::Result<String, String> {
            if self.label.len() > 10 {
                Ok(self.label.clone())
            } else {
                Err("some error".to_string())
            }
        }
        fn at_e(&self) -> std::result::Result<DateTime<Utc>, String> {
            use chrono::Timelike;
            if self.at.hour() > 10 {
                Ok(self.at)
            } else {
                Err("some error".to_string())
            }
        }
    }

    fn time(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 2, hour, 20, 30).unwrap()
    }

    fn readings() -> Vec<Reading> {
        vec![
            Reading {
                flag: true,
                count: 23,
                ratio: 45.67,
                label: "Hello World!".to_string(),
                at: time(15),
            },
            Reading {
                flag: false,
                count: 9,
                ratio: 8.76,
                label: "Short".to_string(),
                at: time(3),
            },
        ]
    }

    const SPECS: [&str; 15] = [
        "flag", "count", "ratio", "label", "at", "flag_m", "count_m", "ratio_m", "label_m",
        "at_m", "flag_e", "count_e", "ratio_e", "label_e", "at_e",
    ];

    #[test]
    fn test_columns_in_order_with_kinds() {
        let data = readings();
        let extractor = Extractor::new(&data, &SPECS).unwrap();
        assert_eq!(extractor.columns().len(), SPECS.len());
        for (i, spec) in SPECS.iter().enumerate() {
            let column = &extractor.columns()[i];
            assert_eq!(column.name(), *spec);
            let want = match i % 5 {
                0 => Kind::Bool,
                1 => Kind::Int,
                2 => Kind::Float,
                3 => Kind::Text,
                _ => Kind::Timestamp,
            };
            assert_eq!(column.kind(), want, "column {spec}");
        }
    }

    #[test]
    fn test_fields_methods_and_fallible_methods_agree() {
        let data = readings();
        let extractor = Extractor::new(&data, &SPECS).unwrap();

        for (row, reading) in data.iter().enumerate() {
            assert_eq!(extractor.value_at(0, row), Some(Value::Bool(reading.flag)));
            assert_eq!(extractor.value_at(5, row), Some(Value::Bool(reading.flag)));
            assert_eq!(extractor.value_at(1, row), Some(Value::Int(reading.count)));
            assert_eq!(extractor.value_at(6, row), Some(Value::Int(reading.count)));
            assert_eq!(extractor.value_at(2, row), Some(Value::Float(reading.ratio)));
            assert_eq!(
                extractor.value_at(3, row),
                Some(Value::Text(reading.label.clone()))
            );
            assert_eq!(
                extractor.value_at(4, row),
                Some(Value::Timestamp(reading.at))
            );
        }

        // Row 0 satisfies every fallible accessor, row 1 none of them.
        for col in 10..15 {
            assert!(extractor.value_at(col, 0).is_some(), "column {col}");
            assert_eq!(extractor.value_at(col, 1), None, "column {col}");
        }
    }

    #[test]
    fn test_rebind_updates_row_count_without_leakage() {
        let data = readings();
        let mut extractor = Extractor::new(&data, &["count"]).unwrap();
        assert_eq!(extractor.row_count(), 2);

        let shorter = vec![Reading {
            flag: true,
            count: 77,
            ratio: 1.0,
            label: "x".to_string(),
            at: time(1),
        }];
        extractor.bind(&shorter);
        assert_eq!(extractor.row_count(), 1);
        assert_eq!(extractor.value_at(0, 0), Some(Value::Int(77)));
        assert_eq!(extractor.value_at(0, 1), None);

        extractor.bind(&data);
        assert_eq!(extractor.row_count(), 2);
        assert_eq!(extractor.value_at(0, 0), Some(Value::Int(23)));
        assert_eq!(extractor.value_at(0, 1), Some(Value::Int(9)));
    }

    #[test]
    fn test_bad_specs_abort_construction() {
        let data = readings();
        for spec in ["missing", "label.anything", "flag..", ""] {
            assert!(
                Extractor::new(&data, &[spec]).is_err(),
                "spec {spec:?} accepted"
            );
        }
    }

    crate::record! {
        #[derive(Debug, Clone)]
        struct Holder {
            a: Option<i64>,
        }
    }

    #[test]
    fn test_pointer_fields_yield_absent_per_row() {
        let data = vec![
            Holder { a: Some(1) },
            Holder { a: None },
            Holder { a: Some(2) },
        ];
        let extractor = Extractor::new(&data, &["a"]).unwrap();
        assert_eq!(extractor.value_at(0, 0), Some(Value::Int(1)));
        assert_eq!(extractor.value_at(0, 1), None);
        assert_eq!(extractor.value_at(0, 2), Some(Value::Int(2)));
        assert!(extractor.columns()[0].may_fail());
    }

    #[test]
    fn test_collection_of_pointers() {
        let data: Vec<Option<Box<Reading>>> = vec![
            Some(Box::new(readings().remove(0))),
            None,
        ];
        let extractor = Extractor::new(&data, &["count", "label"]).unwrap();
        assert_eq!(extractor.row_count(), 2);
        assert_eq!(extractor.primary_indirection(), 2);
        assert_eq!(extractor.value_at(0, 0), Some(Value::Int(23)));
        assert_eq!(
            extractor.value_at(1, 0),
            Some(Value::Text("Hello World!".to_string()))
        );
        // A nil element blanks the whole row.
        assert_eq!(extractor.value_at(0, 1), None);
        assert_eq!(extractor.value_at(1, 1), None);
    }

    #[test]
    fn test_non_record_elements_rejected() {
        let data = vec![1_i64, 2, 3];
        let err = Extractor::new(&data, &["anything"]).unwrap_err();
        assert!(matches!(err, Error::NotARecord { .. }));
    }

    crate::record! {
        #[derive(Debug, Clone)]
        struct Wide {
            big: u64,
        }
    }

    #[test]
    fn test_unsigned_round_trip() {
        let data = vec![Wide { big: u64::MAX }, Wide { big: 7 }];
        let extractor = Extractor::new(&data, &["big"]).unwrap();
        assert!(extractor.columns()[0].is_unsigned());
        assert_eq!(extractor.value_at(0, 0), Some(Value::Uint(u64::MAX)));
        assert_eq!(extractor.value_at(0, 1), Some(Value::Uint(7)));
    }

    #[test]
    fn test_columns_are_editable() {
        let data = readings();
        let mut extractor = Extractor::new(&data, &["count", "label"]).unwrap();
        extractor.columns_mut()[0].set_name("n");
        assert_eq!(extractor.columns()[0].name(), "n");
        assert_eq!(extractor.columns()[0].kind(), Kind::Int);

        // Permute and drop: extraction follows the edited column list.
        extractor.columns_mut().swap(0, 1);
        assert_eq!(extractor.columns()[0].name(), "label");
        assert_eq!(
            extractor.value_at(0, 0),
            Some(Value::Text("Hello World!".to_string()))
        );
        extractor.columns_mut().truncate(1);
        assert_eq!(extractor.value_at(1, 0), None);
    }
}
