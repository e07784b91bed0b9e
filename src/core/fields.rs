use log::debug;

use crate::{
    core::record::{FieldDescriptor, FieldValue, Record},
    error::CsvError,
};

/// The target of a render: a single record or a collection of records of
/// the same type.
#[derive(Debug)]
pub enum Records<'a, R> {
    One(&'a R),
    Many(&'a [R]),
}

/// Conversion into [`Records`], implemented for `&R`, `&[R]`, `&[R; N]` and
/// `&Vec<R>` so render functions accept any of them directly.
pub trait IntoRecords<'a> {
    type Record: Record + 'a;

    fn into_records(self) -> Records<'a, Self::Record>;
}

impl<'a, R: Record> IntoRecords<'a> for Records<'a, R> {
    type Record = R;

    fn into_records(self) -> Records<'a, R> {
        self
    }
}

impl<'a, R: Record> IntoRecords<'a> for &'a R {
    type Record = R;

    fn into_records(self) -> Records<'a, R> {
        Records::One(self)
    }
}

impl<'a, R: Record> IntoRecords<'a> for &'a [R] {
    type Record = R;

    fn into_records(self) -> Records<'a, R> {
        Records::Many(self)
    }
}

impl<'a, R: Record, const N: usize> IntoRecords<'a> for &'a [R; N] {
    type Record = R;

    fn into_records(self) -> Records<'a, R> {
        Records::Many(self.as_slice())
    }
}

impl<'a, R: Record> IntoRecords<'a> for &'a Vec<R> {
    type Record = R;

    fn into_records(self) -> Records<'a, R> {
        Records::Many(self.as_slice())
    }
}

impl<R: Record> Records<'_, R> {
    /// Ordered field descriptors of the target.
    ///
    /// For a collection the descriptors come from the element type, so an
    /// empty collection still has a shape.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        R::fields()
    }

    pub fn len(&self) -> usize {
        match self {
            Records::One(_) => 1,
            Records::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads every record into a [`RecordTable`].
    ///
    /// # Errors
    ///
    /// `CsvError::InvalidInput` when a record returns a different number of
    /// values than its type declares fields.
    pub fn to_table(&self) -> Result<RecordTable, CsvError> {
        let fields = self.fields();
        let mut rows = Vec::with_capacity(self.len());

        match self {
            Records::One(record) => rows.push(read_record(*record, fields.len())?),
            Records::Many(records) => {
                for record in records.iter() {
                    rows.push(read_record(record, fields.len())?);
                }
            }
        }

        debug!("Read {} record(s) of {} field(s)", rows.len(), fields.len());

        Ok(RecordTable { fields, rows })
    }
}

fn read_record<R: Record>(record: &R, expected: usize) -> Result<Vec<FieldValue>, CsvError> {
    let values = record.values();
    if values.len() != expected {
        return Err(CsvError::InvalidInput(format!(
            "record declares {} field(s) but returned {} value(s)",
            expected,
            values.len()
        )));
    }
    Ok(values)
}

/// Field descriptors plus one row of values per record, aligned by index.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    pub fields: Vec<FieldDescriptor>,
    pub rows: Vec<Vec<FieldValue>>,
}

#[cfg(test)]
mod tests {
    use crate::core::record::{FieldDescriptor, FieldKind, FieldValue, Record};

    use super::{IntoRecords, Records};

    #[derive(Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    crate::impl_record!(Point { x: i32, y: i32 });

    struct Broken;

    impl Record for Broken {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::new("a", FieldKind::Text),
                FieldDescriptor::new("b", FieldKind::Text),
            ]
        }

        fn values(&self) -> Vec<FieldValue> {
            vec![FieldValue::Text("only one".to_string())]
        }
    }

    #[test]
    fn single_record_should_yield_one_row() {
        let point = Point { x: 1, y: 2 };
        let table = (&point).into_records().to_table().unwrap();

        assert_eq!(table.fields.len(), 2);
        assert_eq!(
            table.rows,
            vec![vec![FieldValue::Integer(1), FieldValue::Integer(2)]]
        );
    }

    #[test]
    fn collection_should_keep_item_order() {
        let points = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
        let table = (&points).into_records().to_table().unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], FieldValue::Integer(3));
    }

    #[test]
    fn empty_collection_should_still_have_fields() {
        let points: Vec<Point> = Vec::new();
        let records = (&points).into_records();

        assert!(records.is_empty());
        let table = records.to_table().unwrap();
        assert_eq!(table.fields[0].name(), "x");
        assert_eq!(table.fields[1].name(), "y");
        assert!(table.rows.is_empty());
    }

    #[test]
    fn array_should_convert_to_many() {
        let points = [Point { x: 0, y: 0 }];
        assert_eq!((&points).into_records().len(), 1);
    }

    #[test]
    fn value_count_mismatch_should_be_invalid_input() {
        let result = Records::One(&Broken).to_table();

        assert!(matches!(result, Err(crate::CsvError::InvalidInput(_))));
    }
}
