use rebalance_core::{Matrix, RebalanceError, RebalanceResult};

use std::collections::HashSet;

/// Values of one column. Missing numeric cells are NaN, missing
/// categorical cells are empty strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Categorical(Vec<String>),
    Numeric(Vec<f64>),
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<String>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Categorical(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// dtype name as the dataframe world spells it.
    pub fn dtype(&self) -> &'static str {
        match self.data {
            ColumnData::Categorical(_) => "object",
            ColumnData::Numeric(_) => "float64",
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Categorical(v) => Some(v),
            ColumnData::Numeric(_) => None,
        }
    }

    pub fn null_count(&self) -> usize {
        match &self.data {
            ColumnData::Categorical(v) => v.iter().filter(|s| s.is_empty()).count(),
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_nan()).count(),
        }
    }

    /// Cell rendered for display.
    pub fn display_value(&self, i: usize) -> String {
        match &self.data {
            ColumnData::Categorical(v) => v.get(i).cloned().unwrap_or_default(),
            ColumnData::Numeric(v) => v.get(i).map(|x| format!("{x}")).unwrap_or_default(),
        }
    }

    /// Cell values as strings, for counting categories of either kind.
    pub fn to_strings(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.display_value(i)).collect()
    }

    fn select(&self, indices: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }
}

/// Ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> RebalanceResult<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for c in &columns {
            if c.len() != n_rows {
                return Err(RebalanceError::ShapeMismatch {
                    expected: vec![n_rows],
                    got: vec![c.len()],
                });
            }
            if !seen.insert(c.name.as_str()) {
                return Err(RebalanceError::InvalidParameter(format!(
                    "duplicate column name {:?}",
                    c.name
                )));
            }
        }
        Ok(Frame { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> RebalanceResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| RebalanceError::MissingColumn(name.to_string()))
    }

    pub fn column(&self, name: &str) -> RebalanceResult<&Column> {
        Ok(&self.columns[self.position(name)?])
    }

    /// Swap a column's contents, keeping its position.
    pub fn replace_column(&mut self, column: Column) -> RebalanceResult<()> {
        if column.len() != self.n_rows {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![self.n_rows],
                got: vec![column.len()],
            });
        }
        let idx = self.position(&column.name)?;
        self.columns[idx] = column;
        Ok(())
    }

    pub fn select_rows(&self, indices: &[usize]) -> RebalanceResult<Frame> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(RebalanceError::IndexOutOfBounds {
                index: bad,
                axis: 0,
                size: self.n_rows,
            });
        }
        Ok(Frame {
            columns: self.columns.iter().map(|c| c.select(indices)).collect(),
            n_rows: indices.len(),
        })
    }

    pub fn head(&self, n: usize) -> Frame {
        let indices: Vec<usize> = (0..n.min(self.n_rows)).collect();
        Frame {
            columns: self.columns.iter().map(|c| c.select(&indices)).collect(),
            n_rows: indices.len(),
        }
    }

    /// Names of every column except `exclude`, in frame order.
    pub fn names_except(&self, exclude: &str) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.name != exclude)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Names of the numeric columns, in frame order.
    pub fn numeric_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Build a feature matrix from numeric columns.
    pub fn to_matrix(&self, names: &[String]) -> RebalanceResult<Matrix> {
        let mut cols = Vec::with_capacity(names.len());
        for name in names {
            let column = self.column(name)?;
            let values = column.as_numeric().ok_or_else(|| {
                RebalanceError::InvalidParameter(format!(
                    "column {name:?} is categorical; encode it before building features"
                ))
            })?;
            cols.push(values.to_vec());
        }
        if cols.is_empty() {
            return Err(RebalanceError::EmptyInput("no feature columns selected".into()));
        }
        Matrix::from_columns(&cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::new(vec![
            Column::categorical("Sex", vec!["M".into(), "F".into(), "".into()]),
            Column::numeric("Length", vec![0.5, 0.4, f64::NAN]),
            Column::categorical("Class", vec!["negative".into(), "positive".into(), "negative".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_frame_shape_and_lookup() {
        let f = sample();
        assert_eq!(f.shape(), (3, 3));
        assert_eq!(f.position("Length").unwrap(), 1);
        assert!(matches!(f.column("Nope"), Err(RebalanceError::MissingColumn(_))));
        assert_eq!(f.names_except("Class"), vec!["Sex", "Length"]);
        assert_eq!(f.numeric_names(), vec!["Length"]);
    }

    #[test]
    fn test_rejects_ragged_and_duplicate_columns() {
        assert!(Frame::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("b", vec![1.0, 2.0]),
        ])
        .is_err());
        assert!(Frame::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("a", vec![2.0]),
        ])
        .is_err());
    }

    #[test]
    fn test_null_counts() {
        let f = sample();
        assert_eq!(f.column("Sex").unwrap().null_count(), 1);
        assert_eq!(f.column("Length").unwrap().null_count(), 1);
        assert_eq!(f.column("Class").unwrap().null_count(), 0);
    }

    #[test]
    fn test_to_matrix_requires_numeric() {
        let f = sample();
        assert!(f.to_matrix(&["Sex".to_string()]).is_err());
        let m = f.to_matrix(&["Length".to_string()]).unwrap();
        assert_eq!(m.shape(), (3, 1));
    }

    #[test]
    fn test_select_rows_and_head() {
        let f = sample();
        let s = f.select_rows(&[2, 0]).unwrap();
        assert_eq!(s.column("Class").unwrap().display_value(1), "negative");
        assert_eq!(f.head(2).n_rows(), 2);
        assert_eq!(f.head(10).n_rows(), 3);
        assert!(f.select_rows(&[3]).is_err());
    }
}
