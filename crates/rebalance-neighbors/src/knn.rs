use rebalance_core::{squared_distance, Matrix, RebalanceError, RebalanceResult};

/// A neighbour: Euclidean distance and row index into the fitted matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f64,
    pub index: usize,
}

/// Brute-force k-nearest-neighbour index over the rows of a matrix.
#[derive(Debug, Clone, Default)]
pub struct NearestNeighbors {
    points: Option<Matrix>,
}

impl NearestNeighbors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &Matrix) -> RebalanceResult<()> {
        if x.is_empty() {
            return Err(RebalanceError::EmptyInput("nearest neighbours on zero points".into()));
        }
        self.points = Some(x.clone());
        Ok(())
    }

    pub fn n_points(&self) -> usize {
        self.points.as_ref().map_or(0, Matrix::rows)
    }

    /// The `k` fitted points closest to `query`, nearest first; ties break
    /// on the smaller index. `exclude` skips one fitted row, which is how a
    /// point asks for its neighbours without finding itself.
    pub fn kneighbors(
        &self,
        query: &[f64],
        k: usize,
        exclude: Option<usize>,
    ) -> RebalanceResult<Vec<Neighbor>> {
        let points = self
            .points
            .as_ref()
            .ok_or(RebalanceError::NotFitted("NearestNeighbors"))?;
        if query.len() != points.cols() {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![points.cols()],
                got: vec![query.len()],
            });
        }
        let candidates = points.rows() - usize::from(exclude.map_or(false, |e| e < points.rows()));
        if k == 0 || k > candidates {
            return Err(RebalanceError::InvalidParameter(format!(
                "asked for {k} neighbours among {candidates} candidates"
            )));
        }

        let mut dists: Vec<(f64, usize)> = points
            .iter_rows()
            .enumerate()
            .filter(|(j, _)| Some(*j) != exclude)
            .map(|(j, row)| (squared_distance(query, row), j))
            .collect();

        // nearest first, ties by index
        dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        dists.truncate(k);

        Ok(dists
            .into_iter()
            .map(|(d, index)| Neighbor {
                distance: d.sqrt(),
                index,
            })
            .collect())
    }

    /// Nearest other point for every fitted row.
    pub fn nearest_of_each(&self) -> RebalanceResult<Vec<usize>> {
        let points = self
            .points
            .as_ref()
            .ok_or(RebalanceError::NotFitted("NearestNeighbors"))?;
        (0..points.rows())
            .map(|i| Ok(self.kneighbors(points.row(i), 1, Some(i))?[0].index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Matrix {
        Matrix::from_rows(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0], vec![7.0, 0.0]]).unwrap()
    }

    #[test]
    fn test_kneighbors_sorted() {
        let mut nn = NearestNeighbors::new();
        nn.fit(&line()).unwrap();
        let found = nn.kneighbors(&[2.9, 0.0], 2, None).unwrap();
        assert_eq!(found[0].index, 2);
        assert_eq!(found[1].index, 1);
        assert!((found[0].distance - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_exclude_self() {
        let mut nn = NearestNeighbors::new();
        nn.fit(&line()).unwrap();
        let found = nn.kneighbors(&[1.0, 0.0], 1, Some(1)).unwrap();
        assert_eq!(found[0].index, 0);
        assert_eq!(nn.nearest_of_each().unwrap(), vec![1, 0, 1, 2]);
    }

    #[test]
    fn test_too_many_neighbours_or_unfitted() {
        let nn = NearestNeighbors::new();
        assert!(matches!(
            nn.kneighbors(&[0.0, 0.0], 1, None),
            Err(RebalanceError::NotFitted(_))
        ));
        let mut nn = NearestNeighbors::new();
        nn.fit(&line()).unwrap();
        assert!(nn.kneighbors(&[0.0, 0.0], 4, Some(0)).is_err());
        assert!(nn.kneighbors(&[0.0], 1, None).is_err());
    }
}
