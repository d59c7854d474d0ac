//! Dense row-major matrices and the algebra the network is built from.
//!
//! Every operation returns a fresh `DenseMatrix`; nothing here mutates its
//! receiver. Arithmetic is plain `f64` with no overflow or NaN guarding, so
//! NaN and infinity propagate silently through every operation.

use std::fmt;
use std::ops::Index;

use ndarray::prelude::*;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::error::{Error, Result};

/// Elementwise maps over at least this many elements run on the rayon pool.
const PARALLEL_MAP_THRESHOLD: usize = 1 << 14;

/// Number of rows and columns of a matrix. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixShape {
    rows: usize,
    columns: usize,
}

impl MatrixShape {
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(Error::EmptyMatrix);
        }
        Ok(MatrixShape { rows, columns })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total number of elements, `rows * columns`.
    pub fn len(&self) -> usize {
        self.rows * self.columns
    }

    pub fn transposed(&self) -> Self {
        MatrixShape {
            rows: self.columns,
            columns: self.rows,
        }
    }

    /// Shape of a single row vector of length `columns`. Only used to report
    /// mismatched vectors, so `columns` may be zero here.
    pub(crate) fn row_vector(columns: usize) -> Self {
        MatrixShape { rows: 1, columns }
    }
}

impl fmt::Display for MatrixShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

/// A matrix of `f64` stored as one contiguous row-major buffer.
///
/// Element `(r, c)` lives at flat index `r * columns + c`. Each matrix owns
/// its buffer exclusively.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    /// Invariant: standard (C) layout and no zero-length axis.
    data: Array2<f64>,
}

impl DenseMatrix {
    /// Builds a matrix from a flat row-major buffer.
    pub fn new(data: Vec<f64>, shape: MatrixShape) -> Result<Self> {
        let got = data.len();
        if got != shape.len() {
            return Err(Error::DataLength { shape, got });
        }
        let data = Array2::from_shape_vec((shape.rows, shape.columns), data)
            .map_err(|_| Error::DataLength { shape, got })?;
        Ok(DenseMatrix { data })
    }

    /// Builds a matrix from a list of equally long rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let columns = rows.first().map_or(0, |r| r.as_ref().len());
        let shape = MatrixShape::new(rows.len(), columns)?;
        let mut data = Vec::with_capacity(shape.len());
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != columns {
                return Err(Error::RaggedRows {
                    row: i,
                    expected: columns,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        DenseMatrix::new(data, shape)
    }

    pub fn filled(shape: MatrixShape, value: f64) -> Self {
        DenseMatrix {
            data: Array2::from_elem((shape.rows, shape.columns), value),
        }
    }

    pub fn zeros(shape: MatrixShape) -> Self {
        Self::filled(shape, 0.0)
    }

    pub fn ones(shape: MatrixShape) -> Self {
        Self::filled(shape, 1.0)
    }

    /// The `n`x`n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        MatrixShape::new(n, n)?;
        Ok(DenseMatrix {
            data: Array2::eye(n),
        })
    }

    /// A matrix with every element drawn uniformly from `[low, high]`.
    ///
    /// *Panics* if `low > high`.
    pub fn random(shape: MatrixShape, low: f64, high: f64) -> Self {
        Self::random_using(shape, low, high, &mut rand::thread_rng())
    }

    /// Like [`DenseMatrix::random`], drawing from the given generator.
    pub fn random_using<R: Rng + ?Sized>(
        shape: MatrixShape,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Self {
        DenseMatrix {
            data: Array2::random_using(
                (shape.rows, shape.columns),
                Uniform::new_inclusive(low, high),
                rng,
            ),
        }
    }

    /// Wraps the result of an ndarray computation, restoring row-major layout
    /// when the computation produced something else.
    fn wrap(data: Array2<f64>) -> Self {
        if data.is_standard_layout() {
            DenseMatrix { data }
        } else {
            DenseMatrix {
                data: data.as_standard_layout().into_owned(),
            }
        }
    }

    pub fn shape(&self) -> MatrixShape {
        let (rows, columns) = self.data.dim();
        MatrixShape { rows, columns }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn columns(&self) -> usize {
        self.data.ncols()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.data.get((row, column)).copied()
    }

    /// Row `row` as a view, or `None` if it is out of range.
    pub fn row(&self, row: usize) -> Option<ArrayView1<'_, f64>> {
        (row < self.rows()).then(|| self.data.row(row))
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// The flat row-major buffer.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// The row-major 2-D view as nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.outer_iter().map(|row| row.to_vec()).collect()
    }

    /// Applies `f` to every element. Large matrices are mapped in parallel.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        if self.data.len() >= PARALLEL_MAP_THRESHOLD {
            let mut data = self.data.clone();
            data.par_mapv_inplace(f);
            DenseMatrix { data }
        } else {
            DenseMatrix {
                data: self.data.mapv(f),
            }
        }
    }

    pub fn transpose(&self) -> Self {
        DenseMatrix {
            data: self.data.t().as_standard_layout().into_owned(),
        }
    }

    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    /// Elementwise natural exponential.
    pub fn exp(&self) -> Self {
        self.map(f64::exp)
    }

    pub fn add_scalar(&self, value: f64) -> Self {
        self.map(|x| x + value)
    }

    pub fn scale(&self, factor: f64) -> Self {
        self.map(|x| x * factor)
    }

    /// Adds `row` to every row of the matrix.
    pub fn add_row(&self, row: &[f64]) -> Result<Self> {
        if row.len() != self.columns() {
            return Err(Error::mismatch(
                "add_row",
                self.shape(),
                MatrixShape::row_vector(row.len()),
            ));
        }
        Ok(Self::wrap(&self.data + &ArrayView1::from(row)))
    }

    fn check_same_shape(&self, op: &'static str, other: &DenseMatrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::mismatch(op, self.shape(), other.shape()));
        }
        Ok(())
    }

    pub fn add(&self, other: &DenseMatrix) -> Result<Self> {
        self.check_same_shape("add", other)?;
        Ok(Self::wrap(&self.data + &other.data))
    }

    pub fn subtract(&self, other: &DenseMatrix) -> Result<Self> {
        self.check_same_shape("subtract", other)?;
        Ok(Self::wrap(&self.data - &other.data))
    }

    /// Hadamard product.
    pub fn multiply_elementwise(&self, other: &DenseMatrix) -> Result<Self> {
        self.check_same_shape("multiply_elementwise", other)?;
        Ok(Self::wrap(&self.data * &other.data))
    }

    /// Matrix product `a . b`, of shape `a.rows x b.columns`.
    pub fn matmul(a: &DenseMatrix, b: &DenseMatrix) -> Result<Self> {
        if a.columns() != b.rows() {
            return Err(Error::mismatch("matmul", a.shape(), b.shape()));
        }
        Ok(Self::wrap(a.data.dot(&b.data)))
    }

    /// Method form of [`DenseMatrix::matmul`].
    pub fn dot(&self, other: &DenseMatrix) -> Result<Self> {
        Self::matmul(self, other)
    }

    /// Sum of each column, i.e. the rows folded together by addition.
    pub fn sum_rows(&self) -> Vec<f64> {
        self.data.sum_axis(Axis(0)).to_vec()
    }

    /// Splits the matrix into consecutive blocks of `chunk_size` rows. The
    /// last block holds whatever rows remain.
    pub fn split_rows(&self, chunk_size: usize) -> Result<Vec<DenseMatrix>> {
        if chunk_size == 0 {
            return Err(Error::ZeroBatchSize);
        }
        Ok(self
            .data
            .axis_chunks_iter(Axis(0), chunk_size)
            .map(|chunk| Self::wrap(chunk.to_owned()))
            .collect())
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[index]
    }
}
