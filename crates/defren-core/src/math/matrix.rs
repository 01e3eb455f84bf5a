// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provides a double precision 4x4 matrix used for projection math.

use std::ops::{Index, IndexMut, Mul};

/// A 4x4 column-major matrix with `f64` components.
///
/// Projection matrices are derived in double precision and only narrowed to
/// `f32` with [`DMat4::to_f32_cols`] when uploaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DMat4 {
    /// The columns of the matrix. `cols[c][r]` is the element at row `r`, column `c`.
    pub cols: [[f64; 4]; 4],
}

impl DMat4 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// A matrix with every element set to zero.
    pub const ZERO: Self = Self {
        cols: [[0.0; 4]; 4],
    };

    /// Returns the element at `row`, `col` (both zero based).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    /// Sets the element at `row`, `col` (both zero based).
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cols[col][row] = value;
    }

    /// Multiplies the homogeneous point `(x, y, z, 1)` by this matrix.
    pub fn transform_point(&self, x: f64, y: f64, z: f64) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = self.get(row, 0) * x + self.get(row, 1) * y + self.get(row, 2) * z + self.get(row, 3);
        }
        out
    }

    /// Narrows the matrix to `f32` columns, ready for a uniform buffer.
    pub fn to_f32_cols(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (dst, src) in out.iter_mut().zip(self.cols.iter()) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = *s as f32;
            }
        }
        out
    }
}

impl Default for DMat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<usize> for DMat4 {
    type Output = [f64; 4];
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.cols[index]
    }
}

impl IndexMut<usize> for DMat4 {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.cols[index]
    }
}

impl Mul for DMat4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        let mut out = Self::ZERO;
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.get(row, k) * rhs.get(k, col);
                }
                out.set(row, col, sum);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_are_row_col() {
        let mut m = DMat4::ZERO;
        m.set(2, 3, 7.0);
        assert_eq!(m.get(2, 3), 7.0);
        assert_eq!(m.cols[3][2], 7.0);
    }

    #[test]
    fn identity_is_neutral() {
        let mut m = DMat4::IDENTITY;
        m.set(0, 3, 5.0);
        assert_eq!(m * DMat4::IDENTITY, m);
        assert_eq!(m.transform_point(1.0, 2.0, 3.0), [6.0, 2.0, 3.0, 1.0]);
    }
}
