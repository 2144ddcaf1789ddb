//! Dense matrix kernels used by the convolution and fully connected layers.
//!
//! Both kernels are row-major and overwrite their output (`beta = 0`). With the
//! `blas` feature they dispatch to CBLAS; otherwise portable loop kernels are
//! used.

#[cfg(feature = "blas")]
extern crate blas_src;

/// General matrix multiply: `c = a × b`.
///
/// # Arguments
///
/// * `m` - Rows of `a` and `c`
/// * `n` - Columns of `b` and `c`
/// * `k` - Columns of `a` / rows of `b`
/// * `a` - Row-major `m × k` matrix
/// * `b` - Row-major `k × n` matrix
/// * `c` - Row-major `m × n` output, fully overwritten
///
/// # Panics
///
/// Panics if any slice is shorter than its stated shape.
pub fn sgemm(m: usize, n: usize, k: usize, a: &[f32], b: &[f32], c: &mut [f32]) {
    assert!(a.len() >= m * k, "sgemm: lhs holds {} values, needs {}", a.len(), m * k);
    assert!(b.len() >= k * n, "sgemm: rhs holds {} values, needs {}", b.len(), k * n);
    assert!(c.len() >= m * n, "sgemm: output holds {} values, needs {}", c.len(), m * n);

    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        c[..m * n].fill(0.0);
        return;
    }

    #[cfg(feature = "blas")]
    {
        use cblas::{Layout, Transpose};

        unsafe {
            cblas::sgemm(
                Layout::RowMajor,
                Transpose::None,
                Transpose::None,
                m as i32,
                n as i32,
                k as i32,
                1.0,
                a,
                k as i32,
                b,
                n as i32,
                0.0,
                c,
                n as i32,
            );
        }
    }

    #[cfg(not(feature = "blas"))]
    {
        // i-p-j order keeps the inner loop on contiguous rows of `b` and `c`.
        for (a_row, c_row) in a.chunks_exact(k).zip(c.chunks_exact_mut(n)).take(m) {
            c_row.fill(0.0);
            for (&a_ip, b_row) in a_row.iter().zip(b.chunks_exact(n)) {
                for (out, &b_pj) in c_row.iter_mut().zip(b_row) {
                    *out += a_ip * b_pj;
                }
            }
        }
    }
}

/// Matrix-vector multiply: `y = a × x`.
///
/// `a` is a row-major `rows × cols` matrix, `x` has `cols` entries and the
/// first `rows` entries of `y` are overwritten.
pub fn sgemv(rows: usize, cols: usize, a: &[f32], x: &[f32], y: &mut [f32]) {
    assert!(a.len() >= rows * cols, "sgemv: matrix holds {} values, needs {}", a.len(), rows * cols);
    assert!(x.len() >= cols, "sgemv: vector holds {} values, needs {}", x.len(), cols);
    assert!(y.len() >= rows, "sgemv: output holds {} values, needs {}", y.len(), rows);

    if rows == 0 {
        return;
    }
    if cols == 0 {
        y[..rows].fill(0.0);
        return;
    }

    #[cfg(feature = "blas")]
    {
        use cblas::{Layout, Transpose};

        unsafe {
            cblas::sgemv(
                Layout::RowMajor,
                Transpose::None,
                rows as i32,
                cols as i32,
                1.0,
                a,
                cols as i32,
                x,
                1,
                0.0,
                y,
                1,
            );
        }
    }

    #[cfg(not(feature = "blas"))]
    {
        let x = &x[..cols];
        for (out, row) in y.iter_mut().zip(a.chunks_exact(cols)).take(rows) {
            let mut sum = 0.0f32;
            for (&w, &v) in row.iter().zip(x) {
                sum += w * v;
            }
            *out = sum;
        }
    }
}
