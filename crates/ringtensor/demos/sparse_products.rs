//! Sparse products in both storage formats.
//!
//! Run with: `RUST_LOG=debug cargo run -p ringtensor --example sparse_products`

use anyhow::Result;
use ringtensor::prelude::*;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(filter)
        .init();
    Ok(())
}

/// Tridiagonal `n x n` matrix with 2 on the diagonal and -1 beside it.
fn laplacian(n: usize) -> Result<CooMatrix<f64>> {
    let mut rows = Vec::with_capacity(3 * n);
    let mut cols = Vec::with_capacity(3 * n);
    let mut values = Vec::with_capacity(3 * n);
    for i in 0..n {
        if i > 0 {
            rows.push(i);
            cols.push(i - 1);
            values.push(-1.0);
        }
        rows.push(i);
        cols.push(i);
        values.push(2.0);
        if i + 1 < n {
            rows.push(i);
            cols.push(i + 1);
            values.push(-1.0);
        }
    }
    Ok(CooMatrix::new(rows, cols, values, n, n)?)
}

fn main() -> Result<()> {
    init_tracing()?;

    let n = 2_000;
    let coo = laplacian(n)?;
    let csr = coo.to_csr();
    println!(
        "laplacian {}: nnz = {}, sparsity = {:.5}",
        csr.shape(),
        csr.nnz(),
        csr.sparsity()
    );

    // L^2 is pentadiagonal
    let squared = csr.mult_to_sparse(&csr)?;
    println!("L^2 nnz = {}, trace = {}", squared.nnz(), squared.trace()?);

    let ones = DenseTensor::ones(&[n])?;
    let y = csr.matvec_dense(&ones)?;
    println!("L * 1 = [{}, {}, ..., {}]", y.data()[0], y.data()[1], y.data()[n - 1]);

    // Force the concurrent path for the coordinate product.
    let cfg = ComputeConfig::new().sparse_concurrent_threshold(0);
    let small = laplacian(6)?;
    let product = small.matmul_with(&small, &cfg)?;
    println!("6x6 L^2 first row: {:?}", &product.data()[..6]);

    let sum = small.add(&small.transpose())?;
    println!("L + L^T stays sorted: {}", sum.is_sorted());
    Ok(())
}
