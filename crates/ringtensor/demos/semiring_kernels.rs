//! The same dense kernels over three different scalar structures.
//!
//! Run with: `RUST_LOG=ringtensor_kernels=debug cargo run -p ringtensor --example semiring_kernels`

use anyhow::Result;
use ringtensor::kernels::{matmul_with, select_matmul};
use ringtensor::prelude::*;
use scirs2_core::num_complex::Complex;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(filter)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing()?;

    // Reachability in a directed cycle of length 5 with boolean (or, and).
    let n = 5;
    let mut adj = DenseTensor::<bool>::zeros(&[n, n])?;
    for i in 0..n {
        adj.set(&[i, (i + 1) % n], true)?;
    }
    let mut walk = adj.clone();
    for step in 2..=n {
        walk = walk.matmul(&adj)?;
        let closed = (0..n).filter(|&i| matches!(walk.get(&[i, i]), Ok(&true))).count();
        info!(step, closed, "boolean walk");
    }

    // Rotation by 90 degrees as a complex scalar, applied four times.
    let i = Complex::new(0.0, 1.0);
    let zero = Complex::new(0.0, 0.0);
    let rot = DenseTensor::from_vec(vec![i, zero, zero, i], &[2, 2])?;
    let mut acc = DenseTensor::<Complex<f64>>::identity(2)?;
    for _ in 0..4 {
        acc = acc.matmul(&rot)?;
    }
    info!(result = ?acc.data(), "rot^4");

    // Integer products on each forced kernel.
    let a = DenseTensor::from_vec((0..64 * 48).map(|x| (x % 11) as i64 - 5).collect(), &[64, 48])?;
    let b = DenseTensor::from_vec((0..48 * 32).map(|x| (x % 7) as i64 - 3).collect(), &[48, 32])?;
    let auto = select_matmul(a.shape(), b.shape(), &ComputeConfig::default());
    info!(%auto, "default kernel choice");
    let reference = matmul_with(&a, &b, &ComputeConfig::sequential())?;
    for algorithm in MatMulAlgorithm::ALL {
        let cfg = ComputeConfig::new().block_size(16).force_matmul(algorithm);
        let same = matmul_with(&a, &b, &cfg)? == reference;
        info!(%algorithm, same, "forced kernel");
    }
    Ok(())
}
