use itertools::Itertools;
use reduced_precision::{
    reseed_thread_context, Equation, Fixed32, Fixed32SR, Float32SR, Integrator, Scalar,
};
use std::time::Instant;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

const SIGMA: f64 = 10.0;
const RHO: f64 = 28.0;
const BETA: f64 = 8.0 / 3.0;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "lorenz",
    about = "Integrates the Lorenz system with RK4 and compares formats against f64"
)]
struct Opt {
    #[structopt(short = "e", long, default_value = "20.0")]
    end: f64,

    #[structopt(short = "t", long, default_value = "0.001")]
    step: f64,

    #[structopt(short = "s", long)]
    seed: Option<u64>,

    /// Distance to the f64 trajectory regarded as diverged
    #[structopt(short = "d", long, default_value = "1.0")]
    divergence: f64,
}

fn lorenz<T: Scalar>() -> Vec<Equation<T>> {
    vec![
        Box::new(|x: &[T], _t: f64| (x[1] - x[0]).mul_f64(SIGMA)),
        Box::new(|x: &[T], _t: f64| x[0] * (T::from_f64(RHO) - x[2]) - x[1]),
        Box::new(|x: &[T], _t: f64| x[0] * x[1] - x[2].mul_f64(BETA)),
    ]
}

fn solve<T: Scalar>(opt: &Opt) -> reduced_precision::Result<Vec<Vec<f64>>> {
    let mut integrator = Integrator::<T>::new(lorenz(), 0.0, opt.end, opt.step)?;
    integrator.set_initial(vec![T::from_f64(1.0); 3])?;

    Ok(integrator
        .solve()?
        .into_iter()
        .map(|state| state.into_iter().map(T::to_f64).collect_vec())
        .collect_vec())
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip_eq(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn report<T: Scalar>(name: &str, opt: &Opt, reference: &[Vec<f64>]) -> reduced_precision::Result<()> {
    let start = Instant::now();
    let trajectory = solve::<T>(opt)?;
    let elapsed = start.elapsed().as_secs_f64() * 1000.0;

    let distances = trajectory
        .iter()
        .zip_eq(reference)
        .map(|(a, b)| distance(a, b))
        .collect_vec();

    // trajectory index 0 is the initial state, index k + 1 follows time point k
    let diverged_at = distances
        .iter()
        .position(|&d| d > opt.divergence)
        .map_or_else(|| "never".to_string(), |i| format!("{:.3}", i as f64 * opt.step));

    println!(
        "{:<10} {:<14} {:>12.4e} {:>12.4e} {:>10} {:>10.1} ms",
        name,
        T::FORMAT.to_string(),
        distances.iter().copied().fold(0.0, f64::max),
        distances.last().copied().unwrap_or_default(),
        diverged_at,
        elapsed
    );

    Ok(())
}

fn main() -> reduced_precision::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opt = Opt::from_args();
    if let Some(seed) = opt.seed {
        reseed_thread_context(seed);
    }

    let reference = solve::<f64>(&opt)?;
    if let Some(last) = reference.last() {
        println!("f64 state at t = {}: {:.6?}", opt.end, last);
    }

    println!(
        "{:<10} {:<14} {:>12} {:>12} {:>10} {:>13}",
        "type", "format", "max dist.", "final dist.", "diverged", "runtime"
    );
    report::<f32>("f32", &opt, &reference)?;
    report::<Fixed32>("Fixed32", &opt, &reference)?;
    report::<Fixed32SR>("Fixed32SR", &opt, &reference)?;
    report::<Float32SR>("Float32SR", &opt, &reference)?;

    Ok(())
}
