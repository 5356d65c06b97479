use itertools::Itertools;
use reduced_precision::{
    reseed_thread_context, BFloat16RN, BFloat16SR, Fixed16, Fixed16SR, Fixed32, Fixed32SR,
    Float32RN, Float32SR, HalfRN, HalfSR, Scalar,
};
use std::time::Instant;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "harmonic_sum",
    about = "Accumulates the harmonic series in every reduced-precision format"
)]
struct Opt {
    #[structopt(short = "n", long, default_value = "1000000")]
    terms: u64,

    #[structopt(short = "s", long)]
    seed: Option<u64>,
}

/// Sums `1/i` with one rounding per addition.
fn accumulate<T: Scalar>(terms: u64) -> f64 {
    (1..=terms)
        .fold(T::from_f64(0.0), |acc, i| T::from_f64(acc.to_f64() + 1.0 / i as f64))
        .to_f64()
}

fn report<T: Scalar>(name: &str, terms: u64, exact: f64) -> String {
    let start = Instant::now();
    let sum = accumulate::<T>(terms);
    format!(
        "{:<12} {:<14} {:>16.8} {:>14.3e} {:>10.1} ms",
        name,
        T::FORMAT.to_string(),
        sum,
        (sum - exact).abs(),
        start.elapsed().as_secs_f64() * 1000.0
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opt = Opt::from_args();
    if let Some(seed) = opt.seed {
        reseed_thread_context(seed);
    }

    let exact = accumulate::<f64>(opt.terms);
    println!("harmonic sum of {} terms: {:.12}", opt.terms, exact);

    let rows = [
        report::<f32>("f32", opt.terms, exact),
        report::<Fixed16>("Fixed16", opt.terms, exact),
        report::<Fixed16SR>("Fixed16SR", opt.terms, exact),
        report::<Fixed32>("Fixed32", opt.terms, exact),
        report::<Fixed32SR>("Fixed32SR", opt.terms, exact),
        report::<Float32RN>("Float32RN", opt.terms, exact),
        report::<Float32SR>("Float32SR", opt.terms, exact),
        report::<BFloat16RN>("BFloat16RN", opt.terms, exact),
        report::<BFloat16SR>("BFloat16SR", opt.terms, exact),
        report::<HalfRN>("HalfRN", opt.terms, exact),
        report::<HalfSR>("HalfSR", opt.terms, exact),
    ];

    println!(
        "{:<12} {:<14} {:>16} {:>14} {:>13}",
        "type", "format", "sum", "abs. error", "runtime"
    );
    println!("{}", rows.iter().join("\n"));
}
