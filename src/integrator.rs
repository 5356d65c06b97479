//! Fixed-step ODE integration over any [`Scalar`].
//!
//! Every intermediate quantity lives in `T`; the step size stays a double and
//! enters via [`Scalar::mul_f64`], so each scaled term is rounded once.

use crate::error::{Error, Result};
use crate::scalar::Scalar;

/// Right-hand side of one equation: `dx_i/dt = f(x, t)`.
pub type Equation<T> = Box<dyn Fn(&[T], f64) -> T + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    RungeKutta4,
    Euler,
}

pub struct Integrator<T: Scalar> {
    system: Vec<Equation<T>>,
    initial: Option<Vec<T>>,
    method: Method,
    start: f64,
    step: f64,
    steps: usize,
}

impl<T: Scalar> Integrator<T> {
    /// Classic fourth-order Runge-Kutta on `[start, end]`.
    pub fn new(system: Vec<Equation<T>>, start: f64, end: f64, step: f64) -> Result<Self> {
        Self::with_method(system, start, end, step, Method::RungeKutta4)
    }

    pub fn with_method(
        system: Vec<Equation<T>>,
        start: f64,
        end: f64,
        step: f64,
        method: Method,
    ) -> Result<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(Error::InvalidStep { step });
        }

        if !start.is_finite() || !end.is_finite() || end < start {
            return Err(Error::InvalidInterval { start, end });
        }

        // a span overflowing to infinity or a point count beyond usize is
        // rejected here instead of saturating in the cast below
        let last = ((end - start) / step).floor();
        if !(last < usize::MAX as f64) {
            return Err(Error::InvalidInterval { start, end });
        }
        let steps = (last as usize)
            .checked_add(1)
            .ok_or(Error::InvalidInterval { start, end })?;

        Ok(Self {
            system,
            initial: None,
            method,
            start,
            step,
            steps,
        })
    }

    pub fn dimension(&self) -> usize {
        self.system.len()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Number of time points visited by [`Integrator::solve`].
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn set_initial(&mut self, initial: Vec<T>) -> Result<()> {
        if initial.len() != self.system.len() {
            return Err(Error::DimensionMismatch {
                expected: self.system.len(),
                got: initial.len(),
            });
        }

        self.initial = Some(initial);
        Ok(())
    }

    /// Returns the trajectory: the initial state followed by the state after
    /// each time point `t_k = start + k * step <= end`.
    pub fn solve(&self) -> Result<Vec<Vec<T>>> {
        let initial = self.initial.as_ref().ok_or(Error::MissingInitialState)?;

        let steps = self.steps;
        tracing::debug!(
            dimension = self.dimension(),
            steps,
            method = ?self.method,
            format = %T::FORMAT,
            "solving"
        );

        let mut trajectory = vec![initial.clone()];

        let mut state = initial.clone();
        for k in 0..steps {
            let t = self.start + k as f64 * self.step;
            state = match self.method {
                Method::RungeKutta4 => self.runge_kutta_step(&state, t),
                Method::Euler => self.euler_step(&state, t),
            };
            trajectory.push(state.clone());
        }

        Ok(trajectory)
    }

    fn evaluate(&self, x: &[T], t: f64) -> Vec<T> {
        self.system.iter().map(|f| f(x, t)).collect()
    }

    /// `x + factor * k`, element-wise.
    fn shifted(x: &[T], k: &[T], factor: f64) -> Vec<T> {
        x.iter().zip(k).map(|(&x, &k)| x + k.mul_f64(factor)).collect()
    }

    fn euler_step(&self, x: &[T], t: f64) -> Vec<T> {
        let k = self.evaluate(x, t);
        Self::shifted(x, &k, self.step)
    }

    fn runge_kutta_step(&self, x: &[T], t: f64) -> Vec<T> {
        let h = self.step;

        let k1 = self.evaluate(x, t);
        let k2 = self.evaluate(&Self::shifted(x, &k1, h / 2.0), t + h / 2.0);
        let k3 = self.evaluate(&Self::shifted(x, &k2, h / 2.0), t + h / 2.0);
        let k4 = self.evaluate(&Self::shifted(x, &k3, h), t + h);

        (0..x.len())
            .map(|i| {
                let weighted = k1[i] + k2[i].mul_f64(2.0) + k3[i].mul_f64(2.0) + k4[i];
                x[i] + weighted.mul_f64(h / 6.0)
            })
            .collect()
    }
}
