// ─────────────────────────────────────────────────────────────────────
// Dynauth — Adaptive RK4(5) Integrator
// ─────────────────────────────────────────────────────────────────────
//! Dormand–Prince 5(4) explicit Runge–Kutta with embedded error
//! estimate and PI-free step-size control.
//!
//! Integrates over a fixed interval `[t0, t1]` and reports only the end
//! value; intermediate substeps are not observable. The sequence of
//! floating-point operations depends only on the inputs, so repeated
//! calls are bit-identical.

use dynauth_types::{AuthError, AuthResult, SolverTolerance};

const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
];

/// Fifth-order weights.
const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

/// Difference between the fifth- and fourth-order weights (7 stages, FSAL).
const E: [f64; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Outcome of one fixed-interval integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integration<const N: usize> {
    pub y: [f64; N],
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

/// Dormand–Prince RK4(5) integrator.
#[derive(Debug, Clone, Copy)]
pub struct Dopri5 {
    rtol: f64,
    atol: f64,
    max_steps: usize,
}

impl Default for Dopri5 {
    fn default() -> Self {
        Self::new(&SolverTolerance::default())
    }
}

impl Dopri5 {
    pub fn new(tol: &SolverTolerance) -> Self {
        Self {
            rtol: tol.rtol,
            atol: tol.atol,
            max_steps: tol.max_steps,
        }
    }

    /// Integrate `dy/dt = f(t, y)` from `t0` to `t1` starting at `y0`.
    pub fn integrate<const N: usize, F>(
        &self,
        mut f: F,
        t0: f64,
        t1: f64,
        y0: [f64; N],
    ) -> AuthResult<Integration<N>>
    where
        F: FnMut(f64, &[f64; N]) -> [f64; N],
    {
        if !y0.iter().all(|v| v.is_finite()) {
            return Err(AuthError::Numerical(
                "initial state contains NaN or Inf".to_string(),
            ));
        }
        if t0.is_nan() || t1.is_nan() || t1 <= t0 {
            return Err(AuthError::Validation(format!(
                "integration interval must be increasing, got [{t0}, {t1}]"
            )));
        }

        let mut t = t0;
        let mut y = y0;
        let mut k0 = f(t, &y);
        check_finite(&k0, "derivative")?;
        let mut h = self.initial_step(&mut f, t0, &y0, &k0, t1 - t0);

        let mut accepted = 0usize;
        let mut rejected = 0usize;
        let mut last_rejected = false;

        while t < t1 {
            if accepted + rejected >= self.max_steps {
                return Err(AuthError::Numerical(format!(
                    "integrator exceeded {} substeps at t={t}",
                    self.max_steps
                )));
            }

            let min_step = 10.0 * f64::EPSILON * t.abs().max(t1.abs());
            if h < min_step {
                return Err(AuthError::Numerical(format!(
                    "step size underflow at t={t} (h={h:e})"
                )));
            }

            let mut t_new = t + h;
            if t_new >= t1 {
                t_new = t1;
            }
            let step = t_new - t;

            let (y_new, k_last, err) = self.stage(&mut f, t, &y, &k0, step);

            let error_norm = rms(&err, |i| {
                self.atol + y[i].abs().max(y_new[i].abs()) * self.rtol
            });

            if error_norm.is_nan() || !y_new.iter().all(|v| v.is_finite()) {
                // Shrink and retry; a persistent blow-up ends in underflow.
                h = step * MIN_FACTOR;
                rejected += 1;
                last_rejected = true;
                continue;
            }

            if error_norm < 1.0 {
                let mut factor = if error_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * error_norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
                };
                if last_rejected {
                    factor = factor.min(1.0);
                }
                h = step * factor;
                t = t_new;
                y = y_new;
                k0 = k_last;
                accepted += 1;
                last_rejected = false;
            } else {
                h = step * (SAFETY * error_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR);
                rejected += 1;
                last_rejected = true;
            }
        }

        Ok(Integration {
            y,
            accepted_steps: accepted,
            rejected_steps: rejected,
        })
    }

    /// One Dormand–Prince step: returns (y_new, f(t+h, y_new), error vector).
    fn stage<const N: usize, F>(
        &self,
        f: &mut F,
        t: f64,
        y: &[f64; N],
        k0: &[f64; N],
        h: f64,
    ) -> ([f64; N], [f64; N], [f64; N])
    where
        F: FnMut(f64, &[f64; N]) -> [f64; N],
    {
        let mut k = [[0.0; N]; 7];
        k[0] = *k0;
        for s in 1..6 {
            let mut ys = *y;
            for (i, yi) in ys.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (j, kj) in k.iter().enumerate().take(s) {
                    acc += A[s][j] * kj[i];
                }
                *yi += h * acc;
            }
            k[s] = f(t + C[s] * h, &ys);
        }

        let mut y_new = *y;
        for (i, yi) in y_new.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (j, kj) in k.iter().enumerate().take(6) {
                acc += B[j] * kj[i];
            }
            *yi += h * acc;
        }
        k[6] = f(t + h, &y_new);

        let mut err = [0.0; N];
        for (i, e) in err.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (j, kj) in k.iter().enumerate() {
                acc += E[j] * kj[i];
            }
            *e = h * acc;
        }
        (y_new, k[6], err)
    }

    /// Initial step heuristic (Hairer, Nørsett & Wanner, II.4).
    fn initial_step<const N: usize, F>(
        &self,
        f: &mut F,
        t0: f64,
        y0: &[f64; N],
        f0: &[f64; N],
        interval: f64,
    ) -> f64
    where
        F: FnMut(f64, &[f64; N]) -> [f64; N],
    {
        let scale = |i: usize| self.atol + y0[i].abs() * self.rtol;
        let d0 = rms(y0, scale);
        let d1 = rms(f0, scale);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        let mut y1 = *y0;
        for (i, v) in y1.iter_mut().enumerate() {
            *v += h0 * f0[i];
        }
        let f1 = f(t0 + h0, &y1);
        let mut diff = [0.0; N];
        for (i, d) in diff.iter_mut().enumerate() {
            *d = f1[i] - f0[i];
        }
        let d2 = rms(&diff, scale) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };
        let h = (100.0 * h0).min(h1).min(interval);
        if h.is_finite() && h > 0.0 {
            h
        } else {
            interval
        }
    }
}

/// Root-mean-square of `v[i] / scale(i)`.
fn rms<const N: usize>(v: &[f64; N], scale: impl Fn(usize) -> f64) -> f64 {
    if N == 0 {
        return 0.0;
    }
    let sum: f64 = v
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let s = x / scale(i);
            s * s
        })
        .sum();
    (sum / N as f64).sqrt()
}

fn check_finite<const N: usize>(v: &[f64; N], what: &str) -> AuthResult<()> {
    if v.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(AuthError::Numerical(format!("{what} contains NaN or Inf")))
    }
}
