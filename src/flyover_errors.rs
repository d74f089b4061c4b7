use thiserror::Error;

/// Errors produced by the prediction core.
///
/// "No pass found" and "always/never visible" are **not** errors: they are normal
/// terminal outcomes of a search, reported through
/// [`PassEvent`](crate::pass::PassEvent) flags.
#[derive(Error, Debug)]
pub enum FlyoverError {
    #[error("malformed element set: bad {field} on line {line}: {value:?}")]
    MalformedElementSet {
        line: u8,
        field: &'static str,
        value: String,
    },

    #[error("degenerate element set: {0}")]
    DegenerateElements(String),

    #[error(
        "Kepler solver failed to converge after {iterations} iterations \
         (e = {eccentricity}, M = {mean_anomaly} rad)"
    )]
    PropagationDegenerate {
        eccentricity: f64,
        mean_anomaly: f64,
        iterations: usize,
    },

    #[error("element set for {name} is {age_days:.2} days past epoch (limit {limit_days:.2})")]
    StaleElements {
        name: String,
        age_days: f64,
        limit_days: f64,
    },

    #[error("system clock unavailable: {0}")]
    SystemClock(#[from] hifitime::HifitimeError),
}

impl PartialEq for FlyoverError {
    fn eq(&self, other: &Self) -> bool {
        use FlyoverError::*;
        match (self, other) {
            (
                MalformedElementSet { line, field, value },
                MalformedElementSet {
                    line: l,
                    field: f,
                    value: v,
                },
            ) => line == l && field == f && value == v,
            (DegenerateElements(a), DegenerateElements(b)) => a == b,
            (PropagationDegenerate { .. }, PropagationDegenerate { .. }) => true,
            (StaleElements { name, .. }, StaleElements { name: n, .. }) => name == n,
            (SystemClock(_), SystemClock(_)) => true,
            _ => false,
        }
    }
}
