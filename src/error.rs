//! Error types shared by the chain driver and the capabilities it consumes.
//!
//! Three outcomes are kept apart on purpose: a successful evaluation, a
//! candidate outside the target's support ([`Unsupported`], which is a normal
//! rejection and never leaves [`MetropolisHastings::step`](crate::metropolis_hastings::MetropolisHastings::step)),
//! and an operational failure ([`GenerationFailure`], surfaced as [`StepError`]).

use thiserror::Error;

/// Returned by a [`Target`](crate::distributions::Target) when the density is
/// exactly zero at the evaluated point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("sample lies outside the support of the target density")]
pub struct Unsupported;

/// A [`Proposal`](crate::distributions::Proposal) could not produce a sample.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// The proposal was built from invalid distribution parameters.
    #[error("invalid proposal distribution: {0}")]
    InvalidDistribution(String),
    /// The proposal's own sampling produced a non-finite value.
    #[error("numerical failure while generating a sample: {0}")]
    Numerical(String),
    /// Any other failure reported by a user-supplied proposal.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl From<rand_distr::NormalError> for GenerationFailure {
    fn from(err: rand_distr::NormalError) -> Self {
        GenerationFailure::InvalidDistribution(err.to_string())
    }
}

/// Failure of a single [`step`](crate::metropolis_hastings::MetropolisHastings::step).
///
/// Every variant is recoverable: the chain is left exactly as it was before the
/// call and the caller may simply step again.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("proposal failed to produce an initial sample")]
    InitialSample(#[source] GenerationFailure),
    #[error("initial sample lies outside the support of the target density")]
    UnsupportedInitialSample,
    #[error("proposal failed to produce a candidate sample")]
    Candidate(#[source] GenerationFailure),
}

impl StepError {
    /// Whether the chain is still uninitialized after this error.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            StepError::InitialSample(_) | StepError::UnsupportedInitialSample
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn initialization_errors_are_classified() {
        let init = StepError::InitialSample(GenerationFailure::Numerical("nan".into()));
        assert!(init.is_initialization());
        assert!(StepError::UnsupportedInitialSample.is_initialization());
        let cand = StepError::Candidate(GenerationFailure::Numerical("nan".into()));
        assert!(!cand.is_initialization());
    }

    #[test]
    fn source_is_chained() {
        let err = StepError::Candidate(GenerationFailure::Numerical("overflow".into()));
        let source = err.source().expect("candidate error should carry a source");
        assert_eq!(
            source.to_string(),
            "numerical failure while generating a sample: overflow"
        );
    }

    #[test]
    fn normal_error_converts() {
        let err = rand_distr::Normal::new(0.0, f64::INFINITY).unwrap_err();
        let failure: GenerationFailure = err.into();
        assert!(matches!(failure, GenerationFailure::InvalidDistribution(_)));
    }
}
