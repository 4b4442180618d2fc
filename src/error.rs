use thiserror::Error;

/// Errors raised by the colony core. Construction-time validation failures
/// are isolated to the entity being built; `NotRegistered` signals a driver
/// bug and is never downgraded to a silent no-op.
#[derive(Debug, Error, PartialEq)]
pub enum ColonyError {
    #[error("{name} must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f32 },

    #[error("breed {breed} has no palette/extension-rate entry (table holds {known})")]
    UnknownBreed { breed: usize, known: usize },

    #[error("{kind} {id} is not registered in the colony")]
    NotRegistered { kind: &'static str, id: u64 },
}

/// Validate a probability parameter, naming the offender in the error.
pub(crate) fn probability(name: &'static str, value: f32) -> Result<f32, ColonyError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ColonyError::ProbabilityOutOfRange { name, value })
    }
}
