use crate::parser::utils::BUFSIZE;

/// What to do with structural anomalies that only affect a single record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StrictnessPolicy {
    /// Log a warning and keep scanning. A line found where a header was
    /// expected is parsed as a header anyway, and quality bytes beyond the
    /// sequence length are dropped.
    Lenient,
    /// Return a (non-fatal) error for the offending record. Calling
    /// `next_record` again resumes the scan.
    Strict,
}

impl Default for StrictnessPolicy {
    fn default() -> Self {
        Self::Lenient
    }
}

/// Settings for a [`ScanSession`](crate::parser::ScanSession)
///
/// # Example:
///
/// ```
/// use fastx_index::parser::{ScanOptions, StrictnessPolicy};
///
/// let options = ScanOptions::default()
///     .with_capacity(1024)
///     .with_policy(StrictnessPolicy::Strict);
/// assert_eq!(options.initial_capacity(), 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    initial_capacity: usize,
    policy: StrictnessPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            initial_capacity: BUFSIZE,
            policy: StrictnessPolicy::default(),
        }
    }
}

impl ScanOptions {
    /// Sets the initial buffer capacity. The minimum allowed capacity is 3.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity >= 3);
        self.initial_capacity = capacity;
        self
    }

    pub fn with_policy(mut self, policy: StrictnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Starting size of the line buffer; it doubles whenever a line does not fit
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn policy(&self) -> StrictnessPolicy {
        self.policy
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ScanOptions::default();
        assert_eq!(options.initial_capacity(), BUFSIZE);
        assert_eq!(options.policy(), StrictnessPolicy::Lenient);
    }

    #[test]
    fn test_smallest_capacity() {
        let options = ScanOptions::default().with_capacity(3);
        assert_eq!(options.initial_capacity(), 3);
    }

    #[test]
    #[should_panic]
    fn test_capacity_below_minimum() {
        ScanOptions::default().with_capacity(2);
    }
}
