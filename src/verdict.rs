//! Outcome of one test case.

use crate::error_handling::Failure;

/// Pass, or the reason the test case failed.
#[derive(Debug)]
pub enum Verdict {
    /// Every requirement held
    Pass,
    /// The first failure met
    Fail(Failure),
}

impl Verdict {
    /// True for [`Verdict::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Failure message, `None` on pass.
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(failure) => Some(failure.to_string()),
        }
    }
}

impl<E: Into<Failure>> From<Result<(), E>> for Verdict {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Verdict::Pass,
            Err(e) => Verdict::Fail(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::AssertionFailure;

    #[test]
    fn test_from_result() {
        let pass: Verdict = Ok::<(), Failure>(()).into();
        assert!(pass.is_pass());
        assert_eq!(pass.reason(), None);

        let fail: Verdict = Err::<(), _>(AssertionFailure::Status {
            expected: 200,
            observed: 404,
        })
        .into();
        assert!(!fail.is_pass());
        assert_eq!(
            fail.reason().as_deref(),
            Some("Expected status code 200, got 404")
        );
    }
}
