//! Assertion macros for engine results.
//!
//! - [`crate::assert_contains_error!`] - Assert error message contains pattern
//! - [`crate::assert_tier!`] - Assert an assessment's tier outcome

/// Assert that a Result is Err and its message contains a pattern.
///
/// ```rust
/// use maude_risk::assert_contains_error;
///
/// let result: Result<(), String> = Err("window size must be positive".into());
/// assert_contains_error!(result, "window size");
/// ```
#[macro_export]
macro_rules! assert_contains_error {
    ($result:expr, $pattern:expr) => {
        match $result {
            Ok(_) => panic!(
                "Expected Err containing '{}', got Ok\n  at {}:{}",
                $pattern,
                file!(),
                line!()
            ),
            Err(e) => {
                let message = e.to_string();
                assert!(
                    message.contains($pattern),
                    "Error '{}' does not contain '{}'\n  at {}:{}",
                    message,
                    $pattern,
                    file!(),
                    line!()
                );
            }
        }
    };
}

/// Assert the tier outcome of a `RiskAssessment`.
///
/// `indeterminate` checks for an indeterminate tier; any other token is a
/// `RiskTier` variant name.
#[macro_export]
macro_rules! assert_tier {
    ($assessment:expr, indeterminate) => {
        assert_eq!(
            $assessment.tier,
            $crate::scoring::TierOutcome::Indeterminate,
            "expected an indeterminate tier, score {} with {} indeterminate indicators",
            $assessment.score,
            $assessment.indeterminate.len()
        )
    };
    ($assessment:expr, $tier:ident) => {
        assert_eq!(
            $assessment.tier,
            $crate::scoring::TierOutcome::Assessed($crate::scoring::RiskTier::$tier),
            "unexpected tier for score {}",
            $assessment.score
        )
    };
}
