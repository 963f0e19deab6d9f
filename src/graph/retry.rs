//! Retry budgets for Graph calls.
//!
//! Every Graph call retries after renewing the access token. Calls differ only
//! in whether failed responses eventually give up:
//! - [`RetryBudget::Capped`] lookups raise the mapped error once the attempt
//!   limit is spent.
//! - [`RetryBudget::Unbounded`] calls loop until a success response arrives.
//!
//! Network errors never consume attempts; no delay is inserted between tries.
//!
//! # Example
//!
//! ```
//! use sharepoint_sync_core::graph::{RetryBudget, RetryDecision};
//!
//! let budget = RetryBudget::Capped(4);
//! assert_eq!(budget.after_failed_response(1), RetryDecision::Retry);
//! assert_eq!(budget.after_failed_response(4), RetryDecision::GiveUp);
//! assert_eq!(RetryBudget::Unbounded.after_failed_response(100), RetryDecision::Retry);
//! ```

use super::constants::LOOKUP_MAX_ATTEMPTS;

/// How many failed responses a call tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryBudget {
    /// Give up after this many failed responses (including the first attempt).
    Capped(u32),

    /// Never give up.
    Unbounded,
}

/// Outcome of consulting a [`RetryBudget`] after a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Renew the token and send the request again.
    Retry,

    /// Renew the token, then surface the mapped error.
    GiveUp,
}

impl RetryBudget {
    /// Budget used by site and drive lookups.
    #[must_use]
    pub const fn lookup() -> Self {
        Self::Capped(LOOKUP_MAX_ATTEMPTS)
    }

    /// Decides what follows failed response number `attempt` (1-indexed).
    #[must_use]
    pub fn after_failed_response(self, attempt: u32) -> RetryDecision {
        match self {
            Self::Capped(max_attempts) if attempt >= max_attempts.max(1) => RetryDecision::GiveUp,
            Self::Capped(_) | Self::Unbounded => RetryDecision::Retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_budget_allows_four_attempts() {
        let budget = RetryBudget::lookup();
        assert_eq!(budget, RetryBudget::Capped(4));
        for attempt in 1..4 {
            assert_eq!(budget.after_failed_response(attempt), RetryDecision::Retry);
        }
        assert_eq!(budget.after_failed_response(4), RetryDecision::GiveUp);
    }

    #[test]
    fn test_unbounded_budget_never_gives_up() {
        let budget = RetryBudget::Unbounded;
        assert_eq!(budget.after_failed_response(1), RetryDecision::Retry);
        assert_eq!(budget.after_failed_response(u32::MAX), RetryDecision::Retry);
    }

    #[test]
    fn test_zero_cap_behaves_like_single_attempt() {
        let budget = RetryBudget::Capped(0);
        assert_eq!(budget.after_failed_response(1), RetryDecision::GiveUp);
    }
}
