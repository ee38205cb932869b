//! First-success-wins walk over the attempts for an action.

use aihotkeys_core::ActionId;

use crate::attempt::{ActionContext, Attempt};
use crate::profile::SiteProfile;
use crate::registry::ActionRegistry;

/// Where an attempt came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptSource {
    Profile,
    Generic,
}

/// How a single attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Succeeded,
    Failed,
    /// The attempt raised; counted as a failure
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub label: String,
    pub source: AttemptSource,
    pub result: AttemptResult,
}

/// Every attempt that ran for one action, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: ActionId,
    pub outcomes: Vec<AttemptOutcome>,
}

impl Resolution {
    /// Whether some attempt succeeded; it is always the last one run
    pub fn handled(&self) -> bool {
        self.outcomes.last().is_some_and(|outcome| outcome.result == AttemptResult::Succeeded)
    }

    /// The winning attempt
    pub fn winner(&self) -> Option<&AttemptOutcome> {
        self.outcomes.last().filter(|outcome| outcome.result == AttemptResult::Succeeded)
    }
}

/// Run profile attempts then generic attempts until one succeeds
pub fn resolve(action: ActionId, profile: Option<&SiteProfile>, generic: &ActionRegistry, ctx: &ActionContext<'_>) -> bool {
    resolve_traced(action, profile, generic, ctx).handled()
}

/// Like [`resolve`], recording every attempt that ran
pub fn resolve_traced(
    action: ActionId, profile: Option<&SiteProfile>, generic: &ActionRegistry, ctx: &ActionContext<'_>,
) -> Resolution {
    let profile_attempts = profile.map(|profile| profile.registry().attempts(action)).unwrap_or_default();
    let attempts = profile_attempts
        .iter()
        .map(|attempt| (AttemptSource::Profile, attempt))
        .chain(generic.attempts(action).iter().map(|attempt| (AttemptSource::Generic, attempt)));

    let mut outcomes = Vec::new();
    for (source, attempt) in attempts {
        let result = run_attempt(action, attempt, ctx);
        let succeeded = result == AttemptResult::Succeeded;
        outcomes.push(AttemptOutcome { label: attempt.label().to_string(), source, result });

        if succeeded {
            tracing::debug!(
                action = %action,
                profile = profile.map(SiteProfile::name),
                attempt = attempt.label(),
                "ran handler"
            );
            return Resolution { action, outcomes };
        }
    }

    tracing::debug!(action = %action, profile = profile.map(SiteProfile::name), "no handler matched");
    Resolution { action, outcomes }
}

fn run_attempt(action: ActionId, attempt: &Attempt, ctx: &ActionContext<'_>) -> AttemptResult {
    match attempt.run(ctx) {
        Ok(true) => AttemptResult::Succeeded,
        Ok(false) => AttemptResult::Failed,
        Err(err) => {
            tracing::warn!(action = %action, attempt = attempt.label(), %err, "handler failed");
            AttemptResult::Errored(err.to_string())
        }
    }
}
