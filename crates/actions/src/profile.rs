//! Site profiles and the matcher that picks the active one.

use aihotkeys_page::Location;

use crate::registry::ActionRegistry;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0}")]
    Other(String),
}

type Predicate = dyn Fn(&Location) -> Result<bool, ProfileError>;

/// A named site with its own attempt lists
pub struct SiteProfile {
    name: String,
    predicate: Box<Predicate>,
    registry: ActionRegistry,
}

impl std::fmt::Debug for SiteProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteProfile")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl SiteProfile {
    pub fn new<F>(name: impl Into<String>, predicate: F, registry: ActionRegistry) -> Self
    where
        F: Fn(&Location) -> Result<bool, ProfileError> + 'static,
    {
        Self { name: name.into(), predicate: Box::new(predicate), registry }
    }

    /// Profile that matches on hostname alone
    pub fn for_host<F>(name: impl Into<String>, host_matches: F, registry: ActionRegistry) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        Self::new(name, move |location| Ok(host_matches(&location.hostname)), registry)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn matches(&self, location: &Location) -> Result<bool, ProfileError> {
        (self.predicate)(location)
    }
}

/// `host` is `domain` or one of its subdomains
pub fn is_domain_or_subdomain(host: &str, domain: &str) -> bool {
    host == domain || host.strip_suffix(domain).is_some_and(|prefix| prefix.ends_with('.'))
}

/// Position of the first profile whose predicate holds
///
/// A predicate that errors is logged and counts as not matching.
pub fn match_profile_index(profiles: &[SiteProfile], location: &Location) -> Option<usize> {
    profiles.iter().position(|profile| match profile.matches(location) {
        Ok(matched) => matched,
        Err(err) => {
            tracing::warn!(profile = profile.name(), %err, "site matcher failed");
            false
        }
    })
}

/// First profile whose predicate holds for `location`
pub fn match_profile<'p>(profiles: &'p [SiteProfile], location: &Location) -> Option<&'p SiteProfile> {
    match_profile_index(profiles, location).map(|index| &profiles[index])
}

/// Remembers the last seen URL so repeated observations are cheap no-ops
#[derive(Debug, Clone, Default)]
pub struct LocationWatcher {
    last_href: String,
}

impl LocationWatcher {
    pub fn new(href: impl Into<String>) -> Self {
        Self { last_href: href.into() }
    }

    /// Record `href`; true when it differs from the previous one
    pub fn observe(&mut self, href: &str) -> bool {
        if self.last_href == href {
            return false;
        }
        self.last_href = href.to_string();
        true
    }

    pub fn last_href(&self) -> &str {
        &self.last_href
    }
}
