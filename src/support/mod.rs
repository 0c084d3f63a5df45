//! Land-protection and alliance collaborators.
//!
//! Third-party plugins can veto block changes ("build support") or declare
//! two entities allies ("friendly support"). The engine only sees them as
//! predicates and combines installed providers as follows:
//!
//! - **Build**: every provider must allow it. No providers means allowed.
//! - **Friendly**: any provider saying yes makes the pair friendly. No
//!   providers means not friendly.

use crate::core::{EntityId, Location};

/// Veto over block changes at a location.
pub trait BuildSupport {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    fn can_build(&self, actor: EntityId, location: Location) -> bool;
}

/// Alliance check between two entities.
pub trait FriendlySupport {
    fn name(&self) -> &str;

    fn is_friendly(&self, a: EntityId, b: EntityId) -> bool;
}

/// Installed support providers.
#[derive(Default)]
pub struct SupportRegistry {
    build: Vec<Box<dyn BuildSupport>>,
    friendly: Vec<Box<dyn FriendlySupport>>,
}

impl SupportRegistry {
    /// No providers installed: everything buildable, nobody friendly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a build provider (builder pattern).
    #[must_use]
    pub fn with_build(mut self, provider: impl BuildSupport + 'static) -> Self {
        self.add_build(provider);
        self
    }

    /// Install a friendly provider (builder pattern).
    #[must_use]
    pub fn with_friendly(mut self, provider: impl FriendlySupport + 'static) -> Self {
        self.add_friendly(provider);
        self
    }

    pub fn add_build(&mut self, provider: impl BuildSupport + 'static) {
        tracing::info!(provider = provider.name(), "build support installed");
        self.build.push(Box::new(provider));
    }

    pub fn add_friendly(&mut self, provider: impl FriendlySupport + 'static) {
        tracing::info!(provider = provider.name(), "friendly support installed");
        self.friendly.push(Box::new(provider));
    }

    /// All installed providers allow building here.
    #[must_use]
    pub fn can_build(&self, actor: EntityId, location: Location) -> bool {
        self.build.iter().all(|p| p.can_build(actor, location))
    }

    /// Any installed provider considers the pair friendly.
    ///
    /// An entity is always friendly with itself.
    #[must_use]
    pub fn is_friendly(&self, a: EntityId, b: EntityId) -> bool {
        a == b || self.friendly.iter().any(|p| p.is_friendly(a, b))
    }

    #[must_use]
    pub fn build_providers(&self) -> usize {
        self.build.len()
    }

    #[must_use]
    pub fn friendly_providers(&self) -> usize {
        self.friendly.len()
    }
}

impl std::fmt::Debug for SupportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupportRegistry")
            .field("build", &self.build.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("friendly", &self.friendly.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Closure-backed build provider, handy for hosts and tests.
pub struct BuildFn<F> {
    name: String,
    check: F,
}

impl<F: Fn(EntityId, Location) -> bool> BuildFn<F> {
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F: Fn(EntityId, Location) -> bool> BuildSupport for BuildFn<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_build(&self, actor: EntityId, location: Location) -> bool {
        (self.check)(actor, location)
    }
}

/// Closure-backed friendly provider.
pub struct FriendlyFn<F> {
    name: String,
    check: F,
}

impl<F: Fn(EntityId, EntityId) -> bool> FriendlyFn<F> {
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F: Fn(EntityId, EntityId) -> bool> FriendlySupport for FriendlyFn<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_friendly(&self, a: EntityId, b: EntityId) -> bool {
        (self.check)(a, b)
    }
}
