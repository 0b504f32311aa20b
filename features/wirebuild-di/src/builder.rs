use crate::{
    descriptor::{ComponentDescriptor, ScannedComponent},
    errors::{ConstructorSelectionError, ResolveError},
    hooks::HookDescriptor,
    plan::BuildPlan,
    resolver::Resolver,
};

/// Collects the scan results of one compilation unit and turns them into a [`BuildPlan`].
///
/// Components and hooks keep the order they were added in, which is the scan
/// order the resolver works on.
pub struct PlanBuilder {
    resolver: Resolver,
    /// Components in scan order
    pub(crate) components: Vec<ComponentDescriptor>,
    /// Init hooks in declaration order
    pub(crate) hooks: Vec<HookDescriptor>,
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanBuilder {
    pub fn new() -> Self {
        PlanBuilder {
            resolver: Resolver::new(),
            components: Vec::new(),
            hooks: Vec::new(),
        }
    }
}

impl PlanBuilder {
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn add_component(mut self, component: ComponentDescriptor) -> Self {
        self.components.push(component);
        self
    }

    /// Normalizes and adds a scanned component, inaccessible ones are dropped
    pub fn add_scanned(
        mut self,
        scanned: ScannedComponent,
    ) -> Result<Self, ConstructorSelectionError> {
        if let Some(component) = ComponentDescriptor::from_scanned(scanned)? {
            self.components.push(component);
        }
        Ok(self)
    }

    pub fn add_hook(mut self, hook: HookDescriptor) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn build(self) -> Result<BuildPlan, ResolveError> {
        tracing::debug!(
            "Building plan from {} components and {} init hooks",
            self.components.len(),
            self.hooks.len()
        );
        self.resolver.resolve(&self.components, &self.hooks)
    }
}
