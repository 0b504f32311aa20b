use std::{
    any::type_name,
    collections::HashMap,
    fmt::{self, Debug},
    sync::Arc,
};

use wirebuild_config::OutputTarget;

use crate::{
    emit::PlanEmitter,
    errors::{AssembleError, RequireError},
    plan::{ConstructionStep, HookArgument, HookStep},
    registry::{Injection, ProducerHandle},
    types::{DynError, Injectable, Instance},
};

/// All components constructed for one application run
#[derive(Clone)]
pub struct ApplicationContext(Arc<[Instance]>);

impl Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|instance| instance.type_name))
            .finish()
    }
}

impl ApplicationContext {
    pub(crate) fn new(components: Vec<Instance>) -> Self {
        Self(components.into())
    }

    /// The first constructed component of type `T`
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        self.0
            .iter()
            .find_map(|instance| instance.downcast::<T>().ok())
            .ok_or(RequireError::TypeMissing(type_name::<T>()))
    }

    /// Every constructed component of type `T`, in construction order
    pub fn components_of<T: Injectable>(&self) -> Vec<Arc<T>> {
        self.0
            .iter()
            .filter_map(|instance| instance.downcast::<T>().ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Values injected into a factory or hook, in parameter order
pub struct Injected<'a> {
    target: &'a str,
    instances: &'a [Instance],
}

impl Injected<'_> {
    /// The argument at `index`, downcast to `T`
    pub fn get<T: Injectable>(&self, index: usize) -> Result<Arc<T>, DynError> {
        let instance = self
            .instances
            .get(index)
            .ok_or_else(|| format!("'{}' has no argument {index}", self.target))?;

        instance.downcast::<T>().map_err(|actual| {
            format!(
                "Argument {index} of '{}' is a '{actual}', not a '{}'",
                self.target,
                type_name::<T>()
            )
            .into()
        })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Everything an init hook callback is invoked with
pub struct HookCall<'a> {
    owner: Option<&'a Instance>,
    pub context: &'a ApplicationContext,
    /// Injected parameters, context parameters excluded
    pub arguments: Injected<'a>,
}

impl HookCall<'_> {
    /// The instance a member hook is called on
    pub fn owner<T: Injectable>(&self) -> Result<Arc<T>, DynError> {
        let owner = self.owner.ok_or("Free init hooks have no owner")?;
        owner.downcast::<T>().map_err(|actual| {
            format!("Hook owner is a '{actual}', not a '{}'", type_name::<T>()).into()
        })
    }
}

type ComponentFactory = Box<dyn Fn(&Injected<'_>) -> Result<Instance, DynError>>;
type HookCallback = Box<dyn Fn(&HookCall<'_>) -> Result<(), DynError>>;

/// Value bound to a handle while assembling
enum Produced {
    Shared(Instance),
    /// A non-singleton, constructed again at every injection site
    Provider {
        component: String,
        arguments: Vec<Injection>,
    },
}

struct QueuedHook {
    hook: String,
    owner: Option<Instance>,
    arguments: Vec<Instance>,
}

/// Executes a [`BuildPlan`](crate::plan::BuildPlan) in process.
///
/// Factories are registered per component name and hook callbacks per hook
/// name. Init hooks run once every component has been constructed.
pub struct ContextAssembler {
    args: Vec<String>,
    factories: HashMap<String, ComponentFactory>,
    callbacks: HashMap<String, HookCallback>,
    produced: HashMap<ProducerHandle, Produced>,
    components: Vec<Instance>,
    queued: Vec<QueuedHook>,
}

impl ContextAssembler {
    pub fn new(args: Vec<String>) -> Self {
        ContextAssembler {
            args,
            factories: HashMap::new(),
            callbacks: HashMap::new(),
            produced: HashMap::new(),
            components: Vec::new(),
            queued: Vec::new(),
        }
    }

    /// Registers the factory of the component named `component`
    pub fn add_factory<T, F>(mut self, component: impl Into<String>, factory: F) -> Self
    where
        T: Injectable,
        F: Fn(&Injected<'_>) -> Result<T, DynError> + 'static,
    {
        self.factories.insert(
            component.into(),
            Box::new(move |arguments: &Injected<'_>| factory(arguments).map(Instance::new)),
        );
        self
    }

    /// Registers the callback of the init hook named `hook`
    pub fn add_hook<F>(mut self, hook: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&HookCall<'_>) -> Result<(), DynError> + 'static,
    {
        self.callbacks.insert(hook.into(), Box::new(callback));
        self
    }

    fn instance_for(&mut self, injection: Injection) -> Result<Instance, AssembleError> {
        let (component, arguments) = match (injection, self.produced.get(&injection.handle())) {
            (Injection::Shared(_), Some(Produced::Shared(instance))) => {
                return Ok(instance.clone())
            }
            (
                Injection::Provider(_),
                Some(Produced::Provider {
                    component,
                    arguments,
                }),
            ) => (component.clone(), arguments.clone()),
            _ => return Err(AssembleError::UnknownHandle(injection.handle())),
        };

        let arguments = self.instances_for(&arguments)?;
        let instance = self.call_factory(&component, &arguments)?;
        self.components.push(instance.clone());
        Ok(instance)
    }

    fn instances_for(&mut self, injections: &[Injection]) -> Result<Vec<Instance>, AssembleError> {
        injections
            .iter()
            .map(|injection| self.instance_for(*injection))
            .collect()
    }

    fn call_factory(
        &self,
        component: &str,
        arguments: &[Instance],
    ) -> Result<Instance, AssembleError> {
        let factory = self
            .factories
            .get(component)
            .ok_or_else(|| AssembleError::MissingFactory(component.to_string()))?;

        factory(&Injected {
            target: component,
            instances: arguments,
        })
        .map_err(|error| AssembleError::FactoryFailed {
            component: component.to_string(),
            error,
        })
    }
}

impl PlanEmitter for ContextAssembler {
    type Output = ApplicationContext;
    type Error = AssembleError;

    fn begin(&mut self, target: &OutputTarget) -> Result<(), Self::Error> {
        tracing::debug!("Assembling application context for {target}");
        let args = Instance::new(self.args.clone());
        self.components.push(args.clone());
        self.produced
            .insert(ProducerHandle::Args, Produced::Shared(args));
        Ok(())
    }

    fn construct(&mut self, step: &ConstructionStep) -> Result<(), Self::Error> {
        if !self.factories.contains_key(&step.component) {
            return Err(AssembleError::MissingFactory(step.component.clone()));
        }

        if step.non_singleton {
            tracing::debug!("Registered provider for {} as {}", step.component, step.handle);
            self.produced.insert(
                step.handle,
                Produced::Provider {
                    component: step.component.clone(),
                    arguments: step.arguments.clone(),
                },
            );
            return Ok(());
        }

        let arguments = self.instances_for(&step.arguments)?;
        let instance = self.call_factory(&step.component, &arguments)?;
        tracing::debug!("Constructed {} as {}", step.component, step.handle);

        self.components.push(instance.clone());
        self.produced.insert(step.handle, Produced::Shared(instance));
        Ok(())
    }

    fn invoke(&mut self, step: &HookStep) -> Result<(), Self::Error> {
        if !self.callbacks.contains_key(&step.hook) {
            return Err(AssembleError::MissingHook(step.hook.clone()));
        }

        let owner = step
            .owner
            .map(|handle| self.instance_for(Injection::Shared(handle)))
            .transpose()?;

        let injections: Vec<Injection> = step
            .arguments
            .iter()
            .filter_map(|argument| match argument {
                HookArgument::Context => None,
                HookArgument::Injected(injection) => Some(*injection),
            })
            .collect();
        let arguments = self.instances_for(&injections)?;

        self.queued.push(QueuedHook {
            hook: step.hook.clone(),
            owner,
            arguments,
        });
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, Self::Error> {
        let ContextAssembler {
            callbacks,
            components,
            queued,
            ..
        } = self;

        let context = ApplicationContext::new(components);
        tracing::info!("Assembled application context with {} components", context.len());

        for QueuedHook {
            hook,
            owner,
            arguments,
        } in queued
        {
            let callback = callbacks
                .get(&hook)
                .ok_or_else(|| AssembleError::MissingHook(hook.clone()))?;

            tracing::debug!("Running init hook {hook}");
            callback(&HookCall {
                owner: owner.as_ref(),
                context: &context,
                arguments: Injected {
                    target: &hook,
                    instances: &arguments,
                },
            })
            .map_err(|error| AssembleError::HookFailed {
                hook: hook.clone(),
                error,
            })?;
        }

        Ok(context)
    }
}
