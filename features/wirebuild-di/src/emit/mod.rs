use wirebuild_config::OutputTarget;

use crate::plan::{ConstructionStep, HookStep};

pub mod source;

/// A sink turning a [`BuildPlan`](crate::plan::BuildPlan) into some artifact.
///
/// Steps arrive in plan order: every construction step, then every hook step.
/// The resolver never depends on what the emitter does with them.
pub trait PlanEmitter {
    type Output;
    type Error;

    /// Called once before any step
    fn begin(&mut self, target: &OutputTarget) -> Result<(), Self::Error> {
        let _ = target;
        Ok(())
    }

    fn construct(&mut self, step: &ConstructionStep) -> Result<(), Self::Error>;

    fn invoke(&mut self, step: &HookStep) -> Result<(), Self::Error>;

    /// Called once after the last step
    fn finish(self) -> Result<Self::Output, Self::Error>;
}
