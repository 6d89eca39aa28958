use log::info;

use crate::simulation::params::{InitialShape, ParameterSet, initialize_params};

/// Why the particle field gets reinitialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    Startup,
    ShapeChanged(InitialShape),
    ResetRequested,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResetDecision {
    pub params: ParameterSet,
    pub cause: Option<ResetCause>,
}

impl ResetDecision {
    pub fn should_reinitialize(&self) -> bool {
        self.cause.is_some()
    }
}

/// Decides between reinitializing the particle field and integrating it further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetController {
    last_shape: InitialShape,
}

impl ResetController {
    pub fn new(initial: &ParameterSet) -> Self {
        Self {
            last_shape: initial.initial_shape,
        }
    }

    pub fn last_shape(&self) -> InitialShape {
        self.last_shape
    }

    /// A shape change loads the full preset of the new shape; an explicit
    /// reset keeps the edited parameters. Both reinitialize the field.
    pub fn resolve(
        &mut self,
        edited: ParameterSet,
        selected_shape: InitialShape,
        reset_requested: bool,
    ) -> ResetDecision {
        let mut params = edited;
        let cause = if selected_shape != self.last_shape {
            initialize_params(selected_shape.index(), &mut params);
            info!(
                "Shape changed from {} to {}, loading its preset",
                self.last_shape.name(),
                selected_shape.name()
            );
            Some(ResetCause::ShapeChanged(selected_shape))
        } else if reset_requested {
            Some(ResetCause::ResetRequested)
        } else {
            None
        };

        self.last_shape = params.initial_shape;

        ResetDecision { params, cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_frame_does_not_reset() {
        let params = ParameterSet::default();
        let mut controller = ResetController::new(&params);
        let decision = controller.resolve(params, params.initial_shape, false);
        assert!(!decision.should_reinitialize());
        assert_eq!(decision.params, params);
    }

    #[test]
    fn shape_change_loads_whole_preset() {
        let mut params = ParameterSet::default();
        params.gravity = 0.3;
        params.base_seed = 7;
        let mut controller = ResetController::new(&params);

        let decision = controller.resolve(params, InitialShape::Box, false);
        assert_eq!(decision.cause, Some(ResetCause::ShapeChanged(InitialShape::Box)));
        assert_eq!(decision.params, ParameterSet::for_shape(InitialShape::Box));
        assert_eq!(controller.last_shape(), InitialShape::Box);
    }

    #[test]
    fn shape_change_fires_once() {
        let params = ParameterSet::default();
        let mut controller = ResetController::new(&params);

        let first = controller.resolve(params, InitialShape::Sphere, false);
        assert!(first.should_reinitialize());
        let second = controller.resolve(first.params, InitialShape::Sphere, false);
        assert!(!second.should_reinitialize());
    }

    #[test]
    fn explicit_reset_keeps_edits() {
        let mut params = ParameterSet::default();
        params.initial_speed = 5.0;
        params.dispatch_size = 8;
        let mut controller = ResetController::new(&params);

        let decision = controller.resolve(params, params.initial_shape, true);
        assert_eq!(decision.cause, Some(ResetCause::ResetRequested));
        assert_eq!(decision.params, params);
    }

    #[test]
    fn shape_change_wins_over_reset() {
        let params = ParameterSet::default();
        let mut controller = ResetController::new(&params);
        let decision = controller.resolve(params, InitialShape::Donut, true);
        assert_eq!(decision.cause, Some(ResetCause::ShapeChanged(InitialShape::Donut)));
        assert_eq!(decision.params, ParameterSet::for_shape(InitialShape::Donut));
    }
}
