use crate::simulation::params::{InitialShape, ParameterSet, ScalarParam};
use crate::simulation::types::{MAX_DISPATCH_SIZE, MAX_SEED, MIN_DISPATCH_SIZE, MIN_SEED};

/// A single user interaction collected between two frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEdit {
    SelectShape(InitialShape),
    Reset,
    ToggleIndirect,
    AdjustDispatchSize(i32),
    SetSeed(i32),
    SetScalar(ScalarParam, f32),
    /// Moves a field by `steps` increments of [`ScalarParam::step`].
    AdjustScalar(ScalarParam, f32),
}

/// Result of folding a frame's edits into the parameter record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditOutcome {
    pub params: ParameterSet,
    /// Shape chosen in the UI; may differ from `params.initial_shape`.
    pub selected_shape: InitialShape,
    pub reset_requested: bool,
    pub indirect_toggled: bool,
}

/// Applies `edits` in order to a copy of `params`.
///
/// Scalar edits land in the returned record right away. The shape choice is
/// reported separately, the reset controller decides what it implies.
pub fn apply_edits(params: ParameterSet, edits: &[ParamEdit]) -> EditOutcome {
    let mut outcome = EditOutcome {
        params,
        selected_shape: params.initial_shape,
        reset_requested: false,
        indirect_toggled: false,
    };

    for edit in edits {
        match *edit {
            ParamEdit::SelectShape(shape) => outcome.selected_shape = shape,
            ParamEdit::Reset => outcome.reset_requested = true,
            ParamEdit::ToggleIndirect => outcome.indirect_toggled = !outcome.indirect_toggled,
            ParamEdit::AdjustDispatchSize(delta) => {
                outcome.params.dispatch_size = outcome
                    .params
                    .dispatch_size
                    .saturating_add(delta)
                    .clamp(MIN_DISPATCH_SIZE, MAX_DISPATCH_SIZE);
            }
            ParamEdit::SetSeed(seed) => {
                outcome.params.base_seed = seed.clamp(MIN_SEED, MAX_SEED);
            }
            ParamEdit::SetScalar(param, value) => {
                param.set(&mut outcome.params, value);
            }
            ParamEdit::AdjustScalar(param, steps) => {
                let value = param.get(&outcome.params) + steps * param.step();
                param.set(&mut outcome.params, value);
            }
        }
    }

    outcome
}
