pub mod buffer_ring;
pub mod commands;
pub mod dispatch;
pub mod frame_loop;
pub mod input;
pub mod params;
pub mod reset;
pub mod types;

pub use buffer_ring::{BufferRing, InitTargets, Role, Slot, UpdateBindings};
pub use commands::{FramePlan, GpuCommand};
pub use dispatch::{DispatchPlanner, WorkSize, direct_work_count};
pub use frame_loop::{FrameError, FrameLoop, LoopState};
pub use input::{EditOutcome, ParamEdit, apply_edits};
pub use params::{InitialShape, ParameterSet, ParamsUniform, ScalarParam, initialize_params};
pub use reset::{ResetCause, ResetController, ResetDecision};
pub use types::Capabilities;
