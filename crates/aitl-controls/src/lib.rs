//! Supervised PID control loop primitives for AITL.
//!
//! The loop is built in three layers:
//! - **PID inner loop**: computes the control output from the tracking error
//! - **Supervisor**: a discrete state machine deciding the operating mode
//! - **Outer adaptation**: rescales PID gains while the supervisor allows it
//!
//! Two orchestrators compose the layers and share the [`SteppingController`]
//! capability:
//! - [`ErrorDrivenController`]: NORMAL/DISTURB/TUNE supervisor driven by error
//!   magnitude, with gain tuning in TUNE
//! - [`CommandDrivenController`]: IDLE/STARTUP/RUN/FAULT supervisor driven by
//!   external command flags, with the PID gated on the operating state
//!
//! Everything is single-threaded and caller-driven: one call to `tick` (or the
//! orchestrator's own `step`) is one simulation tick.

pub mod adaptive;
pub mod command;
pub mod command_driven;
pub mod error;
pub mod error_driven;
pub mod pid;
pub mod plant;
pub mod stepping;
pub mod supervisor;
pub mod tuning;

pub use adaptive::{AdaptContext, AdaptiveLayer, NoAdaptation};
pub use command::{Command, CommandFlags, CommandState, next_command_state};
pub use command_driven::CommandDrivenController;
pub use error::{ControlError, ControlResult};
pub use error_driven::ErrorDrivenController;
pub use pid::{Pid, PidGains};
pub use plant::{FirstOrderPlant, IntegratorPlant, Plant};
pub use stepping::{ControlState, SteppingController, Tick};
pub use supervisor::{Supervisor, SupervisorState, SupervisorThresholds, next_state};
pub use tuning::{GainTuner, RuleBasedTuner, TuningRates};
