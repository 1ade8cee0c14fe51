//! Out-of-process solver sessions for blade load mapping
//!
//! XFOIL and XROTOR are driven through command files in a scoped
//! [`session::SolverSession`] and implement the panel-method and
//! vortex-method capabilities of `blade_loads`. [`apdl::ApdlScript`]
//! records loads and layups as APDL commands.

pub mod apdl;
pub mod config;
pub mod error;
pub mod fixed_width;
pub mod session;
pub mod xfoil;
pub mod xrotor;

pub use apdl::ApdlScript;
pub use config::{PropellerConfig, SolverConfig};
pub use error::{SessionError, SessionResult};
pub use session::SolverSession;
pub use xfoil::Xfoil;
pub use xrotor::Xrotor;
