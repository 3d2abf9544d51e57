//! Session, user resolution and route authorization.

mod gate;
mod resolver;
mod role;
mod session;

pub use gate::{authorize, Decision, Gate, GateOutcome, GateState, Navigation};
pub use resolver::{ResolveError, UserResolver, UserSource};
pub use role::{RequiredRoles, Role};
pub use session::{FileSession, MemorySession, SessionStore};
