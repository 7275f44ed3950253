//! Browser-session core: credential storage, identity resolution, the shared
//! auth state and the access decision for protected views.

pub mod auth_state;
pub mod context;
pub mod events;
pub mod guard;
pub mod resolver;
pub mod token_store;

pub use auth_state::{AuthSnapshot, AuthState, SessionStatus};
pub use context::{AuthSession, CurrentUser};
pub use events::{SessionEvent, SessionEvents};
pub use guard::{AccessRequirement, GuardDecision};
pub use resolver::SessionResolver;
pub use token_store::{MemoryTokenStore, SessionTokenStore, TokenStore, TokenStoreError};
