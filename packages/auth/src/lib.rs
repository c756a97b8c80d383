// ABOUTME: WorkSphere authentication library
// ABOUTME: Tenant login, OIDC redirect handshake, session storage and route guarding

pub mod error;
pub mod guard;
pub mod notify;
pub mod oidc;
pub mod session;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use guard::{GuardDecision, Navigation, RouteGuard};
pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use oidc::{
    normalize_tenant, Browser, CallbackRequest, CallbackServer, HandshakeOutcome, HandshakeState,
    IdentityClient, LoginRedirect, RedirectHandler, RedirectQuery, SystemBrowser, TenantLogin,
};
pub use session::{
    FileSessionStore, MemorySessionStore, PendingLogin, Session, SessionChanged, SessionKey,
    SessionOp, SessionState, SessionStore,
};
