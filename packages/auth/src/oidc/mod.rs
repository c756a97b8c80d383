// ABOUTME: Tenant login and OIDC redirect handshake
// ABOUTME: Identity service client, two-phase login saga and the localhost callback listener

pub mod identity;
pub mod login;
pub mod redirect;
pub mod server;
pub mod types;

pub use identity::IdentityClient;
pub use login::{normalize_tenant, Browser, LoginRedirect, SystemBrowser, TenantLogin};
pub use redirect::{HandshakeOutcome, HandshakeState, RedirectHandler, RedirectQuery};
pub use server::{CallbackRequest, CallbackServer};
pub use types::{AuthorizationExchangeResult, TenantValidationResult};
