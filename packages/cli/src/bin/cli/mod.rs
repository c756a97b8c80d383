pub mod assets;
pub mod auth;
pub mod employees;
pub mod tenants;

use std::process;

use colored::*;
use worksphere_auth::GuardDecision;
use worksphere_cli::Portal;

/// Gate a feature command behind the dashboard route it belongs to. Exits
/// after the guard's notice when there is no session.
pub async fn require_session(portal: &Portal, page: &str) {
    if let GuardDecision::Redirect(_) = portal.route_guard().guard(page).await {
        eprintln!(
            "  Run {} to sign in.",
            "worksphere login <tenant>".yellow()
        );
        process::exit(1);
    }
}
