// ABOUTME: CLI commands for tenant login, logout, session status and page access checks
// ABOUTME: Runs the browser login through a localhost callback listener

use std::process;
use std::sync::Arc;

use colored::*;
use worksphere_auth::guard::LOGIN_PATH;
use worksphere_auth::{
    AuthError, AuthResult, Browser, CallbackServer, GuardDecision, SystemBrowser,
};
use worksphere_cli::Portal;

/// Prints the authorization URL for the user to open themselves.
struct PrintBrowser;

impl Browser for PrintBrowser {
    fn open(&self, url: &str) -> AuthResult<()> {
        println!();
        println!("Open this URL in your browser to continue:");
        println!("  {}", url.underline());
        println!();
        Ok(())
    }
}

pub async fn login_command(
    portal: &Portal,
    tenant: &str,
    force: bool,
    no_browser: bool,
) -> anyhow::Result<()> {
    let guard = portal.route_guard();
    if !force {
        if let GuardDecision::Redirect(_) = guard.enter_login().await {
            let current = portal.session().tenant_name().await?.unwrap_or_default();
            println!(
                "{} Already logged in to {}. Use {} to log in again.",
                "✓".green().bold(),
                current.bold(),
                "--force".yellow()
            );
            return Ok(());
        }
    }

    // Listen before the browser leaves, so the redirect cannot arrive first
    let server = CallbackServer::bind(portal.config().callback_port).await?;

    let browser: Arc<dyn Browser> = if no_browser {
        Arc::new(PrintBrowser)
    } else {
        Arc::new(SystemBrowser)
    };
    let login = portal.tenant_login(server.origin()).with_browser(browser);

    match login.login(tenant).await {
        Ok(_) => {}
        // Notice already shown with the URL; the listener still works
        Err(AuthError::BrowserOpen(_)) => {}
        Err(_) => process::exit(1),
    }

    println!(
        "{}",
        format!(
            "Waiting for the identity provider to redirect to {}...",
            server.redirect_url()
        )
        .dimmed()
    );

    let request = match server
        .accept_redirect_within(portal.config().callback_timeout)
        .await
    {
        Ok(request) => request,
        Err(e) => {
            portal.session().clear_pending_login().await?;
            return Err(e.into());
        }
    };

    let outcome = portal.redirect_handler().handle(request.query()).await;
    if let Err(e) = request.respond(&outcome).await {
        tracing::warn!("Browser did not receive the login result: {}", e);
    }

    if outcome.is_success() {
        Ok(())
    } else {
        process::exit(1);
    }
}

pub async fn logout_command(portal: &Portal) -> anyhow::Result<()> {
    let tenant = portal.session().tenant_name().await?;
    portal.session().logout().await?;

    match tenant {
        Some(tenant) => println!("{} Logged out of {}", "✓".green().bold(), tenant.bold()),
        None => println!("{} Logged out", "✓".green().bold()),
    }
    Ok(())
}

pub async fn status_command(portal: &Portal) -> anyhow::Result<()> {
    let session = portal.session();

    println!("{}", "WorkSphere Session".bold().cyan());
    println!();

    match session.current().await? {
        Some(current) => {
            println!("  {} {}", "Status:".bold(), "Logged in".green());
            println!(
                "  {} {}",
                "Tenant:".bold(),
                current.tenant_name.as_deref().unwrap_or("-")
            );
            println!(
                "  {} {}",
                "Refresh token:".bold(),
                if current.refresh_token.is_some() { "present" } else { "missing" }
            );
        }
        None => println!("  {} {}", "Status:".bold(), "Not logged in".red()),
    }

    if let Some(pending) = session.pending_login().await? {
        println!(
            "  {} {} (started {})",
            "Pending login:".bold(),
            pending.tenant_name,
            pending.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    println!(
        "  {} {}",
        "Session file:".bold(),
        portal.config().session_file.display()
    );
    Ok(())
}

pub async fn open_command(portal: &Portal, path: &str) -> anyhow::Result<()> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let guard = portal.route_guard();
    let decision = if path == LOGIN_PATH {
        guard.enter_login().await
    } else {
        guard.navigate(&path).await
    };

    match decision {
        GuardDecision::Allow => {
            println!("{} {}", "✓".green().bold(), path);
            Ok(())
        }
        GuardDecision::Redirect(nav) => {
            let from = nav
                .from
                .map(|from| format!(" (from {})", from))
                .unwrap_or_default();
            println!("{} {}{}", "→".cyan().bold(), nav.to, from);
            if nav.to == LOGIN_PATH {
                process::exit(1);
            }
            Ok(())
        }
    }
}
