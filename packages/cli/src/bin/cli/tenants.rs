// ABOUTME: CLI command for onboarding a new tenant organisation
// ABOUTME: Provisions through the tenant service, then drops any local session

use std::env;

use clap::Subcommand;
use colored::*;
use inquire::{Password, PasswordDisplayMode};
use worksphere_api::TenantCreationRequest;
use worksphere_cli::Portal;

/// Read instead of prompting when set, for scripted onboarding.
const ADMIN_PASSWORD_ENV: &str = "WORKSPHERE_ADMIN_PASSWORD";

#[derive(Subcommand)]
pub enum TenantsCommands {
    /// Create a tenant and its administrator account
    Create {
        /// Tenant name used at login (lower-case, no spaces)
        #[arg(long)]
        name: String,
        #[arg(long)]
        admin_username: String,
        #[arg(long)]
        admin_email: String,
        /// Registered company name
        #[arg(long)]
        company_name: String,
        #[arg(long)]
        industry: String,
        /// Head-count band, e.g. 1-10, 11-50, 51-200
        #[arg(long)]
        company_size: String,
        #[arg(long)]
        website: Option<String>,
    },
}

impl TenantsCommands {
    pub async fn execute(&self, portal: &Portal) -> anyhow::Result<()> {
        match self {
            TenantsCommands::Create {
                name,
                admin_username,
                admin_email,
                company_name,
                industry,
                company_size,
                website,
            } => {
                let admin_password = admin_password()?;
                let request = TenantCreationRequest {
                    name: name.trim().to_lowercase(),
                    admin_username: admin_username.clone(),
                    admin_password,
                    admin_email: admin_email.clone(),
                    company_full_name: company_name.clone(),
                    industry: industry.clone(),
                    company_size: company_size.clone(),
                    company_website: website.clone().filter(|w| !w.is_empty()),
                };

                println!("{}", format!("Creating tenant {}...", request.name).bold().cyan());
                let created = portal.tenants().create(&request).await?;

                // The new tenant's administrator starts from a clean session
                portal.session().clear_session().await?;

                println!(
                    "{} Tenant {} created (status: {})",
                    "✓".green().bold(),
                    created.name.bold(),
                    created.status
                );
                println!(
                    "  Log in with {}",
                    format!("worksphere login {}", created.name).yellow()
                );
            }
        }
        Ok(())
    }
}

fn admin_password() -> anyhow::Result<String> {
    if let Ok(password) = env::var(ADMIN_PASSWORD_ENV) {
        if !password.is_empty() {
            return Ok(password);
        }
    }

    let password = Password::new("Administrator password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Used to sign in as the tenant administrator")
        .prompt()?;
    Ok(password)
}
