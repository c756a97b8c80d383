// ABOUTME: CLI commands for the asset inventory
// ABOUTME: Requires a session; talks to the asset management service

use clap::Subcommand;
use colored::*;
use worksphere_api::{Asset, AssetFilter};
use worksphere_cli::output::{cell, table};
use worksphere_cli::Portal;

use super::require_session;

const ASSETS_PAGE: &str = "/dashboard/assets";

#[derive(Subcommand)]
pub enum AssetsCommands {
    /// List assets
    List {
        /// Only assets with this status (e.g. available, allocated)
        #[arg(long)]
        status: Option<String>,
        /// Only assets of this type (e.g. laptop, monitor)
        #[arg(long = "type")]
        asset_type: Option<String>,
    },
    /// Show one asset
    Get {
        /// Asset ID
        id: String,
    },
    /// List the assets held by an employee
    Mine {
        /// Employee ID
        employee_id: String,
    },
}

impl AssetsCommands {
    pub async fn execute(&self, portal: &Portal) -> anyhow::Result<()> {
        require_session(portal, ASSETS_PAGE).await;
        let service = portal.assets();

        match self {
            AssetsCommands::List { status, asset_type } => {
                let filter = AssetFilter {
                    status: status.clone(),
                    asset_type: asset_type.clone(),
                };
                print_assets(&service.list(&filter).await?);
            }
            AssetsCommands::Get { id } => {
                let asset = service.get(id).await?;

                println!("{}", asset.name.bold().cyan());
                println!("  {} {}", "Code:".bold(), asset.asset_code);
                println!("  {} {}", "Type:".bold(), asset.asset_type);
                println!("  {} {}", "Serial:".bold(), asset.serial_number);
                println!("  {} {}", "Status:".bold(), asset.status);
                println!("  {} {}", "Active:".bold(), asset.is_active);
                println!("  {} {}", "Purchased:".bold(), cell(asset.purchase_date.as_deref()));
                if let Some(price) = asset.purchase_price {
                    println!("  {} {:.2}", "Price:".bold(), price);
                }
                println!("  {} {}", "Notes:".bold(), cell(asset.notes.as_deref()));
            }
            AssetsCommands::Mine { employee_id } => {
                print_assets(&service.for_employee(employee_id).await?);
            }
        }
        Ok(())
    }
}

fn print_assets(assets: &[Asset]) {
    if assets.is_empty() {
        println!("{}", "No assets found".yellow());
        return;
    }

    let mut table = table(vec!["ID", "Code", "Name", "Type", "Status", "Allocated"]);
    for asset in assets {
        table.add_row(vec![
            asset
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            asset.asset_code.clone(),
            asset.name.clone(),
            asset.asset_type.clone(),
            asset.status.clone(),
            cell(asset.allocation_date.as_deref()),
        ]);
    }
    println!("{table}");
    println!("{} asset(s)", assets.len().to_string().bold());
}
