// ABOUTME: CLI commands for employee records, leave requests and timesheets
// ABOUTME: Requires a session; talks to the employee management service

use clap::Subcommand;
use colored::*;
use worksphere_api::{format_duration, TimesheetEntry};
use worksphere_cli::output::{cell, table};
use worksphere_cli::Portal;

use super::require_session;

const HRMS_PAGE: &str = "/dashboard/hrms";

#[derive(Subcommand)]
pub enum EmployeesCommands {
    /// List all employees
    List,
    /// Show one employee
    Get {
        /// Employee ID
        id: String,
    },
    /// Show an employee's leave requests
    Leaves {
        /// Employee ID
        id: String,
    },
    /// Submit a timesheet entry
    Timesheet {
        /// Employee ID
        id: String,
        /// Work date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Clock-in time (HH:MM)
        #[arg(long)]
        clock_in: String,
        /// Clock-out time (HH:MM); earlier than clock-in means the next day
        #[arg(long)]
        clock_out: String,
    },
}

impl EmployeesCommands {
    pub async fn execute(&self, portal: &Portal) -> anyhow::Result<()> {
        require_session(portal, HRMS_PAGE).await;
        let service = portal.employees();

        match self {
            EmployeesCommands::List => {
                let employees = service.list().await?;
                if employees.is_empty() {
                    println!("{}", "No employees found".yellow());
                    return Ok(());
                }

                let mut table = table(vec!["ID", "Name", "Email", "Job Title", "Department", "Status"]);
                for employee in &employees {
                    table.add_row(vec![
                        employee.employee_id.clone(),
                        employee.employee.name.clone(),
                        employee.employee.email.clone(),
                        employee.employee.job_title.clone(),
                        cell(employee.employee.department.as_deref()),
                        employee.employee.job_status.clone(),
                    ]);
                }
                println!("{table}");
                println!("{} employee(s)", employees.len().to_string().bold());
            }
            EmployeesCommands::Get { id } => {
                let found = service.get(id).await?;
                let employee = &found.employee;

                println!("{}", employee.name.bold().cyan());
                println!("  {} {}", "ID:".bold(), found.employee_id);
                println!("  {} {}", "Username:".bold(), employee.username);
                println!("  {} {}", "Email:".bold(), employee.email);
                println!("  {} {}", "Phone:".bold(), employee.phone);
                println!("  {} {}", "Role:".bold(), employee.role);
                println!("  {} {}", "Job title:".bold(), employee.job_title);
                println!("  {} {}", "Job type:".bold(), employee.job_type);
                println!("  {} {}", "Status:".bold(), employee.job_status);
                println!("  {} {}", "Department:".bold(), cell(employee.department.as_deref()));
                println!("  {} {}", "Project:".bold(), cell(employee.project.as_deref()));
            }
            EmployeesCommands::Leaves { id } => {
                let leaves = service.leave_requests(id).await?;
                if leaves.is_empty() {
                    println!("{}", "No leave requests".yellow());
                    return Ok(());
                }

                let mut table = table(vec!["ID", "Type", "From", "To", "Days", "Status", "Reason"]);
                for leave in &leaves {
                    table.add_row(vec![
                        leave.id.to_string(),
                        leave.request.leave_type.clone(),
                        leave.request.start_date.clone(),
                        leave.request.end_date.clone(),
                        leave
                            .request
                            .total_days
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        format!("{:?}", leave.status).to_lowercase(),
                        leave.request.reason.clone(),
                    ]);
                }
                println!("{table}");
            }
            EmployeesCommands::Timesheet {
                id,
                date,
                clock_in,
                clock_out,
            } => {
                let entry = TimesheetEntry::new(date, clock_in, clock_out)?;
                let saved = service.submit_timesheet(id, &entry).await?;
                println!(
                    "{} Timesheet for {} recorded: {} ({} h)",
                    "✓".green().bold(),
                    saved.work_date,
                    format_duration(&saved.clock_in, &saved.clock_out),
                    saved.total_hours
                );
            }
        }
        Ok(())
    }
}
