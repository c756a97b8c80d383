// ABOUTME: Terminal rendering of notices and tables
// ABOUTME: Colored status markers in the style of the rest of the CLI

use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use worksphere_auth::{Notice, NoticeLevel, Notifier};

/// Prints notices as they happen: successes and info to stdout, errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => eprintln!("{}", format_notice(&notice)),
            NoticeLevel::Success | NoticeLevel::Info => println!("{}", format_notice(&notice)),
        }
    }
}

pub fn format_notice(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Success => "✓".green().bold(),
        NoticeLevel::Info => "→".cyan().bold(),
        NoticeLevel::Error => "✗".red().bold(),
    };
    format!("{} {}", marker, notice.message)
}

/// Table with the CLI's standard look.
pub fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// `-` for missing optional cells.
pub fn cell(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}
