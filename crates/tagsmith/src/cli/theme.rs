//! Prompt theme and banner shared by the interactive commands.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` in Tagsmith colours: cyan prompts and cursor, green
/// confirmations, red errors. Everything renders to stderr.
pub fn tagsmith_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Print the edit-session banner for `folder` to stderr.
pub fn print_banner(folder: &str) {
    let title = format!("Tagsmith v{}", tagsmith_core::VERSION);
    let subtitle = format!("Editing {folder}");
    let inner_width = title.chars().count().max(subtitle.chars().count()) + 4;

    let cyan = Style::new().for_stderr().cyan();
    eprintln!();
    eprintln!("{}", cyan.apply_to(format!("  ╔{:═<inner_width$}╗", "")));
    eprintln!("{}", cyan.apply_to(format!("  ║{title:^inner_width$}║")));
    eprintln!("{}", cyan.apply_to(format!("  ║{subtitle:^inner_width$}║")));
    eprintln!("{}", cyan.apply_to(format!("  ╚{:═<inner_width$}╝", "")));
    eprintln!();
}

/// Print a green `✓` line to stderr.
pub fn success(message: impl std::fmt::Display) {
    let green = Style::new().for_stderr().green();
    eprintln!("  {} {message}", green.apply_to("✓"));
}

/// Print a yellow warning line to stderr.
pub fn warn(message: impl std::fmt::Display) {
    let yellow = Style::new().for_stderr().yellow();
    eprintln!("  {}", yellow.apply_to(message));
}
