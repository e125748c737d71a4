use std::fmt::Write;

use catalog_core::{CharacterDetailsView, ListViewModel, StatusIndicator, TopBarConfig};

fn indicator(status: StatusIndicator) -> &'static str {
    match status {
        StatusIndicator::Green => "(+)",
        StatusIndicator::Red => "(x)",
        StatusIndicator::Black => "(?)",
    }
}

pub fn top_bar(config: &TopBarConfig) -> String {
    let mut line = String::new();
    if config.show_back_button {
        line.push_str("<- ");
    }
    if config.show_title {
        line.push_str(&config.title);
    }
    let rule = "=".repeat(line.chars().count().max(10));
    format!("{line}\n{rule}\n")
}

pub fn list(view: &ListViewModel, exhausted: bool) -> String {
    let mut out = top_bar(&view.top_bar);
    for row in &view.rows {
        let _ = writeln!(
            out,
            "#{:<4} {} {} ({})",
            row.id,
            indicator(row.indicator),
            row.name,
            row.status
        );
    }
    if view.loading {
        out.push_str("loading...\n");
    } else if exhausted {
        let _ = writeln!(out, "-- end of catalog ({} characters) --", view.rows.len());
    } else if view.rows.is_empty() {
        out.push_str("no characters loaded yet\n");
    }
    out
}

pub fn details(view: &CharacterDetailsView) -> String {
    let mut out = top_bar(&view.top_bar);
    let _ = writeln!(out, "[{}] {}", view.background, view.image);
    let _ = writeln!(out, "{} {}", indicator(view.indicator), view.status);
    for row in &view.rows {
        let _ = writeln!(out, "\n{}\n  {}", row.label, row.value);
    }
    out
}
