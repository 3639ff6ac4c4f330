//! Plain-text rendering of pages, for terminal front ends.

use crate::access::ActionSet;
use crate::dashboard::{DashboardHome, Page};
use crate::screen::{StatCard, ViewModel};
use std::fmt::{self, Write as _};

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Home(home) => home.fmt(f),
            Page::Screen(vm) => vm.fmt(f),
        }
    }
}

impl fmt::Display for DashboardHome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let email = self
            .header
            .email
            .as_deref()
            .map(|e| format!(" <{e}>"))
            .unwrap_or_default();
        writeln!(
            f,
            "{} | {}{} [{}]",
            self.header.app_name, self.header.display_name, email, self.header.badge
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}. {}", self.greeting, self.subtitle)?;
        writeln!(f)?;
        write_cards(f, &self.cards)?;
        writeln!(f)?;

        let menu = self
            .menu
            .iter()
            .map(|item| format!("{} ({})", item.label, item.module.id()))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(f, "Menu: {menu}")
    }
}

impl fmt::Display for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if !self.summary.is_empty() {
            write_cards(f, &self.summary)?;
        }
        if !self.search.is_empty() {
            writeln!(f, "Search: {}", self.search)?;
        }
        if let Some(label) = self.create_label {
            writeln!(f, "[{label}]")?;
        }
        writeln!(f)?;

        let mut header: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.header().to_owned())
            .collect();
        header.push("Actions".to_owned());
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = row.cells.clone();
                cells.push(action_labels(&row.actions));
                cells
            })
            .collect();
        write_table(f, &header, &body)?;

        if self.rows.is_empty() {
            writeln!(f, "(no records)")?;
        }

        if let Some(form) = &self.form {
            writeln!(f)?;
            writeln!(f, "{}", form.title)?;
            for field in &form.fields {
                let marker = if field.required { "*" } else { " " };
                writeln!(
                    f,
                    "  {marker} {:<24} {:<18} {}",
                    field.label, field.name, field.value
                )?;
            }
        }
        Ok(())
    }
}

fn action_labels(actions: &ActionSet) -> String {
    if actions.is_empty() {
        return "-".to_owned();
    }
    actions
        .iter()
        .map(|a| a.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_cards(f: &mut fmt::Formatter<'_>, cards: &[StatCard]) -> fmt::Result {
    let line = cards
        .iter()
        .map(|card| format!("{}: {}", card.title, card.value))
        .collect::<Vec<_>>()
        .join("  |  ");
    writeln!(f, "{line}")
}

fn write_table(f: &mut fmt::Formatter<'_>, header: &[String], body: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        let mut line = String::new();
        for (i, (cell, width)) in cells.iter().zip(&widths).enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            let _ = write!(line, "{cell:<width$}");
        }
        line.trim_end().to_owned()
    };

    writeln!(f, "{}", render(header))?;
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
    writeln!(f, "{rule}")?;
    for row in body {
        writeln!(f, "{}", render(row))?;
    }
    Ok(())
}
