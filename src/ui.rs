use std::io::{self, IsTerminal};

use crate::domain::record::{format_duration, total_time, Record};

pub const LOADING_MESSAGE: &str = "loading...";
pub const EMPTY_MESSAGE: &str = "no study records";

pub fn print_listing(records: &[Record], loading: bool) {
    print!("{}", render_listing(records, loading, &Palette::auto()));
}

pub fn print_total(total: f64) {
    println!("{}", render_total(total, &Palette::auto()));
}

pub fn print_saved(verb: &str, record: &Record) {
    let palette = Palette::auto();
    println!(
        "{} {} {} {}",
        verb,
        palette.id(&record.id),
        palette.duration(&format_duration(record.time)),
        record.title
    );
}

fn render_listing(records: &[Record], loading: bool, palette: &Palette) -> String {
    let mut out = format!("{}\n", palette.heading("Study records"));
    if loading {
        out.push_str(&palette.dim(LOADING_MESSAGE));
        out.push('\n');
        return out;
    }

    if records.is_empty() {
        out.push_str(&palette.dim(EMPTY_MESSAGE));
        out.push('\n');
    } else {
        let id_width = records
            .iter()
            .map(|record| record.id.chars().count())
            .max()
            .unwrap_or(0);
        let durations = records
            .iter()
            .map(|record| format_duration(record.time))
            .collect::<Vec<_>>();
        let duration_width = durations
            .iter()
            .map(|value| value.chars().count())
            .max()
            .unwrap_or(0);
        for (record, duration) in records.iter().zip(&durations) {
            out.push_str(&format_row(record, duration, id_width, duration_width, palette));
            out.push('\n');
        }
    }

    out.push_str(&render_total(total_time(records), palette));
    out.push('\n');
    out
}

fn format_row(
    record: &Record,
    duration: &str,
    id_width: usize,
    duration_width: usize,
    palette: &Palette,
) -> String {
    let id = format!("{:<id_width$}", record.id);
    let duration = format!("{:>duration_width$}", duration);
    format!(
        "{}  {}  {}",
        palette.id(&id),
        palette.duration(&duration),
        record.title
    )
}

fn render_total(total: f64, palette: &Palette) -> String {
    format!("total: {}", palette.heading(&format_duration(total)))
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn duration(&self, text: &str) -> String {
        self.paint("33", text)
    }
}
