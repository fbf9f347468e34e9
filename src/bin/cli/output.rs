//! Output formatting for CLI operations.

use console::style;
use ntfs_streams::{AltStream, DirectoryListing, ListedItem, Timestamp};

/// Size column width when only streams are listed.
const STREAM_SIZE_WIDTH: usize = 15;
/// Size column width for streams under a full listing line.
const STREAM_SIZE_WIDTH_ALL: usize = 35;
/// Size column width for files and directories in a full listing.
const ITEM_SIZE_WIDTH: usize = 17;

/// Formats a byte count with a space between groups of three digits.
pub fn group_thousands(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped
}

/// Formats a timestamp as `dd.mm.yyyy  hh:mm` (UTC).
pub fn format_timestamp(time: Timestamp) -> String {
    let secs = time.as_unix_secs();
    let days_since_epoch = secs.div_euclid(86400);
    let time_of_day = secs.rem_euclid(86400);
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;

    let mut year = 1970;
    let mut remaining_days = days_since_epoch;
    loop {
        if remaining_days < 0 {
            year -= 1;
            remaining_days += if is_leap_year(year) { 366 } else { 365 };
            continue;
        }
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if remaining_days < days_in_year {
            break;
        }
        remaining_days -= days_in_year;
        year += 1;
    }

    let (month, day) = days_to_month_day(remaining_days as u32, is_leap_year(year));

    format!(
        "{:02}.{:02}.{:04}  {:02}:{:02}",
        day, month, year, hours, minutes
    )
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn days_to_month_day(day_of_year: u32, leap: bool) -> (u32, u32) {
    let days_in_months: [u32; 12] = if leap {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut remaining = day_of_year;
    for (i, &days) in days_in_months.iter().enumerate() {
        if remaining < days {
            return (i as u32 + 1, remaining + 1);
        }
        remaining -= days;
    }

    (12, 31)
}

/// One stream line: size column, then `prefix:name`.
pub fn format_stream_line(stream: &AltStream, prefix: &str, all: bool) -> String {
    let width = if all {
        STREAM_SIZE_WIDTH_ALL
    } else {
        STREAM_SIZE_WIDTH
    };
    format!(
        "{:>width$} {}:{}",
        group_thousands(stream.size),
        prefix,
        stream.name
    )
}

/// One item line of a full listing: time, size or `<DIR>`, name.
pub fn format_item_line(item: &ListedItem) -> String {
    let time = item
        .modified
        .map(format_timestamp)
        .unwrap_or_else(|| " ".repeat(17));
    let size = if item.is_dir {
        "<DIR>         ".to_string()
    } else {
        group_thousands(item.size)
    };
    let width = ITEM_SIZE_WIDTH;
    format!("{time} {size:>width$} {}", item.name)
}

/// Renders a listing. With `all`, every child gets an item line; otherwise
/// only streams are shown.
pub fn format_listing(listing: &DirectoryListing, all: bool) -> String {
    let mut output = String::new();
    let own_prefix = format!(".{}", std::path::MAIN_SEPARATOR);
    for stream in &listing.streams {
        output.push_str(&format_stream_line(stream, &own_prefix, all));
        output.push('\n');
    }
    for item in &listing.items {
        if all {
            output.push_str(&format_item_line(item));
            output.push('\n');
        }
        for stream in &item.streams {
            output.push_str(&format_stream_line(stream, &item.name, all));
            output.push('\n');
        }
    }
    output
}

/// Indentation for an event at `depth`.
pub fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// A directory line of an archive listing.
pub fn directory_line(name: &str, depth: usize) -> String {
    format!("{}{}", indent(depth), style(format!("> {name}")).yellow())
}

/// A file or stream line of an archive listing.
pub fn content_line(name: &str, size: u64, depth: usize, is_stream: bool) -> String {
    let text = format!("+ {name}   {size}");
    let text = if is_stream {
        style(text).cyan()
    } else {
        style(text).white()
    };
    format!("{}{}", indent(depth), text)
}

/// A warning line of an archive listing.
pub fn warning_line(path: &str, message: &str, depth: usize) -> String {
    format!(
        "{}{}",
        indent(depth),
        style(format!("* {path}  {message}")).red()
    )
}
