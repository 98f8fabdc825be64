//! Output formatting helpers.

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, Utc};

use absinthe_client::UserMessage;
use absinthe_core::models::{Campaign, Key, PointRecord};

use crate::app::{Notification, NotificationKind};

pub fn write_notification(w: &mut impl Write, n: &Notification) -> io::Result<()> {
    let marker = match n.kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
    };
    writeln!(w, "[{marker}] {}: {}", n.title, n.message)?;
    if let Some(detail) = &n.detail {
        writeln!(w, "\n    {detail}\n")?;
    }
    Ok(())
}

/// Report a failed list/detail fetch. Nothing is retried.
pub fn write_fetch_error<E>(w: &mut impl Write, what: &str, err: &E) -> io::Result<()>
where
    E: Display + UserMessage,
{
    let message = err
        .server_message()
        .unwrap_or_else(|| "Could not reach the server. Please try again.".to_string());
    writeln!(w, "[error] Failed to fetch {what}: {message}")
}

pub fn write_campaign_table(w: &mut impl Write, campaigns: &[Campaign]) -> io::Result<()> {
    if campaigns.is_empty() {
        return writeln!(w, "No campaigns found.");
    }
    writeln!(
        w,
        "{:<8} {:<32} {:<10} {:<17} {:<17}",
        "ID", "NAME", "STATUS", "START", "END"
    )?;
    for c in campaigns {
        writeln!(
            w,
            "{:<8} {:<32} {:<10} {:<17} {:<17}",
            c.id,
            truncate(&c.name, 32),
            c.status,
            date_str(&c.start_date),
            c.end_date.as_ref().map_or_else(|| "-".to_string(), date_str),
        )?;
    }
    writeln!(w, "\n{} campaign(s)", campaigns.len())
}

pub fn write_campaign_detail(w: &mut impl Write, c: &Campaign) -> io::Result<()> {
    writeln!(w, "  ID:       {}", c.id)?;
    writeln!(w, "  Name:     {}", c.name)?;
    writeln!(w, "  Status:   {}", c.status)?;
    writeln!(w, "  Start:    {}", date_str(&c.start_date))?;
    if let Some(end) = &c.end_date {
        writeln!(w, "  End:      {}", date_str(end))?;
    }
    writeln!(w, "  Created:  {}", date_str(&c.created_at))?;
    Ok(())
}

pub fn write_key_table(w: &mut impl Write, keys: &[Key]) -> io::Result<()> {
    if keys.is_empty() {
        return writeln!(w, "No API keys found.");
    }
    writeln!(
        w,
        "{:<12} {:<28} {:<20} {:<17} {:<17}",
        "ID", "PERMISSIONS", "CAMPAIGN", "EXPIRES", "CREATED"
    )?;
    for k in keys {
        let permissions = k
            .permissions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let campaign = k
            .campaign
            .as_ref()
            .map_or_else(|| "-".to_string(), |c| format!("{} {}", c.id, c.name));
        writeln!(
            w,
            "{:<12} {:<28} {:<20} {:<17} {:<17}",
            truncate(&k.id, 12),
            truncate(&permissions, 28),
            truncate(&campaign, 20),
            k.end_date.as_ref().map_or_else(|| "never".to_string(), date_str),
            date_str(&k.created_at),
        )?;
    }
    writeln!(w, "\n{} key(s)", keys.len())
}

pub fn write_point_records(w: &mut impl Write, records: &[PointRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(w, "No points found.");
    }
    writeln!(w, "{:<44} {:>12} {:<20} {:<17}", "ADDRESS", "POINTS", "EVENT", "AT")?;
    for r in records {
        writeln!(
            w,
            "{:<44} {:>12} {:<20} {:<17}",
            truncate(&r.address, 44),
            r.points,
            truncate(r.event_name.as_deref().unwrap_or("-"), 20),
            r.created_at.as_ref().map_or_else(|| "-".to_string(), date_str),
        )?;
    }
    let total: f64 = records.iter().map(|r| r.points).sum();
    writeln!(w, "\n{} record(s), {total} point(s)", records.len())
}

pub fn date_str(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max - 1).collect::<String>())
    }
}
