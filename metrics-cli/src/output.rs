use std::io::Write;

#[cfg(feature = "colored-output")]
use colored::*;
use creator_metrics::{ClientStats, CreatorMetricsSnapshot, CredentialKind, CredentialStatus, Provenance};
use serde::Serialize;
#[cfg(feature = "table-output")]
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;
use crate::error::Result;

/// One line per record, across every metric family.
#[cfg_attr(feature = "table-output", derive(Tabled))]
struct RecordRow {
    platform: String,
    kind: &'static str,
    audience: String,
    activity: String,
    rate: String,
    source: &'static str,
}

#[cfg_attr(feature = "table-output", derive(Tabled))]
struct PlatformRow {
    platform: String,
    domain: String,
    credential: String,
    api: &'static str,
}

fn source_label(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::Real => "real",
        Provenance::Synthetic => "synthetic",
    }
}

fn record_rows(snapshot: &CreatorMetricsSnapshot) -> Vec<RecordRow> {
    let social = snapshot.social.iter().map(|m| RecordRow {
        platform: m.platform.to_string(),
        kind: "social",
        audience: format!("{} followers", m.followers),
        activity: format!("{} posts", m.post_count),
        rate: format!("{:.2}% engagement", m.engagement_rate),
        source: source_label(m.provenance),
    });
    let streaming = snapshot.streaming.iter().map(|m| RecordRow {
        platform: m.platform.to_string(),
        kind: "streaming",
        audience: format!("{} listeners", m.listeners),
        activity: format!("{} streams", m.streams),
        rate: format!("popularity {}", m.popularity),
        source: source_label(m.provenance),
    });
    let deals = snapshot.brand_deals.iter().map(|d| RecordRow {
        platform: d.brand.clone(),
        kind: "brand_deal",
        audience: format!("${:.2}", d.deal_value_usd),
        activity: format!("{} to {}", d.start_date, d.end_date),
        rate: format!("{:.2}% conversion", d.conversion_rate),
        source: source_label(d.provenance),
    });
    social.chain(streaming).chain(deals).collect()
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(Into::into)
}

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_snapshots(
        &self,
        snapshots: &[CreatorMetricsSnapshot],
        format: OutputFormat,
    ) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(snapshots
                .iter()
                .map(|s| self.format_snapshot_pretty(s))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Json => to_json(snapshots, true),
            OutputFormat::JsonCompact => to_json(snapshots, false),
        }
    }

    fn format_snapshot_pretty(&self, snapshot: &CreatorMetricsSnapshot) -> String {
        let summary = snapshot.summary();
        let mut output = String::new();

        output.push_str(&self.colorize(
            &format!("Creator {}", snapshot.creator_id),
            &Color::Green,
            true,
        ));
        output.push_str(&format!(
            "  ({})\n",
            snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        let rows = record_rows(snapshot);
        if rows.is_empty() {
            output.push_str("  no records\n");
        } else {
            output.push_str(&self.render_records(rows));
            output.push('\n');
        }

        output.push_str(&format!(
            "  {}: {}  {}: {}  {}: {}  {}: ${:.2}\n",
            self.colorize("Followers", &Color::Yellow, false),
            summary.total_followers,
            self.colorize("Listeners", &Color::Yellow, false),
            summary.total_listeners,
            self.colorize("Streams", &Color::Yellow, false),
            summary.total_streams,
            self.colorize("Deals", &Color::Yellow, false),
            summary.total_deal_value_usd,
        ));

        let badge = if summary.fully_synthetic() {
            self.colorize("synthetic data only", &Color::Red, true)
        } else {
            self.colorize(
                &format!(
                    "{} real / {} synthetic",
                    summary.real_records, summary.synthetic_records
                ),
                &Color::Cyan,
                false,
            )
        };
        output.push_str(&format!("  {badge}\n"));
        output
    }

    #[cfg(feature = "table-output")]
    fn render_records(&self, rows: Vec<RecordRow>) -> String {
        Table::new(rows).with(Style::modern()).to_string()
    }

    #[cfg(not(feature = "table-output"))]
    fn render_records(&self, rows: Vec<RecordRow>) -> String {
        rows.iter()
            .map(|r| {
                format!(
                    "  {:<12} {:<10} {:<20} {:<26} {:<22} {}",
                    r.platform, r.kind, r.audience, r.activity, r.rate, r.source
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_platforms(
        &self,
        statuses: &[CredentialStatus],
        format: OutputFormat,
    ) -> Result<String> {
        match format {
            OutputFormat::Json => return to_json(statuses, true),
            OutputFormat::JsonCompact => return to_json(statuses, false),
            OutputFormat::Pretty => {}
        }

        let rows: Vec<PlatformRow> = statuses
            .iter()
            .map(|s| PlatformRow {
                platform: s.platform.to_string(),
                domain: s.domain.proxy_endpoint().to_string(),
                credential: match s.kind {
                    CredentialKind::Real => self.colorize("real", &Color::Green, false),
                    CredentialKind::Synthetic if s.has_secret => {
                        self.colorize("placeholder", &Color::Yellow, false)
                    }
                    CredentialKind::Synthetic => self.colorize("missing", &Color::Red, false),
                },
                api: if s.has_public_api { "yes" } else { "synthetic only" },
            })
            .collect();

        Ok(self.render_platforms(rows))
    }

    #[cfg(feature = "table-output")]
    fn render_platforms(&self, rows: Vec<PlatformRow>) -> String {
        Table::new(rows).with(Style::modern()).to_string()
    }

    #[cfg(not(feature = "table-output"))]
    fn render_platforms(&self, rows: Vec<PlatformRow>) -> String {
        rows.iter()
            .map(|r| format!("{:<12} {:<12} {:<12} {}", r.platform, r.domain, r.credential, r.api))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_stats(&self, stats: &ClientStats, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => to_json(stats, true),
            OutputFormat::JsonCompact => to_json(stats, false),
            OutputFormat::Pretty => Ok(format!(
                "{} cache hits {}, misses {}, network attempts {}, retries {}, fallbacks {}",
                self.colorize("Client:", &Color::Green, true),
                stats.cache_hits,
                stats.cache_misses,
                stats.network_attempts,
                stats.retries,
                stats.fallbacks
            )),
        }
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Red => text.red(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Red,
    Cyan,
}

pub fn write_output(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{content}")?;
    stdout.flush()?;
    Ok(())
}
