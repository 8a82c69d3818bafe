//! The `report` command: one dashboard rendered as a terminal table.

use std::collections::BTreeSet;
use std::path::PathBuf;

use bizdash_core::engine::apply_sentiments;
use bizdash_core::{
    build_dashboard, write_workbook, AppConfig, DashboardView, DateRange, EntityScope, Filter,
    MetricKind,
};
use bizdash_gbp::DataProvider;
use bizdash_sentiment::{GeminiClassifier, SentimentSummaries};
use chrono::NaiveDate;
use clap::Args;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Restrict to one brand
    #[arg(long, conflicts_with = "location")]
    pub brand: Option<String>,

    /// Restrict to explicit location ids (repeatable)
    #[arg(long)]
    pub location: Vec<String>,

    /// First day of the period (defaults to last month)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of the period
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Compare with the preceding period of equal length
    #[arg(long, conflicts_with = "compare_from")]
    pub compare: bool,

    /// First day of an explicit comparison period
    #[arg(long, requires = "compare_to")]
    pub compare_from: Option<NaiveDate>,

    /// Last day of an explicit comparison period
    #[arg(long, requires = "compare_from")]
    pub compare_to: Option<NaiveDate>,

    /// Classify the period's reviews with Gemini
    #[arg(long)]
    pub analyze: bool,

    /// Print the full dashboard as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Also write an Excel workbook to this path
    #[arg(long)]
    pub xlsx: Option<PathBuf>,
}

impl ReportArgs {
    /// Builds the filter these arguments describe.
    ///
    /// # Errors
    ///
    /// Returns an error if either date range is inverted or too long, or
    /// the preceding period does not exist.
    pub(crate) fn filter(&self, today: NaiveDate) -> anyhow::Result<Filter> {
        let scope = if let Some(brand) = &self.brand {
            EntityScope::Brand(brand.clone())
        } else if self.location.is_empty() {
            EntityScope::All
        } else {
            EntityScope::Locations(self.location.iter().cloned().collect::<BTreeSet<_>>())
        };

        let range = match (self.from, self.to) {
            (Some(from), Some(to)) => DateRange::new(from, to)?,
            _ => Filter::default_for(today).range,
        };

        let filter = Filter::new(scope, range);
        let filter = match (self.compare_from, self.compare_to) {
            (Some(from), Some(to)) => filter.with_comparison(DateRange::new(from, to)?),
            _ if self.compare => filter.with_default_comparison()?,
            _ => filter,
        };
        Ok(filter)
    }
}

/// Load, optionally classify, and print one dashboard.
///
/// # Errors
///
/// Returns an error if the provider cannot be built, a fetch or the
/// classifier fails, or the workbook cannot be written. An empty selection
/// is reported on stdout, not as an error.
pub(crate) async fn run_report(config: &AppConfig, args: &ReportArgs) -> anyhow::Result<()> {
    let filter = args.filter(chrono::Utc::now().date_naive())?;
    let provider = DataProvider::from_config(config).await?;

    let mut data = match provider.load(&filter).await {
        Ok(data) => data,
        Err(e) if e.is_empty_result() => {
            println!("nothing to show: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut summaries = None;
    if args.analyze {
        let key = config.gemini_api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!("GEMINI_API_KEY is required for --analyze")
        })?;
        let classifier =
            GeminiClassifier::new(key, &config.gemini_model, config.gemini_timeout_secs)?;
        let period_reviews = build_dashboard(&filter, &data).reviews;
        let analysis = classifier.classify(&period_reviews).await?;
        data.reviews = apply_sentiments(&data.reviews, &analysis.sentiments);
        summaries = Some(analysis.summaries);
    }

    let view = build_dashboard(&filter, &data);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_report(&view, summaries.as_ref())?);
    }

    if let Some(path) = &args.xlsx {
        let bytes = write_workbook(&view.series, &view.reviews, filter.comparison.is_some())?;
        std::fs::write(path, &bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "workbook written");
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}

/// `+12.5%`, `-3.0%`, `0.0%`.
pub(crate) fn format_change(change: f64) -> String {
    if change > 0.0 {
        format!("+{change:.1}%")
    } else {
        format!("{change:.1}%")
    }
}

/// Markdown report of one dashboard view.
pub(crate) fn render_report(
    view: &DashboardView,
    summaries: Option<&SentimentSummaries>,
) -> Result<String, std::fmt::Error> {
    use std::fmt::Write as _;

    let mut out = String::new();
    let filter = &view.filter;
    let comparing = view.comparison_totals.is_some();

    writeln!(out, "# Dashboard Report")?;
    writeln!(out)?;
    writeln!(out, "**Scope**: {}", filter.scope)?;
    writeln!(out, "**Period**: {}", filter.range)?;
    if let Some(comparison) = &filter.comparison {
        writeln!(out, "**Compared with**: {comparison}")?;
    }
    writeln!(out, "**Locations**: {}", view.locations.len())?;
    writeln!(out)?;

    if comparing {
        writeln!(out, "| Metric | Current | Previous | Change |")?;
        writeln!(out, "|--------|---------|----------|--------|")?;
    } else {
        writeln!(out, "| Metric | Current |")?;
        writeln!(out, "|--------|---------|")?;
    }

    for kind in MetricKind::ALL {
        let current = view.totals.get(kind);
        match (&view.comparison_totals, &view.changes) {
            (Some(previous), Some(changes)) => {
                writeln!(
                    out,
                    "| {kind} | {current} | {} | {} |",
                    previous.get(kind),
                    format_change(changes.metric(kind))
                )?;
            }
            _ => {
                writeln!(out, "| {kind} | {current} |")?;
            }
        }
    }

    let stats = &view.review_stats;
    match (&view.comparison_review_stats, &view.changes) {
        (Some(previous), Some(changes)) => {
            writeln!(
                out,
                "| Reviews | {} | {} | {} |",
                stats.count,
                previous.count,
                format_change(changes.reviews)
            )?;
            writeln!(
                out,
                "| Average Rating | {:.2} | {:.2} | {} |",
                stats.average_rating,
                previous.average_rating,
                format_change(changes.average_rating)
            )?;
        }
        _ => {
            writeln!(out, "| Reviews | {} |", stats.count)?;
            writeln!(out, "| Average Rating | {:.2} |", stats.average_rating)?;
        }
    }

    let lifetime = &view.lifetime;
    writeln!(out)?;
    writeln!(
        out,
        "**Lifetime**: {} reviews, average {:.2}",
        lifetime.total_reviews, lifetime.average_rating
    )?;
    for (index, count) in lifetime.rating_histogram.iter().enumerate().rev() {
        writeln!(out, "- {} star: {count}", index + 1)?;
    }

    if let Some(summaries) = summaries {
        writeln!(out)?;
        writeln!(out, "## Review Sentiment")?;
        writeln!(out)?;
        writeln!(out, "- **Positive**: {}", summaries.positive)?;
        writeln!(out, "- **Neutral**: {}", summaries.neutral)?;
        writeln!(out, "- **Negative**: {}", summaries.negative)?;
    }

    Ok(out)
}
