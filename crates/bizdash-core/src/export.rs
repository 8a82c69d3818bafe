//! Spreadsheet export of the current dashboard.
//!
//! Two sheets: "Metrics" (one row per chart day) and "Reviews". A sheet with
//! no rows is left out; when both would be empty there is nothing to export.

use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet, XlsxError};
use thiserror::Error;

use crate::engine::ChartDataPoint;
use crate::types::{MetricCounters, MetricKind, ReviewRecord};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no data to export")]
    NoData,

    #[error("workbook error: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Tabular shape of one chart day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsRow {
    pub label: String,
    pub date: String,
    pub metrics: MetricCounters,
    pub reviews: u32,
    /// Present only while a comparison period is active.
    pub comparison: Option<ComparisonColumns>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonColumns {
    /// Empty past the end of a shorter comparison period.
    pub date: String,
    pub metrics: MetricCounters,
    pub reviews: u32,
}

impl MetricsRow {
    #[must_use]
    pub fn from_point(point: &ChartDataPoint, comparing: bool) -> Self {
        Self {
            label: point.label.clone(),
            date: point.date.to_string(),
            metrics: point.metrics,
            reviews: point.reviews,
            comparison: comparing.then(|| ComparisonColumns {
                date: point
                    .compare_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                metrics: point.compare,
                reviews: point.compare_reviews,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub date: String,
    pub author: String,
    pub rating: u8,
    pub sentiment: String,
    pub text: String,
}

impl From<&ReviewRecord> for ReviewRow {
    fn from(review: &ReviewRecord) -> Self {
        Self {
            date: review.date.to_string(),
            author: review.author.clone(),
            rating: review.rating.value(),
            sentiment: review.sentiment.to_string(),
            text: review.text.clone(),
        }
    }
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("1F4E79")
        .set_font_color("FFFFFF")
        .set_border(FormatBorder::Thin)
}

/// Builds the workbook and returns the XLSX bytes.
///
/// # Errors
///
/// [`ExportError::NoData`] when there are neither series rows nor reviews;
/// [`ExportError::Xlsx`] if the writer fails.
pub fn write_workbook(
    series: &[ChartDataPoint],
    reviews: &[ReviewRecord],
    comparing: bool,
) -> Result<Vec<u8>, ExportError> {
    if series.is_empty() && reviews.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut workbook = Workbook::new();
    if !series.is_empty() {
        let rows: Vec<MetricsRow> = series
            .iter()
            .map(|point| MetricsRow::from_point(point, comparing))
            .collect();
        write_metrics_sheet(workbook.add_worksheet(), &rows, comparing)?;
    }
    if !reviews.is_empty() {
        let rows: Vec<ReviewRow> = reviews.iter().map(ReviewRow::from).collect();
        write_reviews_sheet(workbook.add_worksheet(), &rows)?;
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(
        metric_rows = series.len(),
        review_rows = reviews.len(),
        bytes = bytes.len(),
        "workbook written"
    );
    Ok(bytes)
}

#[allow(clippy::cast_precision_loss)]
fn write_counters(
    ws: &mut Worksheet,
    row: u32,
    first_col: u16,
    counters: &MetricCounters,
) -> Result<(), XlsxError> {
    for (col, kind) in (first_col..).zip(MetricKind::ALL) {
        ws.write(row, col, counters.get(kind) as f64)?;
    }
    Ok(())
}

fn write_metrics_sheet(
    ws: &mut Worksheet,
    rows: &[MetricsRow],
    comparing: bool,
) -> Result<(), XlsxError> {
    ws.set_name("Metrics")?;
    let hdr = header_format();

    let mut headers: Vec<String> = vec!["Day".to_string(), "Date".to_string()];
    headers.extend(MetricKind::ALL.iter().map(|k| k.title().to_string()));
    headers.push("Reviews".to_string());
    if comparing {
        headers.push("Compare Date".to_string());
        headers.extend(MetricKind::ALL.iter().map(|k| format!("Prev {}", k.title())));
        headers.push("Prev Reviews".to_string());
    }
    for (col, header) in (0u16..).zip(&headers) {
        ws.write_with_format(0, col, header.as_str(), &hdr)?;
    }

    for (row, data) in (1u32..).zip(rows) {
        ws.write(row, 0, data.label.as_str())?;
        ws.write(row, 1, data.date.as_str())?;
        write_counters(ws, row, 2, &data.metrics)?;
        ws.write(row, 8, f64::from(data.reviews))?;
        if let Some(cmp) = &data.comparison {
            ws.write(row, 9, cmp.date.as_str())?;
            write_counters(ws, row, 10, &cmp.metrics)?;
            ws.write(row, 16, f64::from(cmp.reviews))?;
        }
    }

    ws.set_column_width(0, 10)?;
    ws.set_column_width(1, 12)?;
    for col in 2..u16::try_from(headers.len()).unwrap_or(u16::MAX) {
        ws.set_column_width(col, 16)?;
    }
    Ok(())
}

fn write_reviews_sheet(ws: &mut Worksheet, rows: &[ReviewRow]) -> Result<(), XlsxError> {
    ws.set_name("Reviews")?;
    let hdr = header_format();

    for (col, header) in (0u16..).zip(["Date", "Author", "Rating", "Sentiment", "Review"]) {
        ws.write_with_format(0, col, header, &hdr)?;
    }

    for (row, review) in (1u32..).zip(rows) {
        ws.write(row, 0, review.date.as_str())?;
        ws.write(row, 1, review.author.as_str())?;
        ws.write(row, 2, f64::from(review.rating))?;
        ws.write(row, 3, review.sentiment.as_str())?;
        ws.write(row, 4, review.text.as_str())?;
    }

    ws.set_column_width(0, 12)?;
    ws.set_column_width(1, 20)?;
    ws.set_column_width(2, 8)?;
    ws.set_column_width(3, 12)?;
    ws.set_column_width(4, 80)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::{Sentiment, StarRating};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn point(offset: u32, compare_date: Option<NaiveDate>) -> ChartDataPoint {
        ChartDataPoint {
            offset,
            label: format!("Jan {}", offset + 1),
            date: date(offset + 1),
            compare_date,
            metrics: MetricCounters {
                searches: 10,
                ..MetricCounters::default()
            },
            compare: MetricCounters {
                searches: 7,
                ..MetricCounters::default()
            },
            reviews: 1,
            compare_reviews: 2,
        }
    }

    fn review() -> ReviewRecord {
        ReviewRecord {
            id: "r1".to_string(),
            location_id: "loc1".to_string(),
            author: "Jane D.".to_string(),
            rating: StarRating::new(5).unwrap(),
            text: "Great".to_string(),
            date: date(2),
            sentiment: Sentiment::Positive,
        }
    }

    fn assert_xlsx(bytes: &[u8]) {
        assert!(bytes.len() > 4, "XLSX too small");
        // ZIP magic bytes PK
        assert_eq!(bytes[0], 0x50);
        assert_eq!(bytes[1], 0x4B);
    }

    #[test]
    fn nothing_to_export_is_an_error() {
        let err = write_workbook(&[], &[], false).unwrap_err();
        assert!(matches!(err, ExportError::NoData));
        assert_eq!(err.to_string(), "no data to export");
    }

    #[test]
    fn workbook_with_both_sheets() {
        let series = vec![point(0, Some(date(1))), point(1, None)];
        let bytes = write_workbook(&series, &[review()], true).expect("workbook");
        assert_xlsx(&bytes);
    }

    #[test]
    fn empty_sheets_are_skipped() {
        assert_xlsx(&write_workbook(&[point(0, None)], &[], false).expect("metrics only"));
        assert_xlsx(&write_workbook(&[], &[review()], false).expect("reviews only"));
    }

    #[test]
    fn comparison_columns_only_when_comparing() {
        let p = point(0, Some(date(5)));
        assert!(MetricsRow::from_point(&p, false).comparison.is_none());

        let row = MetricsRow::from_point(&p, true);
        let cmp = row.comparison.expect("comparison columns");
        assert_eq!(cmp.date, "2024-01-05");
        assert_eq!(cmp.metrics.searches, 7);
        assert_eq!(cmp.reviews, 2);
    }

    #[test]
    fn comparison_date_blank_past_shorter_period() {
        let row = MetricsRow::from_point(&point(3, None), true);
        assert_eq!(row.comparison.map(|c| c.date), Some(String::new()));
    }

    #[test]
    fn review_row_shapes_record() {
        let row = ReviewRow::from(&review());
        assert_eq!(row.rating, 5);
        assert_eq!(row.sentiment, "Positive");
        assert_eq!(row.date, "2024-01-02");
    }
}
