// src/pipeline/extract.rs

//! Record extraction from the listings document's tabular markup.
//!
//! Rows are located with the configured markup signature, falling back
//! to every row of every table when the signature matches nothing.
//! Each row then runs through an ordered chain of named strategies;
//! the first to produce a record wins. A row no strategy can read
//! becomes an all-sentinel record and is discarded before returning.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ListingRecord, SelectorConfig, UNKNOWN};
use crate::utils::resolve_url;

/// Compiled selectors for one extraction pass.
pub struct SelectorSet {
    row: Selector,
    posted_date: Selector,
    organization: Selector,
    position: Selector,
    qualifications: Selector,
    apply_by_date: Selector,
    link_attr: String,

    // Structural selectors used by the fallback paths
    any_table_row: Selector,
    cell: Selector,
    anchor: Selector,
}

impl SelectorSet {
    /// Compile the configured selector strings.
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            row: Self::parse(&config.row)?,
            posted_date: Self::parse(&config.posted_date)?,
            organization: Self::parse(&config.organization)?,
            position: Self::parse(&config.position)?,
            qualifications: Self::parse(&config.qualifications)?,
            apply_by_date: Self::parse(&config.apply_by_date)?,
            link_attr: config.link_attr.clone(),
            any_table_row: Self::parse("table tr")?,
            cell: Self::parse("td")?,
            anchor: Self::parse("a")?,
        })
    }

    fn parse(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// A named row-extraction strategy. Returns `None` when the row does
/// not fit the strategy's expected shape.
struct ExtractStrategy {
    name: &'static str,
    run: fn(&ElementRef, &SelectorSet) -> Option<ListingRecord>,
}

/// Tried in order; first success wins.
const STRATEGIES: &[ExtractStrategy] = &[
    ExtractStrategy {
        name: "by_selector",
        run: by_selector,
    },
    ExtractStrategy {
        name: "by_position",
        run: by_position,
    },
];

/// Extract listing records from a parsed document, preserving
/// document order. Apply links are resolved against `base_url`.
pub fn extract_records(
    document: &Html,
    selectors: &SelectorSet,
    base_url: &Url,
) -> Vec<ListingRecord> {
    let mut rows: Vec<ElementRef> = document.select(&selectors.row).collect();
    if rows.is_empty() {
        log::debug!("no rows matched the primary signature, scanning every table row");
        rows = document.select(&selectors.any_table_row).collect();
    }

    let mut records = Vec::new();
    for row in rows {
        let mut record = extract_row(&row, selectors);

        // Header and decorative rows come out all-sentinel, most often
        // from the broad scan.
        if record.is_placeholder() {
            continue;
        }

        record.apply_link = record
            .apply_link
            .take()
            .map(|href| resolve_url(base_url, &href));
        records.push(record);
    }
    records
}

fn extract_row(row: &ElementRef, selectors: &SelectorSet) -> ListingRecord {
    for strategy in STRATEGIES {
        if let Some(record) = (strategy.run)(row, selectors) {
            log::trace!("row extracted via {}", strategy.name);
            return record;
        }
    }
    ListingRecord::unknown()
}

/// Primary strategy: per-field CSS selectors from the configured
/// markup signature. A field whose selector matches nothing becomes
/// the sentinel; the strategy itself passes only when not a single
/// field selector matches.
fn by_selector(row: &ElementRef, selectors: &SelectorSet) -> Option<ListingRecord> {
    let posted_date = select_text(row, &selectors.posted_date);
    let organization = select_text(row, &selectors.organization);
    let position = select_text(row, &selectors.position);
    let qualifications = select_text(row, &selectors.qualifications);
    let apply_by_date = select_text(row, &selectors.apply_by_date);

    let matched = [
        &posted_date,
        &organization,
        &position,
        &qualifications,
        &apply_by_date,
    ]
    .iter()
    .filter(|f| f.is_some())
    .count();
    if matched == 0 {
        return None;
    }

    let apply_link = row
        .select(&selectors.anchor)
        .next()
        .and_then(|a| a.value().attr(&selectors.link_attr))
        .map(str::to_string);

    Some(ListingRecord {
        posted_date: or_unknown(posted_date),
        organization: or_unknown(organization),
        position: or_unknown(position),
        qualifications: or_unknown(qualifications),
        apply_by_date: or_unknown(apply_by_date),
        apply_link,
    })
}

/// Fallback strategy: map the row's cells by fixed position
/// (date, organization, position, qualifications, _, apply-by, link).
/// Passes when the row has fewer than six cells.
fn by_position(row: &ElementRef, selectors: &SelectorSet) -> Option<ListingRecord> {
    let cells: Vec<ElementRef> = row.select(&selectors.cell).collect();
    if cells.len() < 6 {
        return None;
    }

    let apply_link = cells
        .get(6)
        .and_then(|cell| cell.select(&selectors.anchor).next())
        .and_then(|a| a.value().attr(&selectors.link_attr))
        .map(str::to_string);

    Some(ListingRecord {
        posted_date: or_unknown(Some(cell_text(&cells[0]))),
        organization: or_unknown(Some(cell_text(&cells[1]))),
        position: or_unknown(Some(cell_text(&cells[2]))),
        qualifications: or_unknown(Some(cell_text(&cells[3]))),
        apply_by_date: or_unknown(Some(cell_text(&cells[5]))),
        apply_link,
    })
}

fn select_text(row: &ElementRef, selector: &Selector) -> Option<String> {
    row.select(selector).next().map(|el| cell_text(&el))
}

/// Collect an element's text with whitespace normalized.
fn cell_text(el: &ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(s) if !s.is_empty() => s,
        _ => UNKNOWN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> SelectorSet {
        SelectorSet::compile(&SelectorConfig::default()).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://jobs.example.com/latest/").unwrap()
    }

    fn extract(html: &str) -> Vec<ListingRecord> {
        let document = Html::parse_document(html);
        extract_records(&document, &selectors(), &base())
    }

    const PRIMARY_ROW: &str = r#"
        <table>
          <tr class="lattrbord latoclr">
            <td class="latcpb">01-04-2026</td>
            <td class="latcr">ABC Corp</td>
            <td class="latceb">Clerk</td>
            <td class="latcqb">B.A, B.Com</td>
            <td class="latclb">30-04-2026</td>
            <td><a href="/apply/1">Apply</a></td>
          </tr>
        </table>
    "#;

    #[test]
    fn primary_path_yields_no_sentinels() {
        let records = extract(PRIMARY_ROW);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.posted_date, "01-04-2026");
        assert_eq!(record.organization, "ABC Corp");
        assert_eq!(record.position, "Clerk");
        assert_eq!(record.qualifications, "B.A, B.Com");
        assert_eq!(record.apply_by_date, "30-04-2026");
        assert_eq!(
            record.apply_link.as_deref(),
            Some("https://jobs.example.com/apply/1")
        );
    }

    #[test]
    fn missing_field_becomes_sentinel_without_dropping_row() {
        let html = r#"
            <table>
              <tr class="lattrbord latoclr">
                <td class="latcr">ABC Corp</td>
                <td class="latceb">Clerk</td>
              </tr>
            </table>
        "#;
        let records = extract(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].posted_date, UNKNOWN);
        assert_eq!(records[0].qualifications, UNKNOWN);
        assert_eq!(records[0].organization, "ABC Corp");
    }

    #[test]
    fn broad_scan_uses_positional_fallback() {
        let html = r#"
            <table>
              <tr>
                <td>02-04-2026</td>
                <td>XYZ Ltd</td>
                <td>Typist</td>
                <td>12TH</td>
                <td>details</td>
                <td>15-04-2026</td>
                <td><a href="https://xyz.example.com/apply">Apply</a></td>
              </tr>
            </table>
        "#;
        let records = extract(html);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.posted_date, "02-04-2026");
        assert_eq!(record.organization, "XYZ Ltd");
        assert_eq!(record.position, "Typist");
        assert_eq!(record.qualifications, "12TH");
        assert_eq!(record.apply_by_date, "15-04-2026");
        assert_eq!(
            record.apply_link.as_deref(),
            Some("https://xyz.example.com/apply")
        );
    }

    #[test]
    fn positional_fallback_without_seventh_cell_has_no_link() {
        let html = r#"
            <table>
              <tr>
                <td>02-04-2026</td><td>XYZ Ltd</td><td>Typist</td>
                <td>12TH</td><td>x</td><td>15-04-2026</td>
              </tr>
            </table>
        "#;
        let records = extract(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].apply_link, None);
    }

    #[test]
    fn short_rows_are_discarded() {
        let html = r#"
            <table>
              <tr><td>only</td><td>three</td><td>cells</td></tr>
            </table>
        "#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn header_rows_are_discarded() {
        let html = r#"
            <table>
              <tr><th>Date</th><th>Organization</th><th>Post</th>
                  <th>Qualification</th><th>Advt</th><th>Last Date</th></tr>
              <tr>
                <td>02-04-2026</td><td>XYZ Ltd</td><td>Typist</td>
                <td>12TH</td><td>x</td><td>15-04-2026</td>
              </tr>
            </table>
        "#;
        let records = extract(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].organization, "XYZ Ltd");
    }

    #[test]
    fn document_order_is_preserved() {
        let html = r#"
            <table>
              <tr class="lattrbord latoclr">
                <td class="latcpb">01-04-2026</td><td class="latcr">First Org</td>
                <td class="latceb">Clerk</td><td class="latcqb">BA</td>
                <td class="latclb">30-04-2026</td>
              </tr>
              <tr class="lattrbord latoclr">
                <td class="latcpb">01-04-2026</td><td class="latcr">Second Org</td>
                <td class="latceb">Typist</td><td class="latcqb">12TH</td>
                <td class="latclb">30-04-2026</td>
              </tr>
            </table>
        "#;
        let records = extract(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].organization, "First Org");
        assert_eq!(records[1].organization, "Second Org");
    }

    #[test]
    fn whitespace_is_normalized() {
        let html = r#"
            <table>
              <tr class="lattrbord latoclr">
                <td class="latcpb">01-04-2026</td>
                <td class="latcr">  ABC
                    Corp  </td>
                <td class="latceb">Clerk</td>
                <td class="latcqb">BA</td>
                <td class="latclb">30-04-2026</td>
              </tr>
            </table>
        "#;
        let records = extract(html);
        assert_eq!(records[0].organization, "ABC Corp");
    }

    #[test]
    fn invalid_selector_config_is_rejected() {
        let mut config = SelectorConfig::default();
        config.row = "[[invalid".to_string();
        assert!(SelectorSet::compile(&config).is_err());
    }
}
