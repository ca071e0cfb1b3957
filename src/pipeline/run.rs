// src/pipeline/run.rs

//! One pipeline run: fetch → extract → filter → dedup → dispatch.
//!
//! Sequential and single-threaded; the only suspension points are the
//! document fetch and each outbound send. The driver enforces
//! at-most-one run at a time by construction.

use chrono::{Local, NaiveDateTime};
use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{Config, ListingRecord};

use super::category;
use super::dedup::DeduplicationStore;
use super::dispatch::{DispatchReport, Dispatcher};
use super::extract::{SelectorSet, extract_records};
use super::fetch::fetch_document;
use super::recency::RecencyResolver;

/// Extract one document's records and apply both filters. Category
/// runs before recency; the predicates are independent, so the order
/// only affects short-circuiting.
pub fn filter_document(
    html: &str,
    selectors: &SelectorSet,
    resolver: &RecencyResolver,
    base_url: &Url,
    category: &str,
    now: NaiveDateTime,
) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);
    extract_records(&document, selectors, base_url)
        .into_iter()
        .filter(|record| category::matches(record, category))
        .filter(|record| resolver.is_recent_at(&record.posted_date, now))
        .collect()
}

/// Run the full pipeline once. A fetch failure yields a report with
/// zero records and the error recorded; it never fails the run.
pub async fn run_once(
    config: &Config,
    client: &Client,
    dispatcher: &Dispatcher,
    store: &mut DeduplicationStore,
    category: &str,
) -> Result<DispatchReport> {
    let selectors = SelectorSet::compile(&config.selectors)?;
    let resolver = RecencyResolver::new(Some(&config.date_format));
    let base_url = Url::parse(&config.target_url)?;

    log::info!(
        "Run starting: category={category}, window={}h, url={}",
        config.lookback_hours,
        config.target_url
    );

    let html = match fetch_document(client, &config.target_url).await {
        Ok(html) => html,
        Err(error) => {
            log::warn!("Fetch failed, treating run as empty: {error}");
            return Ok(DispatchReport::fetch_failed(error));
        }
    };

    let records = filter_document(
        &html,
        &selectors,
        &resolver,
        &base_url,
        category,
        Local::now().naive_local(),
    );
    log::info!("{} records match after filtering", records.len());

    let report = dispatcher.dispatch(&records, category, store).await;
    log::info!(
        "Run complete: sent={}, suppressed={}, failures={}",
        report.sent,
        report.suppressed,
        report.failures.len()
    );
    Ok(report)
}
