//! Bookmark categorization and relevance search
//!
//! Two stateless pipelines share the same stages:
//! working set → prompt → one generator call → repair → typed document,
//! then either reconciliation (`analyze`) or relevance filtering (`ask`).

use crate::ai_client::GeneratorClient;
use crate::document::GeneratorDocument;
use crate::error::{BookmindError, Result};
use crate::models::{AnalysisResult, Bookmark, CategorizedBookmark, OTHER_CATEGORY};
use crate::prompt::{categorize_request, query_request};
use crate::reconcile::reconcile;
use crate::relevance::filter_relevant;
use crate::repair::{repair_with_strategy, Strategy};
use crate::settings::{OverflowPolicy, Settings};
use crate::utils::safe_truncate;
use crate::working_set::{index_bookmarks, index_categorized};

pub struct BookmarkAnalyzer {
    client: GeneratorClient,
    settings: Settings,
}

impl BookmarkAnalyzer {
    /// Fails with a configuration error when no API key is available
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = GeneratorClient::new(settings.generator_config()?)?;
        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    /// Categorize bookmarks. Every bookmark in the working set comes back
    /// exactly once.
    pub async fn analyze(&self, bookmarks: &[Bookmark]) -> Result<AnalysisResult> {
        if bookmarks.is_empty() {
            return Ok(AnalysisResult::empty());
        }

        let working_set = index_bookmarks(bookmarks, self.settings.categorize_limit);
        if working_set.dropped > 0 {
            log::warn!(
                "Categorizing first {} of {} bookmarks ({} over the limit)",
                working_set.len(),
                bookmarks.len(),
                working_set.dropped
            );
        }

        let request = categorize_request(&working_set, &self.settings)?;
        let raw = self.client.complete(&request).await?;
        let value = decode(&raw)?;

        let doc = match GeneratorDocument::categorization(&value) {
            GeneratorDocument::Categorization(doc) => doc,
            GeneratorDocument::Malformed(reason) => {
                log::error!("Unusable categorization reply: {}", reason);
                return Err(BookmindError::ResponseFormat(reason));
            }
            GeneratorDocument::Query(_) => {
                return Err(BookmindError::ResponseFormat("unexpected query document".to_string()));
            }
        };

        let reconciled = reconcile(&bookmarks[..working_set.len()], &doc);
        let stats = reconciled.stats;
        log::info!(
            "Categorized {} bookmarks into {} categories ({} accepted, {} discarded, {} filed under {})",
            working_set.len(),
            reconciled.result.categories.len(),
            stats.accepted,
            stats.discarded,
            stats.repaired,
            OTHER_CATEGORY
        );

        let mut result = reconciled.result;
        if self.settings.overflow == OverflowPolicy::Other {
            result.bookmarks.extend(
                bookmarks[working_set.len()..]
                    .iter()
                    .map(|b| CategorizedBookmark::new(b, OTHER_CATEGORY)),
            );
        }

        Ok(result)
    }

    /// Bookmarks relevant to `query`, most relevant first
    pub async fn ask(&self, query: &str, bookmarks: &[CategorizedBookmark]) -> Result<Vec<CategorizedBookmark>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BookmindError::Validation("query must not be empty".to_string()));
        }
        if bookmarks.is_empty() {
            return Ok(Vec::new());
        }

        let working_set = index_categorized(bookmarks, self.settings.query_limit);
        if working_set.dropped > 0 {
            log::warn!(
                "Searching first {} of {} bookmarks",
                working_set.len(),
                bookmarks.len()
            );
        }

        let request = query_request(query, &working_set, &self.settings)?;
        let raw = self.client.complete(&request).await?;
        let value = decode(&raw)?;

        let doc = match GeneratorDocument::query(&value) {
            GeneratorDocument::Query(doc) => doc,
            GeneratorDocument::Malformed(reason) => {
                log::error!("Unusable query reply: {}", reason);
                return Err(BookmindError::ResponseFormat(reason));
            }
            GeneratorDocument::Categorization(_) => {
                return Err(BookmindError::ResponseFormat("unexpected categorization document".to_string()));
            }
        };

        let relevant = filter_relevant(&bookmarks[..working_set.len()], &doc);
        log::info!(
            "Query matched {} of {} bookmarks ({} ids discarded)",
            relevant.len(),
            working_set.len(),
            doc.relevant_ids.len() + doc.discarded - relevant.len()
        );
        Ok(relevant)
    }
}

/// Run the repair chain over raw generator text
fn decode(raw: &str) -> Result<serde_json::Value> {
    match repair_with_strategy(raw) {
        Ok((value, Strategy::Strict)) => Ok(value),
        Ok((value, strategy)) => {
            log::warn!("Generator reply was truncated, recovered with {}", strategy.as_str());
            Ok(value)
        }
        Err(e) => {
            log::error!("Failed to parse generator reply: {}\nResponse: {}", e, safe_truncate(raw, 500));
            Err(e.into())
        }
    }
}
