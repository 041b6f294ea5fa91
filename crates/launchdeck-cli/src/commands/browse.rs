use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use launchdeck_application::{FilteredView, PaginatedQuery, SearchFilter};
use launchdeck_core::entity::LaunchPadStatus;
use launchdeck_core::favorites::favorite_docs;
use launchdeck_core::search::{SearchProjection, normalize_query};
use launchdeck_core::{Entity, Launch, LaunchPad, Named, PageSequence, QueryDescriptor};
use launchdeck_interaction::SpaceXClient;

use super::AppContext;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    /// Only show entries whose name, rocket or launch pad contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Only show favorites among the loaded entries
    #[arg(long)]
    pub favorites: bool,
}

/// One-line rendering of an entity in a listing.
pub trait Listing: Entity {
    fn summary(&self) -> String;
}

impl Listing for Launch {
    fn summary(&self) -> String {
        let date = self
            .date_utc
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        let rocket = self.rocket_name().unwrap_or("?");
        let pad = self.launchpad_name().unwrap_or("?");
        let outcome = match self.success {
            Some(true) => "Successful".green(),
            Some(false) => "Failed".red(),
            None => "".normal(),
        };
        format!(
            "{}  {}  {} · {}  {}",
            self.name.bold(),
            date,
            rocket,
            pad,
            outcome
        )
    }
}

impl Listing for LaunchPad {
    fn summary(&self) -> String {
        let status = match self.status {
            LaunchPadStatus::Active => "Active".green(),
            LaunchPadStatus::UnderConstruction => "Under construction".yellow(),
            LaunchPadStatus::Inactive => "Inactive".red(),
            LaunchPadStatus::Retired => "Retired".red(),
            LaunchPadStatus::Lost => "Lost".red(),
            LaunchPadStatus::Unknown => "Unknown".normal(),
        };
        format!(
            "{}  {}  {}  {}/{} successful",
            self.display_name().bold(),
            status,
            self.rocket_names(),
            self.launch_successes,
            self.launch_attempts
        )
    }
}

pub fn favorite_marker(is_favorite: bool) -> ColoredString {
    if is_favorite { "★".yellow() } else { " ".normal() }
}

/// Loads `args.pages` pages of `descriptor` and prints the matching entries.
pub async fn list<T: Listing>(ctx: &AppContext, descriptor: QueryDescriptor, args: &ListArgs) -> Result<()> {
    let query = PaginatedQuery::<T, SpaceXClient>::new(Arc::clone(&ctx.client), descriptor);
    query
        .ensure_pages(args.pages.max(1))
        .await
        .with_context(|| format!("Failed to load {}", T::COLLECTION))?;
    let pages = query.page_sequence();

    let filter = SearchFilter::new(ctx.config.search.debounce());
    if let Some(search) = &args.search {
        filter.set_query(search.as_str());
        filter.flush();
    }
    let effective = filter.effective_query();

    let favorite_ids = ctx.favorites.get_all(T::COLLECTION.storage_key());
    let shown = select(&pages, &effective, &favorite_ids, args.favorites);

    for doc in &shown {
        let is_favorite = favorite_ids.iter().any(|id| id == doc.id());
        println!("{} {}", favorite_marker(is_favorite), doc.summary());
    }

    let total = pages
        .last()
        .and_then(|page| page.total_docs)
        .map(|total| format!(" of {}", total))
        .unwrap_or_default();
    println!(
        "\n{} shown, {} loaded{} [{}]",
        shown.len(),
        pages.doc_count(),
        total,
        query.load_more_state()
    );
    Ok(())
}

/// The loaded entries to print: search matches, optionally only favorites.
fn select<T: Entity>(
    pages: &PageSequence<T>,
    effective_query: &str,
    favorite_ids: &[String],
    favorites_only: bool,
) -> Vec<T> {
    if favorites_only {
        let projection = SearchProjection::<T>::default();
        let upper_query = normalize_query(effective_query);
        favorite_docs(pages, favorite_ids)
            .into_iter()
            .filter(|doc| projection.matches(doc, &upper_query))
            .cloned()
            .collect()
    } else {
        FilteredView::new().view(pages, effective_query).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchdeck_core::Page;
    use serde_json::json;

    fn pads() -> PageSequence<LaunchPad> {
        let docs = json!([
            {
                "id": "pad-1",
                "name": "KSC LC 39A",
                "full_name": "Kennedy Space Center Historic Launch Complex 39A",
                "status": "active",
                "launch_attempts": 55,
                "launch_successes": 54,
                "rockets": [{"id": "r1", "name": "Falcon 9"}, {"id": "r2", "name": "Falcon Heavy"}]
            },
            {
                "id": "pad-2",
                "name": "Kwajalein Atoll",
                "full_name": "Kwajalein Atoll Omelek Island",
                "status": "retired",
                "rockets": [{"id": "r0", "name": "Falcon 1"}]
            }
        ]);
        let mut pages = PageSequence::new();
        pages.push(Page::new(serde_json::from_value(docs).unwrap(), 0, 12, false));
        pages
    }

    #[test]
    fn test_select_searches_loaded_pages() {
        let pages = pads();
        let ids = |docs: Vec<LaunchPad>| docs.into_iter().map(|pad| pad.id).collect::<Vec<_>>();

        assert_eq!(ids(select(&pages, "", &[], false)), vec!["pad-1", "pad-2"]);
        assert_eq!(ids(select(&pages, "heavy", &[], false)), vec!["pad-1"]);
        assert_eq!(ids(select(&pages, "omelek", &[], false)), vec!["pad-2"]);
    }

    #[test]
    fn test_select_favorites_only() {
        let pages = pads();
        let favorites = vec!["pad-2".to_string(), "missing".to_string()];

        let shown = select(&pages, "", &favorites, true);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "pad-2");

        assert!(select(&pages, "heavy", &favorites, true).is_empty());
    }

    #[test]
    fn test_summary_mentions_rockets() {
        let pages = pads();
        let summary = pages.docs().next().unwrap().summary();
        assert!(summary.contains("Falcon 9, Falcon Heavy"));
        assert!(summary.contains("54/55 successful"));
    }
}
