//! End-to-end sync pipeline: load → fetch → normalize → archive → select →
//! diff → publish.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use internwatch_fetch::FetchOptions;
use internwatch_markdown::{SpliceError, TableLayout};
use internwatch_shared::{InternwatchError, Posting, RawPosting, Result, RunConfig};
use internwatch_storage::JsonStore;

use crate::archive::{Archive, MergeStats};
use crate::diff::{SnapshotDiff, diff_snapshots};
use crate::normalize::normalize_all;
use crate::select::select_current;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// What happened to the README table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The table was regenerated with this many rows.
    Published { rows: usize },
    /// The document did not have the expected layout and was left untouched.
    Skipped(SpliceError),
    /// Dry run: the document was not read or written.
    DryRun,
}

/// The in-memory result of reconciling a fetch against stored state.
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Full archive in insertion order.
    pub archive: Vec<Posting>,
    /// Listable postings in term order.
    pub current: Vec<Posting>,
    /// Change in the current listing versus the previous run.
    pub diff: SnapshotDiff,
    /// How the fetched postings landed in the archive.
    pub merge: MergeStats,
}

/// Result of [`sync_listings`].
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Time-ordered identifier of this run.
    pub run_id: Uuid,
    /// Postings in the fetched document.
    pub fetched: usize,
    /// Postings in the new current snapshot.
    pub active: usize,
    /// Added/removed ids versus the previous snapshot.
    pub diff: SnapshotDiff,
    /// Archive size after merging.
    pub archive_size: usize,
    /// Archive merge tallies.
    pub merge: MergeStats,
    /// README outcome.
    pub publish: PublishOutcome,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl SyncReport {
    /// The four summary lines printed at the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "Total opportunities: {}\nTotal active opportunities: {}\nTotal added: {}\nTotal removed: {}",
            self.fetched,
            self.active,
            self.diff.added.len(),
            self.diff.removed.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &SyncReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &SyncReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Merge, filter, sort, and diff. No I/O.
///
/// `previous` is the last published snapshot, `archived` the stored archive,
/// `fetched` the upstream document. Selection runs over the fetched postings
/// only; archived postings absent upstream are kept in the archive but never
/// listed.
pub fn reconcile(
    fetched: &[RawPosting],
    previous: &[RawPosting],
    archived: &[RawPosting],
    today: NaiveDate,
) -> Reconciled {
    let fetched = normalize_all(fetched);
    let previous = normalize_all(previous);

    let mut archive = Archive::from_raw(archived);
    let merge = archive.merge_all(&fetched);

    let current = select_current(&fetched, today);
    let diff = diff_snapshots(&previous, &current);

    Reconciled {
        archive: archive.into_records(),
        current,
        diff,
        merge,
    }
}

/// Run one full sync.
///
/// 1. Load the previous snapshot and the archive (missing files are empty)
/// 2. Fetch the upstream listings; any failure aborts before writing
/// 3. Reconcile (see [`reconcile`])
/// 4. Write the archive and the current snapshot
/// 5. Regenerate the README table; a layout mismatch is reported, not raised
#[instrument(skip_all, fields(run_id = tracing::field::Empty, source = %config.source_url))]
pub async fn sync_listings(
    config: &RunConfig,
    today: NaiveDate,
    progress: &dyn ProgressReporter,
) -> Result<SyncReport> {
    let start = Instant::now();
    let run_id = Uuid::now_v7();
    tracing::Span::current().record("run_id", tracing::field::display(run_id));

    info!(%today, dry_run = config.dry_run, "starting sync");

    // --- Load ---
    progress.phase("Loading stored listings");
    let store = JsonStore::new(&config.current_path, &config.archive_path);
    let previous = store.load_current()?;
    let archived = store.load_archive()?;

    // --- Fetch ---
    progress.phase("Fetching listings");
    let fetch_opts = FetchOptions {
        timeout_secs: config.timeout_secs,
        user_agent: config.user_agent.clone(),
    };
    let fetched = internwatch_fetch::fetch_listings(&config.source_url, &fetch_opts).await?;

    // --- Reconcile ---
    progress.phase("Reconciling");
    let reconciled = reconcile(&fetched, &previous, &archived, today);

    info!(
        fetched = fetched.len(),
        active = reconciled.current.len(),
        added = reconciled.diff.added.len(),
        removed = reconciled.diff.removed.len(),
        archive_size = reconciled.archive.len(),
        archive_new = reconciled.merge.inserted,
        archive_replaced = reconciled.merge.replaced,
        "listings reconciled"
    );
    debug!(added = ?reconciled.diff.added, removed = ?reconciled.diff.removed, "snapshot diff");

    // --- Write ---
    let publish = if config.dry_run {
        info!("dry run, skipping writes");
        PublishOutcome::DryRun
    } else {
        progress.phase("Writing listings");
        store.save_archive(&reconciled.archive)?;
        store.save_current(&reconciled.current)?;

        progress.phase("Updating README");
        let layout = TableLayout::with_marker(config.marker.clone());
        publish_readme(&config.readme_path, &layout, &reconciled.current).await?
    };

    let report = SyncReport {
        run_id,
        fetched: fetched.len(),
        active: reconciled.current.len(),
        diff: reconciled.diff,
        archive_size: reconciled.archive.len(),
        merge: reconciled.merge,
        publish,
        elapsed: start.elapsed(),
    };

    info!(elapsed_ms = report.elapsed.as_millis(), "sync complete");
    progress.done(&report);

    Ok(report)
}

/// Regenerate the table in the document at `path`.
///
/// Reading or writing the document is fatal on failure; an unexpected layout
/// is not.
#[instrument(skip_all, fields(path = %path.display(), rows = postings.len()))]
pub async fn publish_readme(
    path: &Path,
    layout: &TableLayout,
    postings: &[Posting],
) -> Result<PublishOutcome> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InternwatchError::io(path, e))?;

    let rows = internwatch_markdown::render_rows(postings);
    let updated = match internwatch_markdown::splice_table(&content, layout, &rows) {
        Ok(updated) => updated,
        Err(reason) => {
            warn!(%reason, "README table not updated");
            return Ok(PublishOutcome::Skipped(reason));
        }
    };

    tokio::fs::write(path, updated)
        .await
        .map_err(|e| InternwatchError::io(path, e))?;

    info!("README table updated");
    Ok(PublishOutcome::Published {
        rows: postings.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use serde_json::{Value, json};
    use url::Url;

    const README: &str = "# Internships\n\n## Latest Internships\n\n| Company | Role | Locations | Terms | Deadline | Link |\n| ------- | ---- | --------- | ----- | -------- | ---- |\n| Old | Old | | Summer 2020 | | [Apply Here](x) |\n\n## About\n\nFooter.\n";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("iw_sync_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn run_config(dir: &Path, source: &str) -> RunConfig {
        RunConfig {
            source_url: Url::parse(source).unwrap(),
            timeout_secs: 5,
            user_agent: "internwatch-test".into(),
            current_path: dir.join("data/current.json"),
            archive_path: dir.join("data/archived.json"),
            readme_path: dir.join("README.md"),
            marker: "## Latest Internships".into(),
            dry_run: false,
        }
    }

    fn three_postings() -> Value {
        json!([
            {"id": "fall", "company_name": "Acme", "title": "SWE Intern", "active": true,
             "terms": ["Fall 2027"], "url": "https://example.com/fall", "locations": ["NYC"],
             "date_posted": 1760659200},
            {"id": "inactive", "company_name": "Borealis", "active": false, "terms": "Summer 2027"},
            {"id": "spring", "company_name": "Zürich Robotics", "title": "Robotics Intern",
             "active": true, "terms": "Spring 2027", "url": "https://example.com/spring"}
        ])
    }

    async fn serve(payload: &Value) -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/listings.json"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;
        server
    }

    fn read_ids(path: &Path) -> Vec<String> {
        let content = std::fs::read_to_string(path).expect("read collection");
        let items: Vec<Posting> = serde_json::from_str(&content).expect("parse collection");
        items.into_iter().map(|p| p.id).collect()
    }

    fn raw_list(value: Value) -> Vec<RawPosting> {
        value
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_object().cloned())
            .collect()
    }

    #[test]
    fn reconcile_keeps_archived_ids_out_of_current() {
        let archived = raw_list(json!([{"id": "gone", "active": true, "terms": "Summer 2027"}]));
        let previous = archived.clone();
        let fetched = raw_list(three_postings());

        let out = reconcile(&fetched, &previous, &archived, today());

        let archive_ids: Vec<&str> = out.archive.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(archive_ids, vec!["gone", "fall", "inactive", "spring"]);
        let current_ids: Vec<&str> = out.current.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(current_ids, vec!["spring", "fall"]);
        assert_eq!(out.diff.removed, vec!["gone"]);
        assert_eq!(out.merge.inserted, 3);
        for posting in &out.current {
            assert!(archive_ids.contains(&posting.id.as_str()));
        }
    }

    #[test]
    fn summary_has_four_lines() {
        let report = SyncReport {
            run_id: Uuid::now_v7(),
            fetched: 3,
            active: 2,
            diff: SnapshotDiff {
                added: vec!["a".into(), "b".into()],
                removed: vec![],
            },
            archive_size: 3,
            merge: MergeStats::default(),
            publish: PublishOutcome::DryRun,
            elapsed: Duration::from_millis(5),
        };
        assert_eq!(
            report.summary(),
            "Total opportunities: 3\nTotal active opportunities: 2\nTotal added: 2\nTotal removed: 0"
        );
    }

    #[tokio::test]
    async fn fresh_run_writes_archive_current_and_readme() {
        let server = serve(&three_postings()).await;
        let dir = temp_dir();
        std::fs::write(dir.join("README.md"), README).unwrap();
        let config = run_config(&dir, &format!("{}/listings.json", server.uri()));

        let report = sync_listings(&config, today(), &SilentProgress).await.unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.active, 2);
        assert_eq!(report.diff.added.len(), 2);
        assert!(report.diff.removed.is_empty());
        assert_eq!(report.publish, PublishOutcome::Published { rows: 2 });

        assert_eq!(read_ids(&config.archive_path), vec!["fall", "inactive", "spring"]);
        assert_eq!(read_ids(&config.current_path), vec!["spring", "fall"]);

        let readme = std::fs::read_to_string(&config.readme_path).unwrap();
        assert!(readme.contains(
            "| Zürich Robotics | Robotics Intern |  | Spring 2027 |  | [Apply Here](https://example.com/spring) |\n| Acme | SWE Intern | NYC | Fall 2027 | 2025-10-17 | [Apply Here](https://example.com/fall) |\n## About"
        ));
        assert!(!readme.contains("| Old |"));
        assert!(readme.starts_with("# Internships\n\n## Latest Internships\n"));

        let archive = std::fs::read_to_string(&config.archive_path).unwrap();
        assert!(archive.contains("Zürich Robotics"));
        assert!(archive.starts_with("[\n    {"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let server = serve(&three_postings()).await;
        let dir = temp_dir();
        std::fs::write(dir.join("README.md"), README).unwrap();
        let config = run_config(&dir, &format!("{}/listings.json", server.uri()));

        sync_listings(&config, today(), &SilentProgress).await.unwrap();
        let archive_once = std::fs::read(&config.archive_path).unwrap();
        let current_once = std::fs::read(&config.current_path).unwrap();
        let readme_once = std::fs::read(&config.readme_path).unwrap();

        let report = sync_listings(&config, today(), &SilentProgress).await.unwrap();
        assert!(report.diff.added.is_empty());
        assert!(report.diff.removed.is_empty());
        assert_eq!(report.merge.unchanged, 3);

        assert_eq!(std::fs::read(&config.archive_path).unwrap(), archive_once);
        assert_eq!(std::fs::read(&config.current_path).unwrap(), current_once);
        assert_eq!(std::fs::read(&config.readme_path).unwrap(), readme_once);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn vanished_posting_stays_archived_but_leaves_current() {
        let dir = temp_dir();
        std::fs::write(dir.join("README.md"), README).unwrap();

        let first = serve(&three_postings()).await;
        let config = run_config(&dir, &format!("{}/listings.json", first.uri()));
        sync_listings(&config, today(), &SilentProgress).await.unwrap();

        let mut shrunk = three_postings();
        shrunk.as_array_mut().unwrap().retain(|p| p["id"] != "spring");
        let second = serve(&shrunk).await;
        let config = run_config(&dir, &format!("{}/listings.json", second.uri()));
        let report = sync_listings(&config, today(), &SilentProgress).await.unwrap();

        assert_eq!(report.diff.removed, vec!["spring"]);
        assert_eq!(report.archive_size, 3);
        assert_eq!(read_ids(&config.archive_path), vec!["fall", "inactive", "spring"]);
        assert_eq!(read_ids(&config.current_path), vec!["fall"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_marker_skips_readme_but_writes_json() {
        let server = serve(&three_postings()).await;
        let dir = temp_dir();
        let original = "# Internships\n\nNo table here.\n";
        std::fs::write(dir.join("README.md"), original).unwrap();
        let config = run_config(&dir, &format!("{}/listings.json", server.uri()));

        let report = sync_listings(&config, today(), &SilentProgress).await.unwrap();

        assert_eq!(
            report.publish,
            PublishOutcome::Skipped(SpliceError::MarkerNotFound)
        );
        assert_eq!(std::fs::read_to_string(&config.readme_path).unwrap(), original);
        assert_eq!(read_ids(&config.current_path).len(), 2);
        assert_eq!(read_ids(&config.archive_path).len(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn fetch_failure_writes_nothing() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let dir = temp_dir();
        let config = run_config(&dir, &format!("{}/listings.json", server.uri()));

        let err = sync_listings(&config, today(), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, InternwatchError::Network(_)));
        assert!(!config.archive_path.exists());
        assert!(!config.current_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn dry_run_touches_nothing() {
        let server = serve(&three_postings()).await;
        let dir = temp_dir();
        let mut config = run_config(&dir, &format!("{}/listings.json", server.uri()));
        config.dry_run = true;

        let report = sync_listings(&config, today(), &SilentProgress).await.unwrap();

        assert_eq!(report.publish, PublishOutcome::DryRun);
        assert_eq!(report.active, 2);
        assert!(!config.archive_path.exists());
        assert!(!config.readme_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_readme_is_an_error_after_json_writes() {
        let server = serve(&three_postings()).await;
        let dir = temp_dir();
        let config = run_config(&dir, &format!("{}/listings.json", server.uri()));

        let err = sync_listings(&config, today(), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, InternwatchError::Io { .. }));
        assert!(config.archive_path.exists());
        assert!(config.current_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
