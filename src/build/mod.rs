//! Build Orchestrator
//!
//! Drives document generation: decides which groups need (re)generation,
//! calls the provider sequentially with retry and pacing, writes the output,
//! and records every produced document in the metadata store. One group's
//! failure is recorded and the run continues; the pending change-set is
//! cleared only after at least one document was actually generated.

use std::fs;
use std::path::PathBuf;

use backon::{ExponentialBuilder, Retryable};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::ai::{SharedProvider, build_prompt};
use crate::config::Config;
use crate::constants::provider::{BASE_DELAY_MS, MAX_DELAY_SECS, MAX_RETRIES};
use crate::group::{FileGroup, sanitize_key};
use crate::project::ProjectPaths;
use crate::store::{MetadataStore, PendingStore};
use crate::types::{DriftError, PendingChangeSet, Result};

// =============================================================================
// Options and Summary
// =============================================================================

/// Build pass options
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Regenerate every group regardless of freshness
    pub force: bool,
    /// Only build groups whose key or member paths contain this substring
    /// (case-insensitive)
    pub filter: Option<String>,
}

/// Filter match over the group key or any member path, case-insensitive
fn matches_filter(group: &FileGroup, filter: &str) -> bool {
    let needle = filter.to_lowercase();
    group.key.to_lowercase().contains(&needle)
        || group
            .files
            .iter()
            .any(|f| f.path.to_lowercase().contains(&needle))
}

/// Outcome counts for one build pass
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub generated: usize,
    pub skipped: usize,
    pub errored: usize,
    /// (group key, error message) for every failed group
    pub failures: Vec<(String, String)>,
}

// =============================================================================
// Builder
// =============================================================================

/// Sequential document builder over a provider
pub struct DocumentBuilder<'a> {
    provider: SharedProvider,
    config: &'a Config,
    paths: &'a ProjectPaths,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(provider: SharedProvider, config: &'a Config, paths: &'a ProjectPaths) -> Self {
        Self {
            provider,
            config,
            paths,
        }
    }

    /// Relative output path for a group:
    /// `{docsDir}/{category}/{sanitized key}.md`
    pub fn doc_relative_path(&self, group: &FileGroup) -> String {
        format!(
            "{}/{}/{}.md",
            self.config.docs_dir,
            group.category,
            sanitize_key(&group.key)
        )
    }

    fn doc_absolute_path(&self, relative: &str) -> PathBuf {
        self.paths.root().join(relative)
    }

    /// A group is built when forced, when its document does not exist yet,
    /// or when detection marked the document as affected
    fn needs_build(&self, relative: &str, options: &BuildOptions, pending: &PendingChangeSet) -> bool {
        options.force || !self.doc_absolute_path(relative).exists() || pending.affects(relative)
    }

    async fn generate_with_retry(&self, prompt: &str) -> Result<String> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(std::time::Duration::from_millis(BASE_DELAY_MS))
            .with_max_delay(std::time::Duration::from_secs(MAX_DELAY_SECS))
            .with_max_times(MAX_RETRIES);

        (|| async { self.provider.generate(prompt).await })
            .retry(backoff)
            .when(|e: &DriftError| e.is_retryable())
            .notify(|e, duration| {
                warn!("Generation attempt failed, retrying in {:?}: {}", duration, e);
            })
            .await
    }

    /// Run one build pass over the given groups.
    ///
    /// Groups are processed strictly in order; generated markdown is written
    /// verbatim. The store is saved once at the end, and the pending set is
    /// cleared only when the pass generated at least one document, so a
    /// fully-failed pass leaves drift state intact for the next run.
    pub async fn build(
        &self,
        groups: &[FileGroup],
        options: &BuildOptions,
        store: &mut MetadataStore,
        pending_store: &PendingStore,
    ) -> Result<BuildSummary> {
        let pending = pending_store.load();
        let mut summary = BuildSummary::default();

        for group in groups {
            if let Some(filter) = &options.filter
                && !matches_filter(group, filter)
            {
                summary.skipped += 1;
                continue;
            }

            let relative = self.doc_relative_path(group);
            if !self.needs_build(&relative, options, &pending) {
                debug!(key = %group.key, "Document up to date, skipping");
                summary.skipped += 1;
                continue;
            }

            info!(key = %group.key, doc = %relative, "Generating document");
            let prompt = build_prompt(group, &self.config.language);

            match self.generate_with_retry(&prompt).await {
                Ok(markdown) => {
                    let absolute = self.doc_absolute_path(&relative);
                    if let Some(parent) = absolute.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&absolute, &markdown)?;

                    let references: Vec<String> =
                        group.files.iter().map(|f| f.path.clone()).collect();
                    store.refresh_fingerprints(&references);
                    store.add_document(&relative, references);
                    summary.generated += 1;

                    if let Some(spacing) = self.provider.request_spacing() {
                        debug!("Spacing {:?} before next request", spacing);
                        sleep(spacing).await;
                    }
                }
                Err(e) => {
                    warn!(key = %group.key, "Generation failed: {}", e);
                    summary.failures.push((group.key.clone(), e.to_string()));
                    summary.errored += 1;

                    // Back off before the next group after a rate limit
                    if let DriftError::Provider(provider_err) = &e
                        && provider_err.category == crate::types::ErrorCategory::RateLimit
                    {
                        let delay = provider_err.recommended_delay();
                        warn!("Rate limited, waiting {:?} before next group", delay);
                        sleep(delay).await;
                    }
                }
            }
        }

        store.save()?;

        if summary.generated > 0 {
            pending_store.clear()?;
        }

        info!(
            generated = summary.generated,
            skipped = summary.skipped,
            errored = summary.errored,
            "Build pass complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GenerationProvider;
    use crate::types::{Category, ErrorCategory, ProviderError, TrackedFile};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FakeProvider {
        calls: AtomicUsize,
        fail_first: usize,
        category: ErrorCategory,
    }

    impl FakeProvider {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_first: 0,
                category: ErrorCategory::Transient,
            })
        }

        fn failing(fail_first: usize, category: ErrorCategory) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_first,
                category,
            })
        }
    }

    #[async_trait]
    impl GenerationProvider for FakeProvider {
        async fn generate(&self, prompt: &str) -> crate::types::Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(ProviderError::with_provider(self.category, "injected", "fake").into());
            }
            Ok(format!("# Generated\n\nPrompt bytes: {}\n", prompt.len()))
        }

        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-1"
        }

        async fn health_check(&self) -> crate::types::Result<bool> {
            Ok(true)
        }
    }

    fn tracked(path: &str) -> TrackedFile {
        TrackedFile {
            id: "0123456789ab".into(),
            path: path.into(),
            lines: [1, 10],
            hash: Some("h".into()),
            updated_at: Utc::now(),
        }
    }

    fn group(key: &str, files: &[&str]) -> FileGroup {
        FileGroup {
            key: key.into(),
            title: key.into(),
            category: Category::Features,
            files: files.iter().map(|p| tracked(p)).collect(),
            main_file: None,
        }
    }

    fn setup(temp: &TempDir) -> (ProjectPaths, Config, MetadataStore, PendingStore) {
        let paths = ProjectPaths::at(temp.path());
        let config = Config::default();
        let store = MetadataStore::open(paths.clone());
        let pending = PendingStore::new(paths.clone());
        (paths, config, store, pending)
    }

    #[tokio::test]
    async fn test_build_writes_document_and_records_it() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        let builder = DocumentBuilder::new(FakeProvider::ok(), &config, &paths);

        let groups = vec![group("lib/auth", &["src/lib/auth/login.ts"])];
        let summary = builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();

        assert_eq!(summary.generated, 1);
        assert_eq!(summary.errored, 0);

        let doc = temp.path().join("docs/features/lib-auth.md");
        assert!(doc.is_file());
        assert!(fs::read_to_string(doc).unwrap().starts_with("# Generated"));
        assert_eq!(store.documents().len(), 1);
        assert_eq!(
            store.documents()[0].references,
            vec!["src/lib/auth/login.ts"]
        );
    }

    #[tokio::test]
    async fn test_existing_fresh_document_is_skipped() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        let provider = FakeProvider::ok();
        let builder = DocumentBuilder::new(provider.clone(), &config, &paths);
        let groups = vec![group("lib/auth", &["src/lib/auth/login.ts"])];

        builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();
        let summary = builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();

        assert_eq!(summary.generated, 0);
        assert_eq!(summary.skipped, 1);
        // The skipped pass must not have touched the provider
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_rebuilds_existing_document() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        let builder = DocumentBuilder::new(FakeProvider::ok(), &config, &paths);
        let groups = vec![group("lib/auth", &["src/lib/auth/login.ts"])];
        let options = BuildOptions {
            force: true,
            filter: None,
        };

        builder
            .build(&groups, &options, &mut store, &pending_store)
            .await
            .unwrap();
        let summary = builder
            .build(&groups, &options, &mut store, &pending_store)
            .await
            .unwrap();
        assert_eq!(summary.generated, 1);
    }

    #[tokio::test]
    async fn test_filter_limits_groups() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        let builder = DocumentBuilder::new(FakeProvider::ok(), &config, &paths);
        let groups = vec![
            group("lib/auth", &["src/lib/auth/login.ts"]),
            group("hooks/queries", &["src/hooks/queries/useAuth.ts"]),
        ];
        let options = BuildOptions {
            force: false,
            filter: Some("auth".to_string()),
        };

        let summary = builder
            .build(&groups, &options, &mut store, &pending_store)
            .await
            .unwrap();
        // "auth" matches lib/auth only
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive_and_covers_member_paths() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        let builder = DocumentBuilder::new(FakeProvider::ok(), &config, &paths);
        let groups = vec![
            group("lib/auth", &["src/lib/auth/login.ts"]),
            group("hooks/queries", &["src/hooks/queries/useUsers.ts"]),
        ];

        // Uppercase filter still matches the lib/auth key
        let options = BuildOptions {
            force: true,
            filter: Some("AUTH".to_string()),
        };
        let summary = builder
            .build(&groups, &options, &mut store, &pending_store)
            .await
            .unwrap();
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.skipped, 1);

        // A member file name selects its group even when the key misses
        let options = BuildOptions {
            force: true,
            filter: Some("login.ts".to_string()),
        };
        let summary = builder
            .build(&groups, &options, &mut store, &pending_store)
            .await
            .unwrap();
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        let provider = FakeProvider::failing(1, ErrorCategory::Transient);
        let builder = DocumentBuilder::new(provider.clone(), &config, &paths);
        let groups = vec![group("lib/auth", &["src/lib/auth/login.ts"])];

        let summary = builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();
        assert_eq!(summary.generated, 1);
        assert!(provider.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried_and_run_continues() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        let provider = FakeProvider::failing(1, ErrorCategory::Auth);
        let builder = DocumentBuilder::new(provider.clone(), &config, &paths);
        let groups = vec![
            group("lib/auth", &["src/lib/auth/login.ts"]),
            group("hooks/queries", &["src/hooks/queries/useAuth.ts"]),
        ];

        let summary = builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();
        assert_eq!(summary.errored, 1);
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "lib/auth");
        // One failed call, no retry, then one successful call for group two
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pending_cleared_only_after_generation() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        pending_store
            .save(&PendingChangeSet {
                timestamp: Some(Utc::now()),
                changed_files: vec!["src/lib/auth/login.ts".into()],
                affected_docs: vec!["docs/features/lib-auth.md".into()],
                missing_files: vec![],
            })
            .unwrap();

        // All generation fails: pending must survive
        let failing = FakeProvider::failing(usize::MAX, ErrorCategory::Auth);
        let builder = DocumentBuilder::new(failing, &config, &paths);
        let groups = vec![group("lib/auth", &["src/lib/auth/login.ts"])];
        builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();
        assert!(pending_store.exists());

        // A successful pass clears it
        let builder = DocumentBuilder::new(FakeProvider::ok(), &config, &paths);
        builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();
        assert!(!pending_store.exists());
    }

    #[tokio::test]
    async fn test_pending_affected_document_is_rebuilt() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut store, pending_store) = setup(&temp);
        let builder = DocumentBuilder::new(FakeProvider::ok(), &config, &paths);
        let groups = vec![group("lib/auth", &["src/lib/auth/login.ts"])];

        builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();

        pending_store
            .save(&PendingChangeSet {
                timestamp: Some(Utc::now()),
                changed_files: vec!["src/lib/auth/login.ts".into()],
                affected_docs: vec!["docs/features/lib-auth.md".into()],
                missing_files: vec![],
            })
            .unwrap();

        let summary = builder
            .build(&groups, &BuildOptions::default(), &mut store, &pending_store)
            .await
            .unwrap();
        assert_eq!(summary.generated, 1);
    }
}
