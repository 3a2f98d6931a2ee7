use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tracing::{info, warn};

use crate::censor::{CensorResult, ProfanityCensor, Vocabulary};
use crate::config::Config;
use crate::error::{CapsubError, Result};
use crate::project::{Project, base_name_for, parse_project, resolve_descriptor, scan_directory};
use crate::storage::{LocalStore, Session};
use crate::subtitle::{ExportOutcome, generate_srt};
use crate::translate::{LanguageModel, TranslationStatus, translate_subtitles};

pub struct Workflow {
    config: Config,
    censor: ProfanityCensor,
    store: LocalStore,
    translating: AtomicBool,
}

/// Clears the in-flight flag when a translation ends, however it ends
struct TranslationGuard<'a>(&'a AtomicBool);

impl Drop for TranslationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let censor = ProfanityCensor::from_config(&config.censor, &Vocabulary::builtin())?;
        let store = LocalStore::new(config.storage.resolve_dir());
        Ok(Self::with_parts(config, censor, store))
    }

    pub fn with_parts(config: Config, censor: ProfanityCensor, store: LocalStore) -> Self {
        Self {
            config,
            censor,
            store,
            translating: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Discover projects under `dir`; finding none is an error for the caller to show
    pub fn scan_projects<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<Project>> {
        let dir = dir.as_ref();
        let projects = scan_directory(dir)?;
        if projects.is_empty() {
            return Err(CapsubError::NoProjects(dir.display().to_string()));
        }
        Ok(projects)
    }

    /// Parse a project and make it the current session
    pub async fn open_project<P: AsRef<Path>>(&self, input: P, name: Option<&str>) -> Result<Session> {
        let descriptor = resolve_descriptor(input)?;
        info!("Opening project: {}", descriptor.display());

        let content = fs::read_to_string(&descriptor).await?;
        let subtitles = parse_project(&content)?;
        if subtitles.is_empty() {
            return Err(CapsubError::NoSubtitles(descriptor.display().to_string()));
        }

        let file_name = match name {
            Some(name) => name.to_string(),
            None => {
                let project_name = descriptor
                    .parent()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                base_name_for(&project_name, &self.config.output.default_name)
            }
        };

        info!("Loaded {} subtitles as '{}'", subtitles.len(), file_name);
        let session = Session { subtitles, file_name };
        self.persist(&session);
        Ok(session)
    }

    pub fn resume_session(&self) -> Option<Session> {
        self.store.load_session()
    }

    /// The subtitles as they would be exported; the session itself is never modified.
    ///
    /// Censoring applies only when both the caller and `[censor] enabled` allow it.
    pub fn censored_view(&self, session: &Session, censor_enabled: bool) -> CensorResult {
        if censor_enabled && self.config.censor.enabled {
            self.censor.filter(&session.subtitles)
        } else {
            CensorResult::unfiltered(&session.subtitles)
        }
    }

    pub async fn export(
        &self,
        session: &Session,
        censor_enabled: bool,
        output_dir: Option<&Path>,
        name: Option<&str>,
    ) -> Result<(ExportOutcome, CensorResult)> {
        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => self.config.output.directory.clone().unwrap_or_else(|| PathBuf::from(".")),
        };
        fs::create_dir_all(&output_dir).await?;

        let view = self.censored_view(session, censor_enabled);
        let base_name = name.unwrap_or(session.file_name.as_str());
        let outcome = generate_srt(&view.subtitles, base_name, &output_dir).await?;
        Ok((outcome, view))
    }

    /// Translate the session's original subtitles in place.
    ///
    /// On any failure, including a misaligned response, the session is left
    /// exactly as it was.
    pub async fn translate(
        &self,
        session: &mut Session,
        model: &dyn LanguageModel,
        target_language: &str,
    ) -> Result<TranslationStatus> {
        let _guard = self.begin_translation()?;

        let outcome = translate_subtitles(model, &session.subtitles, target_language).await?;
        if let TranslationStatus::Misaligned { expected, received } = outcome.status {
            return Err(CapsubError::TranslationMisalignment { expected, received });
        }

        session.subtitles = outcome.subtitles;
        session.file_name = format!("{}-{}", session.file_name, target_language.to_lowercase());
        self.persist(session);
        Ok(outcome.status)
    }

    /// Validate a key with a round trip and store it only if it works
    pub async fn store_api_key(&self, model: &dyn LanguageModel, api_key: &str) -> Result<()> {
        model.check_credential().await?;
        self.store.save_credential(api_key)
    }

    /// Explicit key, then the configured environment variable, then the stored key
    pub fn resolve_api_key(&self, explicit: Option<String>) -> Option<String> {
        explicit
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.config.translate.api_key_env).ok().filter(|k| !k.trim().is_empty()))
            .or_else(|| self.store.load_credential())
    }

    fn begin_translation(&self) -> Result<TranslationGuard<'_>> {
        self.translating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CapsubError::TranslationInProgress)?;
        Ok(TranslationGuard(&self.translating))
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save_session(session) {
            warn!("Failed to save session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::SubtitleEntry;
    use crate::translate::MockLanguageModel;

    fn workflow(dir: &Path) -> Workflow {
        let config = Config::default();
        let censor = ProfanityCensor::new(&["damn"]).unwrap();
        Workflow::with_parts(config, censor, LocalStore::new(dir.join("store")))
    }

    fn session() -> Session {
        Session {
            subtitles: vec![
                SubtitleEntry::new(1, 0, 1_000, "damn it"),
                SubtitleEntry::new(2, 1_000, 2_000, "fine"),
            ],
            file_name: "clip".to_string(),
        }
    }

    fn model_returning(response: &'static str) -> MockLanguageModel {
        let mut model = MockLanguageModel::new();
        model.expect_name().return_const("mock".to_string());
        model.expect_generate().returning(move |_| Ok(response.to_string()));
        model
    }

    #[tokio::test]
    async fn test_translate_replaces_original_and_renames() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());
        let mut session = session();

        let status = workflow
            .translate(&mut session, &model_returning("1. verdammt\n2. gut"), "DE")
            .await
            .unwrap();

        assert_eq!(status, TranslationStatus::Complete);
        assert_eq!(session.file_name, "clip-de");
        assert_eq!(session.subtitles[0].text(), "verdammt");
        assert_eq!(workflow.resume_session(), Some(session));
    }

    #[tokio::test]
    async fn test_misaligned_translation_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());
        let mut session = session();

        let result = workflow
            .translate(&mut session, &model_returning("a\nb\nc"), "de")
            .await;

        assert!(matches!(result, Err(CapsubError::TranslationMisalignment { expected: 2, received: 3 })));
        assert_eq!(session, self::session());
    }

    #[tokio::test]
    async fn test_failed_translation_keeps_session_and_releases_guard() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());
        let mut session = session();

        let mut model = MockLanguageModel::new();
        model.expect_name().return_const("mock".to_string());
        model
            .expect_generate()
            .returning(|_| Err(CapsubError::Translation("offline".to_string())));

        assert!(workflow.translate(&mut session, &model, "de").await.is_err());
        assert_eq!(session, self::session());
        assert!(workflow.begin_translation().is_ok());
    }

    #[tokio::test]
    async fn test_only_one_translation_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());
        let mut session = session();

        let _held = workflow.begin_translation().unwrap();
        let result = workflow
            .translate(&mut session, &MockLanguageModel::new(), "de")
            .await;

        assert!(matches!(result, Err(CapsubError::TranslationInProgress)));
    }

    #[test]
    fn test_censored_view_is_derived() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());
        let session = session();

        let view = workflow.censored_view(&session, true);
        assert_eq!(view.subtitles[0].text(), "d**n it");
        assert_eq!(view.replaced_words.get("damn"), Some(&1));
        assert_eq!(session.subtitles[0].text(), "damn it");

        let plain = workflow.censored_view(&session, false);
        assert_eq!(plain.subtitles, session.subtitles);
        assert!(plain.replaced_words.is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_censored_file() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());

        let (outcome, view) = workflow
            .export(&session(), true, Some(dir.path()), None)
            .await
            .unwrap();

        assert_eq!(outcome, ExportOutcome::Written(dir.path().join("clip.srt")));
        assert_eq!(view.total_replacements(), 1);
        let content = std::fs::read_to_string(dir.path().join("clip.srt")).unwrap();
        assert!(content.starts_with("1\n00:00:00,000 --> 00:00:01,000\nd**n it\n\n2\n"));
    }

    #[tokio::test]
    async fn test_store_api_key_only_when_valid() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());

        let mut rejecting = MockLanguageModel::new();
        rejecting
            .expect_check_credential()
            .returning(|| Err(CapsubError::CredentialInvalid("403".to_string())));
        assert!(workflow.store_api_key(&rejecting, "bad").await.is_err());
        assert_eq!(workflow.store().load_credential(), None);

        let mut accepting = MockLanguageModel::new();
        accepting.expect_check_credential().returning(|| Ok(()));
        workflow.store_api_key(&accepting, "good").await.unwrap();
        assert_eq!(workflow.store().load_credential().as_deref(), Some("good"));
    }
}
