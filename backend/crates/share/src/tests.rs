//! Unit tests for the share crate
//!
//! Repositories are replaced by in-memory maps so the access flows and
//! the HTTP surface run without a database.

#[cfg(test)]
pub(crate) mod support {
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use kernel::email::Email;
    use kernel::id::{AdminId, OtpChallengeId, ProjectId, RecipientId, ShareSessionId};
    use kernel::principal::AdminPrincipal;
    use platform::client::ClientFingerprint;
    use platform::crypto::sha256;

    use crate::application::config::ShareConfig;
    use crate::application::{
        CreateProjectInput, OtpMessage, OtpSender, ProjectAdminUseCase, ShareSettingsInput,
    };
    use crate::domain::entity::{
        otp_challenge::OtpChallenge, project::Project, recipient::Recipient,
        share_session::ShareSession,
    };
    use crate::domain::repository::{
        OtpChallengeRepository, ProjectRepository, RecipientRepository, ShareSessionRepository,
    };
    use crate::domain::value_object::{
        auth_mode::AuthMode, project_status::ProjectStatus, share_slug::ShareSlug,
    };
    use crate::error::{ShareError, ShareResult};

    pub const SHARE_PASSWORD: &str = "Dailies-Review-2025";
    pub const CLIENT_EMAIL: &str = "producer@client.com";
    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh) Safari/17.0";

    #[derive(Clone, Default)]
    pub struct MemoryShareRepository {
        pub projects: Arc<Mutex<HashMap<ProjectId, Project>>>,
        pub recipients: Arc<Mutex<Vec<Recipient>>>,
        pub sessions: Arc<Mutex<HashMap<ShareSessionId, ShareSession>>>,
        pub challenges: Arc<Mutex<HashMap<OtpChallengeId, OtpChallenge>>>,
    }

    impl MemoryShareRepository {
        pub fn project(&self, project_id: ProjectId) -> Project {
            self.projects
                .lock()
                .unwrap()
                .get(&project_id)
                .cloned()
                .unwrap()
        }

        pub fn challenge_count(&self) -> usize {
            self.challenges.lock().unwrap().len()
        }
    }

    impl ProjectRepository for MemoryShareRepository {
        async fn create_project(&self, project: &Project) -> ShareResult<()> {
            let mut projects = self.projects.lock().unwrap();
            if projects.values().any(|p| p.slug == project.slug) {
                return Err(ShareError::SlugTaken);
            }
            projects.insert(project.project_id, project.clone());
            Ok(())
        }

        async fn find_project_by_id(&self, project_id: ProjectId) -> ShareResult<Option<Project>> {
            Ok(self.projects.lock().unwrap().get(&project_id).cloned())
        }

        async fn find_project_by_slug(&self, slug: &ShareSlug) -> ShareResult<Option<Project>> {
            Ok(self
                .projects
                .lock()
                .unwrap()
                .values()
                .find(|p| p.slug == *slug)
                .cloned())
        }

        async fn list_projects(&self) -> ShareResult<Vec<Project>> {
            let mut projects: Vec<_> = self.projects.lock().unwrap().values().cloned().collect();
            projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(projects)
        }

        async fn update_project(&self, project: &Project) -> ShareResult<()> {
            if let Some(p) = self.projects.lock().unwrap().get_mut(&project.project_id) {
                p.title = project.title.clone();
                p.description = project.description.clone();
                p.auth_mode = project.auth_mode;
                p.share_password = project.share_password.clone();
                p.guest_mode = project.guest_mode;
                p.guest_latest_only = project.guest_latest_only;
                p.allow_downloads = project.allow_downloads;
                p.updated_at = project.updated_at;
            }
            Ok(())
        }

        async fn bump_auth_version(&self, project_id: ProjectId) -> ShareResult<Option<i32>> {
            Ok(self.projects.lock().unwrap().get_mut(&project_id).map(|p| {
                p.bump_auth_version();
                p.auth_version
            }))
        }

        async fn update_project_status(
            &self,
            project_id: ProjectId,
            status: ProjectStatus,
        ) -> ShareResult<Option<i32>> {
            Ok(self.projects.lock().unwrap().get_mut(&project_id).map(|p| {
                p.set_status(status);
                p.auth_version
            }))
        }

        async fn set_project_status(
            &self,
            project_id: ProjectId,
            status: ProjectStatus,
        ) -> ShareResult<()> {
            if let Some(p) = self.projects.lock().unwrap().get_mut(&project_id) {
                if !p.is_archived() {
                    p.status = status;
                }
            }
            Ok(())
        }
    }

    impl RecipientRepository for MemoryShareRepository {
        async fn add_recipient(&self, recipient: &Recipient) -> ShareResult<()> {
            self.recipients.lock().unwrap().push(recipient.clone());
            Ok(())
        }

        async fn find_recipient(
            &self,
            project_id: ProjectId,
            email: &Email,
        ) -> ShareResult<Option<Recipient>> {
            Ok(self
                .recipients
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.project_id == project_id && r.email == *email)
                .cloned())
        }

        async fn list_recipients(&self, project_id: ProjectId) -> ShareResult<Vec<Recipient>> {
            Ok(self
                .recipients
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.project_id == project_id)
                .cloned()
                .collect())
        }

        async fn remove_recipient(
            &self,
            project_id: ProjectId,
            recipient_id: RecipientId,
        ) -> ShareResult<Option<Recipient>> {
            let mut recipients = self.recipients.lock().unwrap();
            let pos = recipients
                .iter()
                .position(|r| r.project_id == project_id && r.recipient_id == recipient_id);
            Ok(pos.map(|i| recipients.remove(i)))
        }
    }

    impl ShareSessionRepository for MemoryShareRepository {
        async fn create_share_session(&self, session: &ShareSession) -> ShareResult<()> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.session_id, session.clone());
            Ok(())
        }

        async fn find_share_session(
            &self,
            session_id: ShareSessionId,
        ) -> ShareResult<Option<ShareSession>> {
            Ok(self.sessions.lock().unwrap().get(&session_id).cloned())
        }

        async fn touch_share_session(&self, session: &ShareSession) -> ShareResult<()> {
            if let Some(s) = self.sessions.lock().unwrap().get_mut(&session.session_id) {
                s.last_activity_at = session.last_activity_at;
            }
            Ok(())
        }

        async fn revoke_share_session(&self, session_id: ShareSessionId) -> ShareResult<()> {
            if let Some(s) = self.sessions.lock().unwrap().get_mut(&session_id) {
                s.revoked_at.get_or_insert_with(Utc::now);
            }
            Ok(())
        }

        async fn revoke_project_sessions(&self, project_id: ProjectId) -> ShareResult<u64> {
            let mut revoked = 0;
            for s in self.sessions.lock().unwrap().values_mut() {
                if s.project_id == project_id && s.revoked_at.is_none() {
                    s.revoked_at = Some(Utc::now());
                    revoked += 1;
                }
            }
            Ok(revoked)
        }

        async fn revoke_recipient_sessions(
            &self,
            project_id: ProjectId,
            email: &Email,
        ) -> ShareResult<u64> {
            let mut revoked = 0;
            for s in self.sessions.lock().unwrap().values_mut() {
                if s.project_id == project_id
                    && s.recipient_email.as_ref() == Some(email)
                    && s.revoked_at.is_none()
                {
                    s.revoked_at = Some(Utc::now());
                    revoked += 1;
                }
            }
            Ok(revoked)
        }

        async fn list_active_sessions(
            &self,
            project_id: ProjectId,
        ) -> ShareResult<Vec<ShareSession>> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.project_id == project_id && s.is_active())
                .cloned()
                .collect())
        }

        async fn cleanup_expired_share_sessions(&self) -> ShareResult<u64> {
            let mut sessions = self.sessions.lock().unwrap();
            let before = sessions.len();
            sessions.retain(|_, s| s.is_active());
            Ok((before - sessions.len()) as u64)
        }
    }

    impl OtpChallengeRepository for MemoryShareRepository {
        async fn replace_otp_challenge(&self, challenge: &OtpChallenge) -> ShareResult<()> {
            let mut challenges = self.challenges.lock().unwrap();
            challenges.retain(|_, c| {
                !(c.project_id == challenge.project_id && c.email == challenge.email)
            });
            challenges.insert(challenge.challenge_id, challenge.clone());
            Ok(())
        }

        async fn find_latest_otp_challenge(
            &self,
            project_id: ProjectId,
            email: &Email,
        ) -> ShareResult<Option<OtpChallenge>> {
            Ok(self
                .challenges
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.project_id == project_id && c.email == *email)
                .max_by_key(|c| c.created_at)
                .cloned())
        }

        async fn increment_otp_attempts(
            &self,
            challenge_id: OtpChallengeId,
        ) -> ShareResult<Option<i16>> {
            Ok(self
                .challenges
                .lock()
                .unwrap()
                .get_mut(&challenge_id)
                .map(|c| {
                    c.attempts += 1;
                    c.attempts
                }))
        }

        async fn consume_otp_challenge(&self, challenge_id: OtpChallengeId) -> ShareResult<bool> {
            Ok(self.challenges.lock().unwrap().remove(&challenge_id).is_some())
        }

        async fn cleanup_expired_otp_challenges(&self) -> ShareResult<u64> {
            let mut challenges = self.challenges.lock().unwrap();
            let before = challenges.len();
            challenges.retain(|_, c| !c.is_expired());
            Ok((before - challenges.len()) as u64)
        }
    }

    /// Keeps every delivered code for inspection
    #[derive(Clone, Default)]
    pub struct RecordingSender {
        pub sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingSender {
        /// Delivery runs on a spawned task; give it a chance to finish
        pub async fn wait_for(&self, count: usize) -> Vec<(String, String)> {
            for _ in 0..100 {
                if self.sent.lock().unwrap().len() >= count {
                    break;
                }
                tokio::task::yield_now().await;
            }
            self.sent.lock().unwrap().clone()
        }
    }

    impl OtpSender for RecordingSender {
        async fn send_otp(&self, message: &OtpMessage) -> ShareResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push((message.to.to_string(), message.code.as_str().to_string()));
            Ok(())
        }
    }

    pub fn fingerprint(user_agent: &str) -> ClientFingerprint {
        ClientFingerprint::new(
            sha256(user_agent.as_bytes()),
            Some(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 23))),
            Some(user_agent.to_string()),
        )
    }

    pub fn config() -> Arc<ShareConfig> {
        Arc::new(ShareConfig::development())
    }

    pub fn admin() -> AdminPrincipal {
        AdminPrincipal {
            admin_id: AdminId::new(),
            email: Email::new("editor@studio.com").unwrap(),
            display_name: Some("Editor".to_string()),
        }
    }

    pub async fn create_project(
        repo: &Arc<MemoryShareRepository>,
        slug: &str,
        settings: ShareSettingsInput,
    ) -> Project {
        ProjectAdminUseCase::new(repo.clone(), config())
            .create(
                &admin(),
                CreateProjectInput {
                    slug: slug.to_string(),
                    title: "Spring Campaign".to_string(),
                    description: Some("Director's cut".to_string()),
                    settings,
                },
            )
            .await
            .unwrap()
    }

    pub fn password_settings() -> ShareSettingsInput {
        ShareSettingsInput {
            auth_mode: Some(AuthMode::Password),
            password: Some(SHARE_PASSWORD.to_string()),
            ..Default::default()
        }
    }

    pub fn otp_settings() -> ShareSettingsInput {
        ShareSettingsInput {
            auth_mode: Some(AuthMode::Otp),
            ..Default::default()
        }
    }

    pub fn open_settings() -> ShareSettingsInput {
        ShareSettingsInput {
            auth_mode: Some(AuthMode::None),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use kernel::email::Email;
    use platform::rate_limit::{MemoryRateLimitStore, RateLimitConfig};

    use super::support::*;
    use crate::application::config::ShareConfig;
    use crate::application::{
        CheckShareSessionUseCase, GuestAccessUseCase, OpenAccessUseCase, ProjectAdminUseCase,
        RecipientAdminUseCase, SendOtpUseCase, SessionAdminUseCase, ShareInfoUseCase,
        ShareSettingsInput, ShareSignOutUseCase, UpdateProjectInput, VerifyOtpUseCase,
        VerifyPasswordUseCase,
    };
    use crate::domain::repository::ShareSessionRepository;
    use crate::domain::value_object::{access_method::AccessMethod, project_status::ProjectStatus};
    use crate::error::ShareError;

    fn password_use_case(
        repo: &Arc<MemoryShareRepository>,
        config: Arc<ShareConfig>,
    ) -> VerifyPasswordUseCase<MemoryShareRepository, MemoryShareRepository, MemoryRateLimitStore>
    {
        VerifyPasswordUseCase::new(
            repo.clone(),
            repo.clone(),
            Arc::new(MemoryRateLimitStore::new()),
            config,
        )
    }

    fn check(
        repo: &Arc<MemoryShareRepository>,
        config: Arc<ShareConfig>,
    ) -> CheckShareSessionUseCase<MemoryShareRepository, MemoryShareRepository> {
        CheckShareSessionUseCase::new(repo.clone(), repo.clone(), config)
    }

    #[tokio::test]
    async fn test_share_info_reports_enabled_methods() {
        let repo = Arc::new(MemoryShareRepository::default());
        create_project(&repo, "spring-campaign", password_settings()).await;

        let info = ShareInfoUseCase::new(repo.clone())
            .execute("Spring-Campaign")
            .await
            .unwrap();
        assert!(info.password_enabled);
        assert!(!info.otp_enabled);
        assert!(!info.guest_enabled);

        let missing = ShareInfoUseCase::new(repo.clone()).execute("nope-nope").await;
        assert!(matches!(missing, Err(ShareError::ProjectNotFound)));

        let malformed = ShareInfoUseCase::new(repo).execute("no spaces!").await;
        assert!(matches!(malformed, Err(ShareError::ProjectNotFound)));
    }

    #[tokio::test]
    async fn test_archived_project_is_gone() {
        let repo = Arc::new(MemoryShareRepository::default());
        let project = create_project(&repo, "old-cut", open_settings()).await;
        ProjectAdminUseCase::new(repo.clone(), config())
            .set_status(project.project_id, ProjectStatus::Archived)
            .await
            .unwrap();

        let result = ShareInfoUseCase::new(repo).execute("old-cut").await;
        assert!(matches!(result, Err(ShareError::ProjectArchived)));
    }

    #[tokio::test]
    async fn test_open_access_only_when_mode_is_none() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        create_project(&repo, "open-cut", open_settings()).await;
        create_project(&repo, "locked-cut", password_settings()).await;

        let use_case = OpenAccessUseCase::new(repo.clone(), repo.clone(), config.clone());
        let fp = fingerprint(USER_AGENT);

        let issued = use_case.execute("open-cut", &fp).await.unwrap();
        assert_eq!(issued.viewer.method, AccessMethod::Open);

        let viewer = check(&repo, config).execute(&issued.token, &fp).await.unwrap();
        assert_eq!(viewer.session_id, issued.viewer.session_id);

        let denied = use_case.execute("locked-cut", &fp).await;
        assert!(matches!(denied, Err(ShareError::MethodNotAllowed)));
    }

    #[tokio::test]
    async fn test_password_access_issues_session() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        create_project(&repo, "spring-campaign", password_settings()).await;
        let fp = fingerprint(USER_AGENT);

        let issued = password_use_case(&repo, config.clone())
            .execute("spring-campaign", SHARE_PASSWORD, &fp)
            .await
            .unwrap();
        assert_eq!(issued.viewer.method, AccessMethod::Password);
        assert!(issued.viewer.recipient_email.is_none());

        let viewer = check(&repo, config).execute(&issued.token, &fp).await.unwrap();
        assert_eq!(viewer.method, AccessMethod::Password);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let repo = Arc::new(MemoryShareRepository::default());
        create_project(&repo, "spring-campaign", password_settings()).await;

        for attempt in ["", "dailies-review-2025", "Dailies-Review-2024"] {
            let result = password_use_case(&repo, config())
                .execute("spring-campaign", attempt, &fingerprint(USER_AGENT))
                .await;
            assert!(matches!(result, Err(ShareError::InvalidPassword)));
        }
        assert!(repo.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_password_attempts_rate_limited() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = Arc::new(ShareConfig {
            password_rate_limit: RateLimitConfig::new(2, 900),
            ..ShareConfig::development()
        });
        create_project(&repo, "spring-campaign", password_settings()).await;
        let use_case = password_use_case(&repo, config);
        let fp = fingerprint(USER_AGENT);

        for _ in 0..2 {
            let result = use_case.execute("spring-campaign", "wrong-guess", &fp).await;
            assert!(matches!(result, Err(ShareError::InvalidPassword)));
        }
        let limited = use_case.execute("spring-campaign", SHARE_PASSWORD, &fp).await;
        assert!(matches!(
            limited,
            Err(ShareError::RateLimited { retry_after_secs }) if retry_after_secs > 0
        ));
    }

    #[tokio::test]
    async fn test_password_attempts_capped_across_addresses() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = Arc::new(ShareConfig {
            password_project_rate_limit: RateLimitConfig::new(3, 900),
            ..ShareConfig::development()
        });
        create_project(&repo, "spring-campaign", password_settings()).await;
        let use_case = password_use_case(&repo, config);

        let from = |last: u8| {
            let mut fp = fingerprint(USER_AGENT);
            fp.ip = Some(std::net::IpAddr::from([10, 9, 8, last]));
            fp
        };
        for i in 0..3 {
            let result = use_case.execute("spring-campaign", "wrong-guess", &from(i)).await;
            assert!(matches!(result, Err(ShareError::InvalidPassword)));
        }
        let limited = use_case
            .execute("spring-campaign", "wrong-guess", &from(200))
            .await;
        assert!(matches!(limited, Err(ShareError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_guest_access_rate_limited_per_address() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = Arc::new(ShareConfig {
            guest_rate_limit: RateLimitConfig::new(2, 900),
            ..ShareConfig::development()
        });
        let settings = ShareSettingsInput {
            guest_mode: Some(true),
            ..password_settings()
        };
        create_project(&repo, "spring-campaign", settings).await;
        let use_case = GuestAccessUseCase::new(
            repo.clone(),
            repo.clone(),
            Arc::new(MemoryRateLimitStore::new()),
            config,
        );
        let fp = fingerprint(USER_AGENT);

        for _ in 0..2 {
            assert!(use_case.execute("spring-campaign", &fp).await.is_ok());
        }
        let limited = use_case.execute("spring-campaign", &fp).await;
        assert!(matches!(
            limited,
            Err(ShareError::RateLimited { retry_after_secs }) if retry_after_secs > 0
        ));
    }

    #[tokio::test]
    async fn test_guest_access_requires_guest_mode() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        let project = create_project(&repo, "spring-campaign", password_settings()).await;
        let use_case = GuestAccessUseCase::new(
            repo.clone(),
            repo.clone(),
            Arc::new(MemoryRateLimitStore::new()),
            config.clone(),
        );
        let fp = fingerprint(USER_AGENT);

        let denied = use_case.execute("spring-campaign", &fp).await;
        assert!(matches!(denied, Err(ShareError::MethodNotAllowed)));

        ProjectAdminUseCase::new(repo.clone(), config.clone())
            .update(
                project.project_id,
                UpdateProjectInput {
                    settings: ShareSettingsInput {
                        guest_mode: Some(true),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let issued = use_case.execute("spring-campaign", &fp).await.unwrap();
        assert!(issued.viewer.is_guest());
        assert!(issued.viewer.latest_versions_only());
        assert!(!issued.viewer.method.can_interact());
    }

    #[tokio::test]
    async fn test_session_bound_to_fingerprint() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        create_project(&repo, "spring-campaign", open_settings()).await;

        let issued = OpenAccessUseCase::new(repo.clone(), repo.clone(), config.clone())
            .execute("spring-campaign", &fingerprint(USER_AGENT))
            .await
            .unwrap();

        let result = check(&repo, config)
            .execute(&issued.token, &fingerprint("curl/8.5"))
            .await;
        assert!(matches!(result, Err(ShareError::SessionFingerprintMismatch)));
    }

    #[tokio::test]
    async fn test_token_from_other_secret_rejected() {
        let repo = Arc::new(MemoryShareRepository::default());
        create_project(&repo, "spring-campaign", open_settings()).await;
        let fp = fingerprint(USER_AGENT);

        let issued = OpenAccessUseCase::new(repo.clone(), repo.clone(), config())
            .execute("spring-campaign", &fp)
            .await
            .unwrap();

        let result = check(&repo, config()).execute(&issued.token, &fp).await;
        assert!(matches!(result, Err(ShareError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_settings_change_invalidates_sessions() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        let project = create_project(&repo, "spring-campaign", password_settings()).await;
        let fp = fingerprint(USER_AGENT);

        let issued = password_use_case(&repo, config.clone())
            .execute("spring-campaign", SHARE_PASSWORD, &fp)
            .await
            .unwrap();

        // Download toggle keeps sessions
        let (_, bumped) = ProjectAdminUseCase::new(repo.clone(), config.clone())
            .update(
                project.project_id,
                UpdateProjectInput {
                    settings: ShareSettingsInput {
                        allow_downloads: Some(true),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!bumped);
        let viewer = check(&repo, config.clone())
            .execute(&issued.token, &fp)
            .await
            .unwrap();
        assert!(viewer.allow_downloads);

        // New password drops them
        let (updated, bumped) = ProjectAdminUseCase::new(repo.clone(), config.clone())
            .update(
                project.project_id,
                UpdateProjectInput {
                    settings: ShareSettingsInput {
                        password: Some("Second-Grade-Pass-9".to_string()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(bumped);
        assert_eq!(updated.auth_version, project.auth_version + 1);

        let result = check(&repo, config).execute(&issued.token, &fp).await;
        assert!(matches!(result, Err(ShareError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_password_mode_without_password_rejected() {
        let repo = Arc::new(MemoryShareRepository::default());
        let result = ProjectAdminUseCase::new(repo.clone(), config())
            .create(
                &admin(),
                crate::application::CreateProjectInput {
                    slug: "no-secret".to_string(),
                    title: "No secret".to_string(),
                    description: None,
                    settings: ShareSettingsInput {
                        auth_mode: Some(crate::domain::AuthMode::Password),
                        ..Default::default()
                    },
                },
            )
            .await;
        assert!(matches!(result, Err(ShareError::Validation(_))));

        let weak = ProjectAdminUseCase::new(repo, config())
            .create(
                &admin(),
                crate::application::CreateProjectInput {
                    slug: "weak-secret".to_string(),
                    title: "Weak".to_string(),
                    description: None,
                    settings: ShareSettingsInput {
                        auth_mode: Some(crate::domain::AuthMode::Password),
                        password: Some("short".to_string()),
                        ..Default::default()
                    },
                },
            )
            .await;
        assert!(matches!(weak, Err(ShareError::PasswordValidation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let repo = Arc::new(MemoryShareRepository::default());
        create_project(&repo, "spring-campaign", open_settings()).await;

        let result = ProjectAdminUseCase::new(repo, config())
            .create(
                &admin(),
                crate::application::CreateProjectInput {
                    slug: "SPRING-campaign".to_string(),
                    title: "Again".to_string(),
                    description: None,
                    settings: open_settings(),
                },
            )
            .await;
        assert!(matches!(result, Err(ShareError::SlugTaken)));
    }

    #[tokio::test]
    async fn test_archive_and_revoke_all_invalidate_sessions() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        let project = create_project(&repo, "spring-campaign", open_settings()).await;
        let fp = fingerprint(USER_AGENT);
        let open = OpenAccessUseCase::new(repo.clone(), repo.clone(), config.clone());

        let first = open.execute("spring-campaign", &fp).await.unwrap();
        let second = open.execute("spring-campaign", &fp).await.unwrap();

        let sessions = SessionAdminUseCase::new(repo.clone(), repo.clone(), config.clone());
        let (_, active) = sessions.list(project.project_id).await.unwrap();
        assert_eq!(active.len(), 2);

        assert_eq!(sessions.revoke_all(project.project_id).await.unwrap(), 2);
        for token in [&first.token, &second.token] {
            let result = check(&repo, config.clone()).execute(token, &fp).await;
            assert!(matches!(result, Err(ShareError::SessionInvalid)));
        }

        let third = open.execute("spring-campaign", &fp).await.unwrap();
        ProjectAdminUseCase::new(repo.clone(), config.clone())
            .set_status(project.project_id, ProjectStatus::Archived)
            .await
            .unwrap();
        let result = check(&repo, config).execute(&third.token, &fp).await;
        assert!(matches!(result, Err(ShareError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_admin_writes_keep_approval_status() {
        use crate::domain::ProjectRepository;

        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        let project = create_project(&repo, "spring-campaign", password_settings()).await;

        // Read before the client approves, written after
        let mut stale = repo.project(project.project_id);
        repo.set_project_status(project.project_id, ProjectStatus::Approved)
            .await
            .unwrap();
        stale.rename("Renamed", None).unwrap();
        repo.update_project(&stale).await.unwrap();

        let stored = repo.project(project.project_id);
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.status, ProjectStatus::Approved);

        SessionAdminUseCase::new(repo.clone(), repo.clone(), config.clone())
            .revoke_all(project.project_id)
            .await
            .unwrap();
        let (updated, bumped) = ProjectAdminUseCase::new(repo.clone(), config)
            .update(
                project.project_id,
                UpdateProjectInput {
                    settings: ShareSettingsInput {
                        password: Some("Second-Grade-Pass-9".to_string()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(bumped);
        assert_eq!(updated.auth_version, project.auth_version + 2);

        let stored = repo.project(project.project_id);
        assert_eq!(stored.status, ProjectStatus::Approved);
        assert_eq!(stored.auth_version, project.auth_version + 2);
    }

    #[tokio::test]
    async fn test_sign_out_revokes_session() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        create_project(&repo, "spring-campaign", open_settings()).await;
        let fp = fingerprint(USER_AGENT);

        let issued = OpenAccessUseCase::new(repo.clone(), repo.clone(), config.clone())
            .execute("spring-campaign", &fp)
            .await
            .unwrap();
        ShareSignOutUseCase::new(repo.clone(), config.clone())
            .execute(&issued.token)
            .await
            .unwrap();

        let session = ShareSessionRepository::find_share_session(
            repo.as_ref(),
            issued.viewer.session_id,
        )
        .await
        .unwrap()
        .unwrap();
        assert!(session.is_revoked());

        let result = check(&repo, config).execute(&issued.token, &fp).await;
        assert!(matches!(result, Err(ShareError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_admin_preview_session() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        let project = create_project(&repo, "spring-campaign", password_settings()).await;
        let fp = fingerprint(USER_AGENT);
        let admin = admin();

        let issued = SessionAdminUseCase::new(repo.clone(), repo.clone(), config.clone())
            .issue_admin_preview(&admin, project.project_id, &fp)
            .await
            .unwrap();
        assert!(issued.viewer.is_admin());
        assert_eq!(issued.viewer.admin_id, Some(admin.admin_id));
        assert!(!issued.viewer.latest_versions_only());
    }

    // ------------------------------------------------------------------
    // OTP
    // ------------------------------------------------------------------

    struct OtpHarness {
        repo: Arc<MemoryShareRepository>,
        config: Arc<ShareConfig>,
        sender: Arc<RecordingSender>,
        limiter: Arc<MemoryRateLimitStore>,
        project: crate::domain::Project,
    }

    impl OtpHarness {
        async fn new(config: ShareConfig) -> Self {
            let repo = Arc::new(MemoryShareRepository::default());
            let project = create_project(&repo, "spring-campaign", otp_settings()).await;
            RecipientAdminUseCase::new(repo.clone(), repo.clone(), repo.clone())
                .add(project.project_id, CLIENT_EMAIL, Some("Producer".to_string()))
                .await
                .unwrap();
            Self {
                repo,
                config: Arc::new(config),
                sender: Arc::new(RecordingSender::default()),
                limiter: Arc::new(MemoryRateLimitStore::new()),
                project,
            }
        }

        async fn send(&self, email: &str) -> Result<u64, ShareError> {
            SendOtpUseCase::new(
                self.repo.clone(),
                self.repo.clone(),
                self.repo.clone(),
                self.limiter.clone(),
                self.sender.clone(),
                self.config.clone(),
            )
            .execute("spring-campaign", email, &fingerprint(USER_AGENT))
            .await
        }

        async fn verify(
            &self,
            email: &str,
            code: &str,
        ) -> Result<crate::application::IssuedSession, ShareError> {
            VerifyOtpUseCase::new(
                self.repo.clone(),
                self.repo.clone(),
                self.repo.clone(),
                self.repo.clone(),
                self.limiter.clone(),
                self.config.clone(),
            )
            .execute("spring-campaign", email, code, &fingerprint(USER_AGENT))
            .await
        }

        async fn delivered_code(&self) -> String {
            let sent = self.sender.wait_for(1).await;
            sent.last().map(|(_, code)| code.clone()).unwrap()
        }
    }

    fn wrong_code(code: &str) -> String {
        let n: u32 = code.parse().unwrap();
        format!("{:06}", (n + 1) % 1_000_000)
    }

    #[tokio::test]
    async fn test_otp_round_trip_for_recipient() {
        let h = OtpHarness::new(ShareConfig::development()).await;

        let ttl = h.send("Producer@Client.com").await.unwrap();
        assert_eq!(ttl, h.config.otp_ttl.as_secs());

        let code = h.delivered_code().await;
        assert_eq!(code.len(), 6);

        let spaced = format!("{} {}", &code[..3], &code[3..]);
        let issued = h.verify(CLIENT_EMAIL, &spaced).await.unwrap();
        assert_eq!(issued.viewer.method, AccessMethod::Otp);
        assert_eq!(
            issued.viewer.recipient_email,
            Some(Email::new(CLIENT_EMAIL).unwrap())
        );

        // Single use
        let again = h.verify(CLIENT_EMAIL, &code).await;
        assert!(matches!(again, Err(ShareError::InvalidOtp)));
    }

    #[tokio::test]
    async fn test_otp_unknown_address_looks_identical() {
        let h = OtpHarness::new(ShareConfig::development()).await;

        let ttl = h.send("stranger@elsewhere.com").await.unwrap();
        assert_eq!(ttl, h.config.otp_ttl.as_secs());
        assert_eq!(h.repo.challenge_count(), 0);

        tokio::task::yield_now().await;
        assert!(h.sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_otp_attempts_exhaust_challenge() {
        let h = OtpHarness::new(ShareConfig::development()).await;
        h.send(CLIENT_EMAIL).await.unwrap();
        let code = h.delivered_code().await;
        let bad = wrong_code(&code);

        for _ in 0..h.config.otp_max_attempts {
            let result = h.verify(CLIENT_EMAIL, &bad).await;
            assert!(matches!(result, Err(ShareError::InvalidOtp)));
        }
        assert_eq!(h.repo.challenge_count(), 0);

        let result = h.verify(CLIENT_EMAIL, &code).await;
        assert!(matches!(result, Err(ShareError::InvalidOtp)));
    }

    #[tokio::test]
    async fn test_new_code_replaces_previous() {
        let h = OtpHarness::new(ShareConfig::development()).await;

        h.send(CLIENT_EMAIL).await.unwrap();
        let first = h.delivered_code().await;
        h.send(CLIENT_EMAIL).await.unwrap();
        let sent = h.sender.wait_for(2).await;
        let second = sent[1].1.clone();
        assert_eq!(h.repo.challenge_count(), 1);

        if first != second {
            let stale = h.verify(CLIENT_EMAIL, &first).await;
            assert!(matches!(stale, Err(ShareError::InvalidOtp)));
        }
        assert!(h.verify(CLIENT_EMAIL, &second).await.is_ok());
    }

    #[tokio::test]
    async fn test_otp_send_rate_limited_per_address() {
        let h = OtpHarness::new(ShareConfig {
            otp_send_email_rate_limit: RateLimitConfig::new(1, 900),
            ..ShareConfig::development()
        })
        .await;

        h.send(CLIENT_EMAIL).await.unwrap();
        let limited = h.send(CLIENT_EMAIL).await;
        assert!(matches!(limited, Err(ShareError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_otp_verify_rate_limited_per_address() {
        let h = OtpHarness::new(ShareConfig {
            otp_verify_rate_limit: RateLimitConfig::new(2, 900),
            ..ShareConfig::development()
        })
        .await;
        h.send(CLIENT_EMAIL).await.unwrap();
        let code = h.delivered_code().await;
        let bad = wrong_code(&code);

        for _ in 0..2 {
            let result = h.verify(CLIENT_EMAIL, &bad).await;
            assert!(matches!(result, Err(ShareError::InvalidOtp)));
        }
        // Even the right code is refused once the window is spent
        let limited = h.verify(CLIENT_EMAIL, &code).await;
        assert!(matches!(limited, Err(ShareError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_otp_not_offered_for_password_projects() {
        let h = OtpHarness::new(ShareConfig::development()).await;
        create_project(&h.repo, "password-only", password_settings()).await;

        let result = SendOtpUseCase::new(
            h.repo.clone(),
            h.repo.clone(),
            h.repo.clone(),
            h.limiter.clone(),
            h.sender.clone(),
            h.config.clone(),
        )
        .execute("password-only", CLIENT_EMAIL, &fingerprint(USER_AGENT))
        .await;
        assert!(matches!(result, Err(ShareError::MethodNotAllowed)));
    }

    #[tokio::test]
    async fn test_removed_recipient_loses_access() {
        let h = OtpHarness::new(ShareConfig::development()).await;
        h.send(CLIENT_EMAIL).await.unwrap();
        let code = h.delivered_code().await;
        let issued = h.verify(CLIENT_EMAIL, &code).await.unwrap();

        let recipients = RecipientAdminUseCase::new(h.repo.clone(), h.repo.clone(), h.repo.clone());
        let listed = recipients.list(h.project.project_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        recipients
            .remove(h.project.project_id, listed[0].recipient_id)
            .await
            .unwrap();

        let result = check(&h.repo, h.config.clone())
            .execute(&issued.token, &fingerprint(USER_AGENT))
            .await;
        assert!(matches!(result, Err(ShareError::SessionInvalid)));

        let missing = recipients
            .remove(h.project.project_id, listed[0].recipient_id)
            .await;
        assert!(matches!(missing, Err(ShareError::RecipientNotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_recipient_conflicts() {
        let h = OtpHarness::new(ShareConfig::development()).await;
        let result = RecipientAdminUseCase::new(h.repo.clone(), h.repo.clone(), h.repo.clone())
            .add(h.project.project_id, "PRODUCER@client.com", None)
            .await;
        assert!(matches!(result, Err(ShareError::RecipientExists)));
    }

    #[tokio::test]
    async fn test_project_status_is_kept_by_repository() {
        let h = OtpHarness::new(ShareConfig::development()).await;
        crate::domain::ProjectRepository::set_project_status(
            h.repo.as_ref(),
            h.project.project_id,
            ProjectStatus::Approved,
        )
        .await
        .unwrap();
        assert_eq!(h.repo.project(h.project.project_id).status, ProjectStatus::Approved);
    }
}

#[cfg(test)]
mod router_tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode, header};
    use axum::middleware::{self, Next};
    use platform::rate_limit::MemoryRateLimitStore;
    use tower::ServiceExt;

    use super::support::*;
    use crate::application::config::ShareConfig;
    use crate::infra::otp_delivery::OtpDelivery;
    use crate::presentation::{
        ShareMiddlewareState, require_share_session, share_public_router, share_viewer_router,
    };

    fn app(repo: Arc<MemoryShareRepository>, config: Arc<ShareConfig>) -> Router {
        let limiter = Arc::new(MemoryRateLimitStore::new());
        let delivery = Arc::new(OtpDelivery::Log);

        let guard = ShareMiddlewareState {
            repo: repo.clone(),
            config: config.clone(),
        };
        let viewer = share_viewer_router(
            repo.clone(),
            limiter.clone(),
            delivery.clone(),
            config.clone(),
        )
        .layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            require_share_session(guard.clone(), req, next)
        }));

        share_public_router(repo, limiter, delivery, config).merge(viewer)
    }

    fn request(method: &str, uri: &str, body: Body) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
        req
    }

    #[tokio::test]
    async fn test_share_info_route() {
        let repo = Arc::new(MemoryShareRepository::default());
        create_project(&repo, "spring-campaign", password_settings()).await;

        let res = app(repo, config())
            .oneshot(request("GET", "/share/spring-campaign", Body::empty()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["passwordEnabled"], true);
        assert_eq!(json["title"], "Spring Campaign");
    }

    #[tokio::test]
    async fn test_password_route_sets_cookie_and_unlocks_viewer() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        create_project(&repo, "spring-campaign", password_settings()).await;

        let body = serde_json::json!({ "password": SHARE_PASSWORD }).to_string();
        let res = app(repo.clone(), config.clone())
            .oneshot(request(
                "POST",
                "/share/spring-campaign/password",
                Body::from(body),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("share_session="));
        assert!(cookie.contains("HttpOnly"));

        let pair = cookie.split(';').next().unwrap().to_string();
        let mut req = request("GET", "/share/session", Body::empty());
        req.headers_mut()
            .insert(header::COOKIE, pair.parse().unwrap());
        let res = app(repo, config).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forwarded_for_does_not_reset_password_limit() {
        let repo = Arc::new(MemoryShareRepository::default());
        create_project(&repo, "spring-campaign", password_settings()).await;
        let app = app(repo, config());
        let body = serde_json::json!({ "password": "wrong-guess" }).to_string();

        let mut statuses = Vec::new();
        for i in 0..20 {
            let mut req = request(
                "POST",
                "/share/spring-campaign/password",
                Body::from(body.clone()),
            );
            req.extensions_mut()
                .insert(ConnectInfo(SocketAddr::from(([203, 0, 113, 7], 40000))));
            req.headers_mut().insert(
                "x-forwarded-for",
                format!("10.9.8.{i}").parse().unwrap(),
            );
            statuses.push(app.clone().oneshot(req).await.unwrap().status());
        }

        assert!(statuses[..5].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
        assert!(statuses[5..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    }

    #[tokio::test]
    async fn test_bearer_token_accepted() {
        let repo = Arc::new(MemoryShareRepository::default());
        let config = config();
        create_project(&repo, "open-cut", open_settings()).await;

        let res = app(repo.clone(), config.clone())
            .oneshot(request("POST", "/share/open-cut/open", Body::empty()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let token = json["token"].as_str().unwrap().to_string();

        let mut req = request("GET", "/share/session", Body::empty());
        req.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let res = app(repo, config).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_viewer_routes_require_session() {
        let repo = Arc::new(MemoryShareRepository::default());

        let res = app(repo, config())
            .oneshot(request("GET", "/share/session", Body::empty()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers().get("X-Auth-Required").unwrap(), "true");
    }

    #[tokio::test]
    async fn test_otp_send_route_accepts_any_address() {
        let repo = Arc::new(MemoryShareRepository::default());
        create_project(&repo, "spring-campaign", otp_settings()).await;

        let body = serde_json::json!({ "email": "someone@example.com" }).to_string();
        let res = app(repo, config())
            .oneshot(request(
                "POST",
                "/share/spring-campaign/otp/send",
                Body::from(body),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_signout_clears_cookie() {
        let repo = Arc::new(MemoryShareRepository::default());

        let res = app(repo, config())
            .oneshot(request("POST", "/share/signout", Body::empty()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::error::ShareError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ShareError::ProjectArchived.into_response().status(),
            StatusCode::GONE
        );
        assert_eq!(
            ShareError::InvalidOtp.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ShareError::SlugTaken.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ShareError::MethodNotAllowed.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let res = ShareError::RateLimited {
            retry_after_secs: 30,
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers().get("retry-after").unwrap(), "30");
    }
}
