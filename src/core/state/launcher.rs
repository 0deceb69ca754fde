// ─── Launcher Controller ───
// Owns the settings, the version registry and the acquisition pipeline, and
// turns user intents (refresh, select, download, launch) into calls on them.
// Every failure is reported through the event sink; nothing here panics or
// leaves the controller in a half-updated state.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::core::acquisition::{AcquisitionJob, AcquisitionPipeline};
use crate::core::auth::OfflineAccount;
use crate::core::catalog::{VersionCatalog, VersionRegistry};
use crate::core::downloader::{Downloader, HttpTransport, Transport};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;
use crate::core::http::build_http_client;
use crate::core::java::{detect_runtime, is_valid_runtime, DetectedRuntime, RuntimeSource};
use crate::core::launch::{build_launch_command, spawn_game, LaunchRequest, RunningGame};
use crate::core::layout::GameLayout;
use crate::core::version::VersionRecord;

use super::settings::LauncherSettings;

pub struct Launcher {
    settings: LauncherSettings,
    layout: GameLayout,
    account: OfflineAccount,
    java: Option<DetectedRuntime>,
    manifest_transport: Arc<dyn Transport>,
    registry: Arc<VersionRegistry>,
    pipeline: Arc<AcquisitionPipeline>,
    sink: EventSink,
}

impl Launcher {
    /// Controller backed by real HTTP transports.
    pub fn new(settings: LauncherSettings, sink: EventSink) -> LauncherResult<Self> {
        let client = build_http_client()?;
        let manifest = Arc::new(HttpTransport::new(
            client.clone(),
            settings.manifest_timeout(),
        ));
        let download = Arc::new(HttpTransport::new(client, settings.download_timeout()));
        Ok(Self::with_transports(settings, sink, manifest, download))
    }

    pub fn with_transports(
        settings: LauncherSettings,
        sink: EventSink,
        manifest_transport: Arc<dyn Transport>,
        download_transport: Arc<dyn Transport>,
    ) -> Self {
        let layout = GameLayout::new(settings.game_dir.clone());
        let account = OfflineAccount::with_username(settings.username.as_deref());
        let registry = Arc::new(VersionRegistry::new(sink.clone()));
        let pipeline = Arc::new(AcquisitionPipeline::new(
            layout.clone(),
            Downloader::new(download_transport),
            Arc::clone(&registry),
            sink.clone(),
        ));

        Self {
            settings,
            layout,
            account,
            java: None,
            manifest_transport,
            registry,
            pipeline,
            sink,
        }
    }

    pub fn settings(&self) -> &LauncherSettings {
        &self.settings
    }

    pub fn layout(&self) -> &GameLayout {
        &self.layout
    }

    pub fn account(&self) -> &OfflineAccount {
        &self.account
    }

    pub fn snapshot(&self) -> Arc<VersionCatalog> {
        self.registry.snapshot()
    }

    pub fn java(&self) -> Option<&DetectedRuntime> {
        self.java.as_ref()
    }

    /// Detect Java, preferring the configured path when it is valid.
    pub fn detect_java(&mut self) -> Option<&DetectedRuntime> {
        let configured = self
            .settings
            .java_path
            .clone()
            .filter(|path| is_valid_runtime(path))
            .map(|path| DetectedRuntime {
                path,
                source: RuntimeSource::Configured,
            });

        self.java = configured.or_else(detect_runtime);
        match &self.java {
            Some(runtime) => self
                .sink
                .info(format!("Found Java: {}", runtime.path.display())),
            None => self.sink.warn("Java not found, set the path manually"),
        }
        self.java.as_ref()
    }

    /// Use `path` as the runtime. Returns `false`, keeping the previous
    /// runtime, when nothing usable is there.
    pub fn set_java_path(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if !is_valid_runtime(&path) {
            self.sink
                .warn(format!("Java path {} is invalid", path.display()));
            return false;
        }
        self.sink.info(format!("Java path set: {}", path.display()));
        self.java = Some(DetectedRuntime {
            path,
            source: RuntimeSource::Configured,
        });
        true
    }

    /// Initial load: runtime detection, local scan, then the remote catalog.
    pub async fn startup(&mut self) {
        self.detect_java();
        self.refresh().await;
    }

    /// Reload both version lists. Each list keeps its previous contents when
    /// its own reload fails.
    pub async fn refresh(&self) -> bool {
        let installed = self.load_installed().await;
        let available = self.refresh_available().await;
        installed && available
    }

    pub async fn load_installed(&self) -> bool {
        self.registry
            .rescan_installed(&self.layout.versions_dir())
            .await
    }

    pub async fn refresh_available(&self) -> bool {
        self.registry
            .refresh_available(self.manifest_transport.as_ref(), &self.settings.manifest_url)
            .await
    }

    /// Run [`Launcher::refresh_available`] in the background.
    pub fn spawn_refresh(&self) -> JoinHandle<bool> {
        let registry = Arc::clone(&self.registry);
        let transport = Arc::clone(&self.manifest_transport);
        let url = self.settings.manifest_url.clone();
        tokio::spawn(async move { registry.refresh_available(transport.as_ref(), &url).await })
    }

    pub fn select(&self, id: &str) -> LauncherResult<VersionRecord> {
        self.registry.select(id).inspect_err(|err| {
            self.sink.warn(err.to_string());
        })
    }

    /// Acquire the version with `id`. `None` when the id is unknown.
    pub async fn download(&self, id: &str) -> Option<AcquisitionJob> {
        let record = self.known_version(id)?;
        Some(self.pipeline.run(&record).await)
    }

    /// Acquire the selected version. `None` when nothing is selected.
    pub async fn download_selected(&self) -> Option<AcquisitionJob> {
        let record = self.require_selection()?;
        Some(self.pipeline.run(&record).await)
    }

    /// [`Launcher::download_selected`] as a background task.
    pub fn spawn_download_selected(&self) -> Option<JoinHandle<AcquisitionJob>> {
        let record = self.require_selection()?;
        let pipeline = Arc::clone(&self.pipeline);
        Some(tokio::spawn(async move { pipeline.run(&record).await }))
    }

    /// Start the selected version.
    ///
    /// Precondition failures are logged and returned; nothing is spawned.
    pub fn launch_selected(&self) -> LauncherResult<RunningGame> {
        self.try_launch().inspect_err(|err| match err {
            LauncherError::Precondition(message) => self.sink.warn(message.as_str()),
            other => self.sink.error(format!("Failed to launch game: {other}")),
        })
    }

    fn try_launch(&self) -> LauncherResult<RunningGame> {
        let selected = self
            .registry
            .selected()
            .ok_or_else(|| LauncherError::Precondition("Please select a version first".into()))?;
        let java = self.java.as_ref().ok_or_else(|| {
            LauncherError::Precondition("Java path is invalid, set it manually".into())
        })?;

        let command = build_launch_command(&LaunchRequest {
            java_path: &java.path,
            layout: &self.layout,
            version_id: &selected.id,
            jvm_args: &self.settings.jvm_args,
            memory_mb: self.settings.memory_mb,
            account: &self.account,
        })?;

        self.sink.info(format!(
            "Launching {} with {}MB of memory",
            selected.id, self.settings.memory_mb
        ));
        let game = spawn_game(&command, &self.sink)?;
        match game.pid {
            Some(pid) => self.sink.info(format!("Game started (PID {pid})")),
            None => self.sink.info("Game started"),
        }
        Ok(game)
    }

    fn known_version(&self, id: &str) -> Option<VersionRecord> {
        let catalog = self.snapshot();
        let found = catalog
            .find_available(id)
            .or_else(|| catalog.find_installed(id))
            .cloned();
        if found.is_none() {
            self.sink.warn(format!("Unknown version: {id}"));
        }
        found
    }

    fn require_selection(&self) -> Option<VersionRecord> {
        let selected = self.registry.selected();
        if selected.is_none() {
            self.sink.warn("Please select a version first");
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::memory::MemoryTransport;
    use crate::core::events::{channel, drain, log_messages, LauncherEvent};
    use tokio::sync::mpsc::UnboundedReceiver;

    const MANIFEST_URL: &str = "http://meta/manifest.json";
    const MANIFEST: &str = r#"{"latest":{"release":"1.21"},"versions":[
        {"id":"1.21","type":"release","url":"http://meta/1.21.json","time":"2024-06-13T08:32:38+00:00","releaseTime":"2024-06-13T08:24:03+00:00"},
        {"id":"24w14a","type":"snapshot","url":"http://meta/24w14a.json","time":"2024-04-03T12:00:00+00:00","releaseTime":"2024-04-03T11:50:00+00:00"}
    ]}"#;
    const METADATA: &str = r#"{"downloads":{"client":{"url":"http://meta/client-1.21.jar"}},"id":"1.21","releaseTime":"2024-06-13T08:24:03+00:00","type":"release"}"#;

    struct Fixture {
        _tmp: tempfile::TempDir,
        launcher: Launcher,
        rx: UnboundedReceiver<LauncherEvent>,
    }

    fn fixture(transport: MemoryTransport) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let settings = LauncherSettings {
            game_dir: tmp.path().join(".minecraft"),
            manifest_url: MANIFEST_URL.into(),
            username: Some("Tester".into()),
            memory_mb: 2048,
            ..LauncherSettings::default()
        };
        let (sink, rx) = channel();
        let transport: Arc<dyn Transport> = Arc::new(transport);
        let launcher =
            Launcher::with_transports(settings, sink, Arc::clone(&transport), transport);
        Fixture {
            _tmp: tmp,
            launcher,
            rx,
        }
    }

    fn online() -> MemoryTransport {
        MemoryTransport::new()
            .with_body(MANIFEST_URL, MANIFEST)
            .with_body("http://meta/1.21.json", METADATA)
            .with_body("http://meta/client-1.21.jar", vec![7u8; 10_000])
    }

    #[tokio::test]
    async fn refresh_selects_newest_available() {
        let fx = fixture(online());

        assert!(fx.launcher.refresh().await);

        let catalog = fx.launcher.snapshot();
        assert_eq!(catalog.available.len(), 2);
        assert!(catalog.installed.is_empty());
        assert_eq!(catalog.selected.as_ref().map(|v| v.id.as_str()), Some("1.21"));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_catalog() {
        let mut fx = fixture(MemoryTransport::new().with_status(MANIFEST_URL, 503));
        let before = fx.launcher.snapshot();

        assert!(!fx.launcher.refresh_available().await);
        assert!(Arc::ptr_eq(&before, &fx.launcher.snapshot()));

        let events = drain(&mut fx.rx);
        assert!(log_messages(&events)
            .iter()
            .any(|m| m.starts_with("Failed to fetch version list")));
    }

    #[tokio::test]
    async fn background_refresh() {
        let fx = fixture(online());
        assert!(fx.launcher.spawn_refresh().await.unwrap());
        assert_eq!(fx.launcher.snapshot().available.len(), 2);
    }

    #[tokio::test]
    async fn download_without_selection_is_refused() {
        let mut fx = fixture(online());

        assert!(fx.launcher.download_selected().await.is_none());
        assert!(fx.launcher.spawn_download_selected().is_none());

        let events = drain(&mut fx.rx);
        assert!(log_messages(&events).contains(&"Please select a version first"));
        assert!(!fx.launcher.layout().versions_dir().exists());
    }

    #[tokio::test]
    async fn download_selected_installs_version() {
        let fx = fixture(online());
        fx.launcher.refresh().await;
        fx.launcher.select("1.21").unwrap();

        let job = fx.launcher.spawn_download_selected().unwrap().await.unwrap();

        assert!(job.is_done(), "{job:?}");
        assert!(fx.launcher.snapshot().is_installed("1.21"));
        assert_eq!(
            std::fs::metadata(fx.launcher.layout().artifact_path("1.21"))
                .unwrap()
                .len(),
            10_000
        );
    }

    #[tokio::test]
    async fn unknown_id_is_not_downloaded() {
        let mut fx = fixture(online());
        fx.launcher.refresh().await;

        assert!(fx.launcher.download("0.0.1").await.is_none());
        assert!(fx.launcher.select("0.0.1").is_err());

        let events = drain(&mut fx.rx);
        assert!(log_messages(&events).contains(&"Unknown version: 0.0.1"));
    }

    #[tokio::test]
    async fn launch_preconditions_are_checked_in_order() {
        let mut fx = fixture(online());

        let err = fx.launcher.launch_selected().err().unwrap();
        assert!(matches!(err, LauncherError::Precondition(ref m) if m.contains("select")));

        fx.launcher.refresh().await;
        let err = fx.launcher.launch_selected().err().unwrap();
        assert!(matches!(err, LauncherError::Precondition(ref m) if m.contains("Java")));

        let java = fx.launcher.layout().root().join("java");
        std::fs::create_dir_all(fx.launcher.layout().root()).unwrap();
        std::fs::write(&java, b"").unwrap();
        assert!(fx.launcher.set_java_path(&java));

        let err = fx.launcher.launch_selected().err().unwrap();
        assert!(matches!(err, LauncherError::Precondition(ref m) if m.contains("download")));

        let events = drain(&mut fx.rx);
        assert!(log_messages(&events).contains(&"Please select a version first"));
    }

    #[test]
    fn invalid_java_path_is_rejected() {
        let mut fx = fixture(MemoryTransport::new());
        assert!(!fx.launcher.set_java_path("/definitely/not/java"));
        assert!(fx.launcher.java().is_none());
    }

    #[test]
    fn configured_username_is_used() {
        let fx = fixture(MemoryTransport::new());
        assert_eq!(fx.launcher.account().username, "Tester");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launch_spawns_the_runtime() {
        let fx = fixture(online());
        let mut launcher = fx.launcher;
        launcher.refresh().await;
        launcher.download_selected().await.unwrap();
        assert!(launcher.set_java_path("/bin/sh"));

        let game = launcher.launch_selected().unwrap();
        assert!(game.pid.is_some());
        // `sh` rejects the JVM flags; only the spawn matters here.
        game.exit.await.unwrap().unwrap();
    }
}
