//! Wiring: configuration in, a ready coordinator out.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use momentz_media::{ImageSource, UploadSlot};
use momentz_store::{Database, Theme};

use crate::config::ClientConfig;
use crate::coordinator::{Coordinator, ViewOptions};
use crate::error::Result;
use crate::events::{Intent, Outcome, ProfileForm};
use crate::gateway::HttpGateway;
use crate::notify::Toasts;
use crate::session::SessionManager;
use crate::view::{FeedState, ViewStore};

/// A fully wired client: persistent store, session owner, HTTP gateway
/// and the coordinator driving one view.
pub struct Client {
    config: ClientConfig,
    store: Arc<Mutex<Database>>,
    coordinator: Coordinator,
    post_upload: UploadSlot,
    profile_upload: UploadSlot,
}

impl Client {
    /// Open the local store, restore any saved session and build the
    /// gateway.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let db = match &config.data_dir {
            Some(dir) => Database::open_in_dir(dir)?,
            None => Database::new()?,
        };
        let store = Arc::new(Mutex::new(db));

        let session = SessionManager::new(Some(store.clone()));
        session.restore()?;

        let gateway = HttpGateway::new(&config, session.clone())?;

        let state = FeedState {
            toasts: Toasts::new(config.toast_duration),
            ..FeedState::default()
        };

        let coordinator = Coordinator::new(
            Arc::new(gateway),
            session,
            ViewStore::new(state),
            ViewOptions::from(&config),
        );

        info!(api = %config.api_url, logged_in = coordinator.session().is_active(), "Client ready");

        Ok(Self {
            config,
            store,
            coordinator,
            post_upload: UploadSlot::for_post(),
            profile_upload: UploadSlot::for_profile(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn session(&self) -> &SessionManager {
        self.coordinator.session()
    }

    pub fn view(&self) -> &ViewStore {
        self.coordinator.view()
    }

    /// Upload slot of the create-post form (1200×1200, quality 0.7).
    pub fn post_upload(&mut self) -> &mut UploadSlot {
        &mut self.post_upload
    }

    /// Upload slot of the profile editor (800×800, quality 0.8).
    pub fn profile_upload(&mut self) -> &mut UploadSlot {
        &mut self.profile_upload
    }

    /// Read, check and normalize an image file into the post slot.
    pub async fn select_post_image(&mut self, path: &std::path::Path) -> Result<()> {
        let source = ImageSource::from_path(path).await?;
        self.post_upload.select(source).await?;
        Ok(())
    }

    /// Same as [`select_post_image`](Self::select_post_image) for the
    /// profile editor.
    pub async fn select_profile_image(&mut self, path: &std::path::Path) -> Result<()> {
        let source = ImageSource::from_path(path).await?;
        self.profile_upload.select(source).await?;
        Ok(())
    }

    /// Publish the image in the post slot.
    ///
    /// The slot keeps its image until the server accepts the post, so a
    /// failed upload can be retried without picking the file again.
    pub async fn create_post(&mut self, caption: &str) -> Outcome {
        let intent = Intent::CreatePost {
            image: self.post_upload.current().cloned(),
            caption: caption.to_string(),
        };
        let outcome = self.coordinator.perform(intent).await;
        if outcome == Outcome::Confirmed {
            self.post_upload.clear();
        }
        outcome
    }

    /// Save `form`, using the profile slot's image when `form` carries none.
    /// The slot is emptied only once the server confirms.
    pub async fn update_profile(&mut self, mut form: ProfileForm) -> Outcome {
        if form.upload.is_none() {
            form.upload = self.profile_upload.current().cloned();
        }
        let outcome = self
            .coordinator
            .perform(Intent::UpdateProfile { form })
            .await;
        if outcome == Outcome::Confirmed {
            self.profile_upload.clear();
        }
        outcome
    }

    pub fn theme(&self) -> Result<Theme> {
        let db = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(db.theme()?)
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let db = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(db.toggle_theme()?)
    }
}
