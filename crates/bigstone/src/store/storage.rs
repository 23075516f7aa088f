use log::info;

use super::{Clock, ObjectStore, Session, StoreError, SystemClock};

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub path: String,
}

/// Session-aware wrapper over an [`ObjectStore`].
///
/// Uploads are namespaced under the user's id so users cannot overwrite each
/// other's files. No retries: a backend failure is returned as is.
pub struct StorageService<O, C = SystemClock> {
    store: O,
    clock: C,
}

impl<O: ObjectStore> StorageService<O> {
    pub fn new(store: O) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<O: ObjectStore, C: Clock> StorageService<O, C> {
    #[cfg(test)]
    pub fn with_clock(store: O, clock: C) -> Self {
        Self { store, clock }
    }

    /// Upload `bytes` as `{user id}/{timestamp}-{name}`.
    pub fn upload(
        &self,
        session: &Session,
        bucket: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<UploadedObject, StoreError> {
        let user = session.require_user()?;
        let key = namespaced_key(&user.id, self.clock.now_millis(), name);
        let path = self
            .store
            .put_object(user, bucket, &key, bytes, content_type_for(name))?;
        info!("Uploaded {} byte(s) to {bucket}/{path}", bytes.len());
        Ok(UploadedObject { path })
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.store.public_url(bucket, path)
    }

    pub fn delete(&self, session: &Session, bucket: &str, path: &str) -> Result<(), StoreError> {
        let user = session.require_user()?;
        self.store.remove_object(user, bucket, path)?;
        info!("Deleted {bucket}/{path}");
        Ok(())
    }

    /// Upload an image as `{user id}/{timestamp}.{ext}` and return its public URL.
    pub fn upload_image_with_preview(
        &self,
        session: &Session,
        bucket: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let user = session.require_user()?;
        let key = image_key(&user.id, self.clock.now_millis(), file_name);
        let path = self
            .store
            .put_object(user, bucket, &key, bytes, content_type_for(file_name))?;
        info!("Uploaded image to {bucket}/{path}");
        Ok(self.public_url(bucket, &path))
    }
}

pub fn namespaced_key(user_id: &str, timestamp_millis: u128, name: &str) -> String {
    format!("{user_id}/{timestamp_millis}-{name}")
}

/// Key for an image upload. Names without an extension get no suffix.
pub fn image_key(user_id: &str, timestamp_millis: u128, file_name: &str) -> String {
    match extension(file_name) {
        Some(ext) => format!("{user_id}/{timestamp_millis}.{ext}"),
        None => format!("{user_id}/{timestamp_millis}"),
    }
}

fn extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && !ext.contains('/'))
}

fn content_type_for(file_name: &str) -> &'static str {
    match extension(file_name).map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
