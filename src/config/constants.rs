use std::time::Duration;

/// Key of the aggregate document in local storage (cache in remote mode, sole copy otherwise).
pub const LOCAL_STORAGE_KEY: &str = "studymate_shared_data";

/// Key of the `"dark"` / `"light"` theme preference in local storage.
pub const THEME_STORAGE_KEY: &str = "studymate_theme";

/// Firestore collection holding the shared document. Every device reads and writes the same one.
pub const FIRESTORE_COLLECTION: &str = "studymate";
pub const FIRESTORE_DOC_ID: &str = "shared_data";

/// Root prefix of uploaded blobs in the object store.
pub const STORAGE_NAMESPACE: &str = "studymate";

/// Re-read interval used by local-only clients.
pub const SYNC_INTERVAL: Duration = Duration::from_millis(3_000);

/// How often the REST watch loop re-reads the remote document.
pub const REMOTE_WATCH_INTERVAL: Duration = Duration::from_millis(1_000);

/// Shortest re-read interval accepted by polling and watch loops.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub const PIN_LENGTH: usize = 4;

pub const ENV_API_KEY: &str = "FIREBASE_API_KEY";
pub const ENV_AUTH_DOMAIN: &str = "FIREBASE_AUTH_DOMAIN";
pub const ENV_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const ENV_STORAGE_BUCKET: &str = "FIREBASE_STORAGE_BUCKET";
pub const ENV_MESSAGING_SENDER_ID: &str = "FIREBASE_MESSAGING_SENDER_ID";
pub const ENV_APP_ID: &str = "FIREBASE_APP_ID";
pub const ENV_SECURITY_PIN: &str = "SECURITY_PIN";
pub const ENV_FIRESTORE_EMULATOR_HOST: &str = "FIRESTORE_EMULATOR_HOST";
pub const ENV_STORAGE_EMULATOR_HOST: &str = "FIREBASE_STORAGE_EMULATOR_HOST";
