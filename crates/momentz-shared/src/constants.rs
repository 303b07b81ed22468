/// Application name
pub const APP_NAME: &str = "Momentz";

/// Default REST API base URL
pub const DEFAULT_API_URL: &str = "https://momentzz.onrender.com/api";

/// Well-known local storage keys for the session triple
pub const KEY_TOKEN: &str = "token";
pub const KEY_USER_ID: &str = "userId";
pub const KEY_USERNAME: &str = "username";

/// Local storage key for the theme preference
pub const KEY_THEME: &str = "theme";

/// Maximum source image size accepted for upload (5 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Post image bounding box and JPEG quality
pub const POST_IMAGE_MAX_EDGE: u32 = 1200;
pub const POST_IMAGE_QUALITY: f32 = 0.7;

/// Profile picture bounding box and JPEG quality
pub const PROFILE_IMAGE_MAX_EDGE: u32 = 800;
pub const PROFILE_IMAGE_QUALITY: f32 = 0.8;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Feed page size requested from `/posts/all`
pub const DEFAULT_FEED_PAGE_SIZE: u32 = 20;

/// Number of follow suggestions requested
pub const DEFAULT_SUGGESTION_LIMIT: u32 = 5;

/// How long a toast stays on screen, in seconds
pub const TOAST_DURATION_SECS: u64 = 3;
