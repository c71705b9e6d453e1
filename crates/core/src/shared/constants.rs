pub const FRONTAL_FACE_CASCADE_NAME: &str = "haarcascade_frontalface_alt.xml";
pub const FRONTAL_FACE_CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_alt.xml";

/// Application folder under the platform cache directory.
pub const CACHE_APP_DIR: &str = "facemark";
