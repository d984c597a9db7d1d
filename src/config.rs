use crate::camera::VideoFormat;

pub const DEFAULT_WINDOW_GROUP: &str = "viewfinder_window_group";
pub const DEFAULT_VIEWFINDER_WINDOW_ID: &str = "my_viewfinder";
/// Arbitrary z-order for the background window.
pub const DEFAULT_APP_ZORDER: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Window group the camera service joins with its viewfinder window.
    pub window_group: String,
    pub viewfinder_window_id: String,
    pub app_zorder: i32,
    pub video_format: VideoFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_group: DEFAULT_WINDOW_GROUP.to_owned(),
            viewfinder_window_id: DEFAULT_VIEWFINDER_WINDOW_ID.to_owned(),
            app_zorder: DEFAULT_APP_ZORDER,
            video_format: VideoFormat::Default,
        }
    }
}
