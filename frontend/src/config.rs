/// Timings for a single toast: delay before the `show` class lands, how long
/// it stays visible, and how long the fade-out runs before removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTiming {
    pub show_delay_ms: u32,
    pub visible_ms: u32,
    pub fade_ms: u32,
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self {
            show_delay_ms: 10,
            visible_ms: 3000,
            fade_ms: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub recommend_endpoint: String,
    pub detect_endpoint: String,
    pub weather_endpoint: String,
    /// Page the "Find Products" button opens, with `?crop=<name>` appended.
    pub marketplace_page: String,
    pub sensor_delay_ms: u32,
    pub toast: ToastTiming,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            recommend_endpoint: "/api/recommend-crops".to_string(),
            detect_endpoint: "/api/detect-disease".to_string(),
            weather_endpoint: "/api/weather".to_string(),
            marketplace_page: "/marketplace".to_string(),
            sensor_delay_ms: 2000,
            toast: ToastTiming::default(),
        }
    }
}
