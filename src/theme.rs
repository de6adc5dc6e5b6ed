/// Numeric layout metrics of a calendar.  Units are whatever the embedding
/// presentation layer measures in (pixels on a phone, lines in a terminal).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeConfig {
    pub calendar_horizontal_paddings: f64,
    pub page_padding_top: f64,
    pub page_padding_bottom: f64,
    pub page_between_rows: f64,
    pub day_container_size: f64,
}

impl Default for ThemeConfig {
    fn default() -> ThemeConfig {
        ThemeConfig {
            calendar_horizontal_paddings: 16.0,
            page_padding_top: 4.0,
            page_padding_bottom: 4.0,
            page_between_rows: 2.0,
            day_container_size: 40.0,
        }
    }
}
