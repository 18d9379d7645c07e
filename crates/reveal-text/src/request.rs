//! Text layout request

/// What to rasterize and how to fit it.
///
/// Built once and read-only afterwards; the setters consume the request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayoutRequest {
    text: String,
    font_family: String,
    horizontal_padding: f32,
    line_height: f32,
}

impl TextLayoutRequest {
    /// Request for `text` with the default family, padding and line height
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_family: "sans-serif".to_string(),
            horizontal_padding: 0.75,
            line_height: 1.5,
        }
    }

    /// Set the font family
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the horizontal padding: the widest line spans `1 / padding` of
    /// the raster width
    pub fn horizontal_padding(mut self, padding: f32) -> Self {
        self.horizontal_padding = padding;
        self
    }

    /// Set the line height as a multiple of the font height
    pub fn line_height(mut self, factor: f32) -> Self {
        self.line_height = factor;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn family(&self) -> &str {
        &self.font_family
    }

    pub fn padding(&self) -> f32 {
        self.horizontal_padding
    }

    pub fn line_height_factor(&self) -> f32 {
        self.line_height
    }

    /// Lines split on explicit breaks; `\r\n` counts as one break
    pub fn lines(&self) -> Vec<&str> {
        self.text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = TextLayoutRequest::new("Hello\nworld!")
            .font_family("Nunito")
            .horizontal_padding(1.8)
            .line_height(2.5);
        assert_eq!(request.family(), "Nunito");
        assert_eq!(request.padding(), 1.8);
        assert_eq!(request.line_height_factor(), 2.5);
        assert_eq!(request.lines(), vec!["Hello", "world!"]);
    }

    #[test]
    fn test_lines_keep_empty_breaks() {
        let request = TextLayoutRequest::new("a\r\n\nb\n");
        assert_eq!(request.lines(), vec!["a", "", "b", ""]);
    }
}
