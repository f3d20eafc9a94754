//! Lightbox overlay state

/// User interactions the overlay reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightboxEvent {
    /// The explicit close control was activated
    CloseButton,
    /// A click landed on the overlay; `on_backdrop` is false when it hit the
    /// image or caption instead of the backdrop itself
    Click {
        /// Whether the click target is the backdrop element
        on_backdrop: bool,
    },
    /// A key was pressed while the page had focus
    Key(String),
}

/// Modal overlay showing one enlarged image with its caption
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lightbox {
    visible: bool,
    image_url: String,
    caption: String,
}

impl Lightbox {
    /// Shows `url` with `caption`, an absent caption showing as empty
    pub fn open(&mut self, url: impl Into<String>, caption: Option<&str>) {
        self.image_url = url.into();
        self.caption = caption.unwrap_or_default().to_string();
        self.visible = true;
    }

    /// Hides the overlay and clears what it displayed
    pub fn close(&mut self) {
        self.visible = false;
        self.image_url.clear();
        self.caption.clear();
    }

    /// Applies an interaction, returning whether it closed the overlay
    pub fn handle(&mut self, event: &LightboxEvent) -> bool {
        let closes = match event {
            LightboxEvent::CloseButton => true,
            LightboxEvent::Click { on_backdrop } => *on_backdrop,
            LightboxEvent::Key(key) => key == "Escape",
        };

        if closes {
            self.close();
        }
        closes
    }

    /// Whether the overlay is showing
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.visible
    }

    /// URL of the displayed image, empty when closed
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Caption of the displayed image, empty when closed
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }
}
