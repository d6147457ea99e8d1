use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// A marker with a bound popup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLayer {
    position: LatLng,
    popup_text: String,
}

impl MarkerLayer {
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            popup_text: String::new(),
        }
    }

    pub fn with_popup(mut self, text: impl Into<String>) -> Self {
        self.popup_text = text.into();
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn popup_text(&self) -> &str {
        &self.popup_text
    }
}
