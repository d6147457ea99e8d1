use serde::{Deserialize, Serialize};

/// Engine-assigned identifier of a rendered layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Tile,
    Marker,
    Route,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Tile => write!(f, "tile"),
            LayerKind::Marker => write!(f, "marker"),
            LayerKind::Route => write!(f, "route"),
        }
    }
}

/// Base tile layer attached when a map instance is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerSpec {
    pub url_template: String,
    pub detect_retina: bool,
    pub reuse_tiles: bool,
    pub update_when_idle: bool,
}

impl TileLayerSpec {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            detect_retina: true,
            reuse_tiles: true,
            update_when_idle: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_kind_display() {
        assert_eq!(LayerKind::Tile.to_string(), "tile");
        assert_eq!(LayerKind::Marker.to_string(), "marker");
        assert_eq!(LayerKind::Route.to_string(), "route");
        assert_eq!(LayerId(7).to_string(), "layer#7");
    }

    #[test]
    fn test_tile_spec_defaults() {
        let tiles = TileLayerSpec::new("https://tile/{z}/{x}/{y}.png");
        assert!(tiles.detect_retina);
        assert!(tiles.reuse_tiles);
        assert!(tiles.update_when_idle);
    }
}
