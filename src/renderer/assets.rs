//! Image assets
//!
//! Images load asynchronously and the frame never waits for them: each
//! frame asks whether an asset is ready and draws a placeholder if not.

/// Images the scene can draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    Player,
    ObstacleA,
    ObstacleB,
    Ground,
}

impl AssetId {
    pub const ALL: [AssetId; 4] = [
        AssetId::Player,
        AssetId::ObstacleA,
        AssetId::ObstacleB,
        AssetId::Ground,
    ];

    /// File name relative to the asset base URL
    pub fn file_name(self) -> &'static str {
        match self {
            AssetId::Player => "player.png",
            AssetId::ObstacleA => "obstacle_a.png",
            AssetId::ObstacleB => "obstacle_b.png",
            AssetId::Ground => "ground.png",
        }
    }
}

/// Load status lookup, checked every frame
pub trait AssetStatus {
    fn is_ready(&self, id: AssetId) -> bool;
}

/// Nothing ever loads; everything renders as placeholders
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAssets;

impl AssetStatus for NoAssets {
    fn is_ready(&self, _id: AssetId) -> bool {
        false
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::ImageAssets;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::HtmlImageElement;

    use super::{AssetId, AssetStatus};

    /// `<img>` elements created off-DOM; the browser loads them in the background
    pub struct ImageAssets {
        images: Vec<(AssetId, HtmlImageElement)>,
    }

    impl ImageAssets {
        /// Start loading every asset under `base_url`
        pub fn load(base_url: &str) -> Self {
            let base = base_url.trim_end_matches('/');
            let images = AssetId::ALL
                .iter()
                .filter_map(|&id| {
                    let img = HtmlImageElement::new().ok()?;
                    img.set_src(&format!("{}/{}", base, id.file_name()));
                    Some((id, img))
                })
                .collect();
            log::info!("Loading assets from {}", base);
            Self { images }
        }

        pub fn image(&self, id: AssetId) -> Option<&HtmlImageElement> {
            self.images
                .iter()
                .find(|(asset, _)| *asset == id)
                .map(|(_, img)| img)
        }
    }

    impl AssetStatus for ImageAssets {
        fn is_ready(&self, id: AssetId) -> bool {
            // A failed load also reports complete, with zero size
            self.image(id)
                .is_some_and(|img| img.complete() && img.natural_width() > 0)
        }
    }
}
