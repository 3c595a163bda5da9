//! Score sharing
//!
//! The summary is plain text for the player to paste elsewhere; no network.

/// Destination for share text (clipboard on the web)
pub trait ShareSink {
    fn share(&mut self, text: &str);
}

/// Build the share text for a finished run
pub fn score_summary(score: u32, best: u32, rank: Option<usize>) -> String {
    let mut text = format!("I scored {} in the fan-site flappy game!", score);
    if best > score {
        text.push_str(&format!(" (best: {})", best));
    } else if score > 0 && best == score {
        text.push_str(" New personal best!");
    }
    if let Some(rank) = rank {
        text.push_str(&format!(" Ranked #{} on the leaderboard.", rank));
    }
    text
}

#[cfg(target_arch = "wasm32")]
pub use web::ClipboardSink;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::ShareSink;

    /// Writes to the async clipboard API; the promise result is ignored
    #[derive(Debug, Default)]
    pub struct ClipboardSink;

    impl ShareSink for ClipboardSink {
        fn share(&mut self, text: &str) {
            let Some(window) = web_sys::window() else { return };
            let _ = window.navigator().clipboard().write_text(text);
            log::info!("Score copied to clipboard");
        }
    }
}
