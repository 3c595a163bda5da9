//! Background music ducking
//!
//! While the minigame is mounted the site's music player is paused, and
//! resumed when the game goes away. The guard only resumes what it paused.

/// The site's music player
pub trait MusicPlayer {
    fn is_playing(&self) -> bool;
    fn pause(&mut self);
    fn resume(&mut self);
}

/// Pauses music on creation, resumes it on drop
pub struct MusicDuck {
    player: Box<dyn MusicPlayer>,
    paused_by_us: bool,
}

impl MusicDuck {
    pub fn engage(mut player: Box<dyn MusicPlayer>) -> Self {
        let paused_by_us = player.is_playing();
        if paused_by_us {
            player.pause();
            log::info!("Background music paused for minigame");
        }
        Self {
            player,
            paused_by_us,
        }
    }

    #[cfg(test)]
    pub(crate) fn paused_by_us(&self) -> bool {
        self.paused_by_us
    }
}

impl Drop for MusicDuck {
    fn drop(&mut self) {
        if self.paused_by_us {
            self.player.resume();
            log::info!("Background music resumed");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::MediaElementPlayer;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use web_sys::HtmlMediaElement;

    use super::MusicPlayer;

    /// An `<audio>` element on the page
    pub struct MediaElementPlayer {
        element: HtmlMediaElement,
    }

    impl MediaElementPlayer {
        pub fn by_id(id: &str) -> Option<Self> {
            let element = web_sys::window()?
                .document()?
                .get_element_by_id(id)?
                .dyn_into::<HtmlMediaElement>()
                .ok()?;
            Some(Self { element })
        }
    }

    impl MusicPlayer for MediaElementPlayer {
        fn is_playing(&self) -> bool {
            !self.element.paused()
        }

        fn pause(&mut self) {
            let _ = self.element.pause();
        }

        fn resume(&mut self) {
            // Autoplay policy may reject this; nothing to do about it
            let _ = self.element.play();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Shared-flag fake for controller tests
    #[derive(Clone, Default)]
    pub(crate) struct FakePlayer {
        pub playing: Rc<Cell<bool>>,
        pub resumes: Rc<Cell<u32>>,
    }

    impl MusicPlayer for FakePlayer {
        fn is_playing(&self) -> bool {
            self.playing.get()
        }
        fn pause(&mut self) {
            self.playing.set(false);
        }
        fn resume(&mut self) {
            self.playing.set(true);
            self.resumes.set(self.resumes.get() + 1);
        }
    }

    #[test]
    fn ducks_and_restores_playing_music() {
        let player = FakePlayer::default();
        player.playing.set(true);
        let duck = MusicDuck::engage(Box::new(player.clone()));
        assert!(!player.playing.get());
        assert!(duck.paused_by_us());
        drop(duck);
        assert!(player.playing.get());
        assert_eq!(player.resumes.get(), 1);
    }

    #[test]
    fn leaves_silent_player_alone() {
        let player = FakePlayer::default();
        let duck = MusicDuck::engage(Box::new(player.clone()));
        drop(duck);
        assert!(!player.playing.get());
        assert_eq!(player.resumes.get(), 0);
    }
}
