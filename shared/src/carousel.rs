//! State machine behind the horizontally scrolling repository cards.
//!
//! The browser (or a test) feeds [`CarouselEvent`]s into [`Carousel::update`] and
//! applies the returned [`Effect`]s. The only state that outlives a page is the
//! "scroll hint seen" flag, kept behind a [`HintStore`].

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SCROLL_HINT_KEY: &str = "github-widget-scroll-hint-seen";
/// Horizontal gap between two cards, in pixels.
pub const CARD_GAP: f64 = 16.0;
/// Scrolling further than this dismisses the hint.
pub const HINT_DISMISS_OFFSET: f64 = 10.0;

/// Durable key/value storage on the client side.
pub trait HintStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;

    fn hint_seen(&self) -> bool {
        self.get(SCROLL_HINT_KEY).as_deref() == Some("true")
    }

    fn mark_hint_seen(&mut self) -> anyhow::Result<()> {
        self.set(SCROLL_HINT_KEY, "true")
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryHintStore(HashMap<String, String>);

impl HintStore for MemoryHintStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key inside `dir`. Backs embedders without a browser cookie jar,
/// such as a desktop shell or a CLI preview.
#[derive(Debug, Clone)]
pub struct FileHintStore {
    dir: PathBuf,
}

impl FileHintStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl HintStore for FileHintStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.dir.join(key))
            .ok()
            .map(|value| value.trim().to_string())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CarouselEvent {
    Scroll { offset: f64, card_width: f64 },
    Key { key: Key, card_focused: bool },
    Detach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Smoothly scroll the card at `index` to the centre of the track.
    ScrollIntoView { index: usize },
    PersistHintSeen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carousel {
    pub active_index: usize,
    pub hint_visible: bool,
    pub card_count: usize,
    #[serde(default = "attached_by_default")]
    attached: bool,
}

fn attached_by_default() -> bool {
    true
}

impl Carousel {
    pub fn attach(card_count: usize, store: &impl HintStore) -> Self {
        Self {
            active_index: 0,
            hint_visible: !store.hint_seen(),
            card_count,
            attached: true,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn last_index(&self) -> usize {
        self.card_count.saturating_sub(1)
    }

    pub fn update(&mut self, event: CarouselEvent, store: &mut impl HintStore) -> Vec<Effect> {
        if !self.attached {
            return vec![];
        }

        match event {
            CarouselEvent::Scroll { offset, card_width } => {
                self.on_scroll(offset, card_width, store)
            }
            CarouselEvent::Key { key, card_focused } if card_focused => self.on_key(key),
            CarouselEvent::Key { .. } => vec![],
            CarouselEvent::Detach => {
                self.attached = false;
                vec![]
            }
        }
    }

    fn on_scroll(
        &mut self,
        offset: f64,
        card_width: f64,
        store: &mut impl HintStore,
    ) -> Vec<Effect> {
        let mut effects = vec![];

        let stride = card_width + CARD_GAP;
        if stride > 0.0 && offset.is_finite() {
            let index = (offset / stride).round().max(0.0) as usize;
            self.active_index = index.min(self.last_index());
        }

        if self.hint_visible && offset > HINT_DISMISS_OFFSET {
            self.hint_visible = false;
            match store.mark_hint_seen() {
                Ok(()) => effects.push(Effect::PersistHintSeen),
                Err(e) => warn!("Failed to persist scroll hint flag: {e}"),
            }
        }

        effects
    }

    fn on_key(&mut self, key: Key) -> Vec<Effect> {
        if self.card_count == 0 {
            return vec![];
        }

        let target = match key {
            Key::ArrowLeft if self.active_index > 0 => self.active_index - 1,
            Key::ArrowRight if self.active_index < self.last_index() => self.active_index + 1,
            Key::Home if self.active_index != 0 => 0,
            Key::End if self.active_index != self.last_index() => self.last_index(),
            _ => return vec![],
        };

        // Optimistic: the index moves now, not when the smooth scroll settles.
        self.active_index = target;
        vec![Effect::ScrollIntoView { index: target }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key) -> CarouselEvent {
        CarouselEvent::Key {
            key,
            card_focused: true,
        }
    }

    fn scroll(offset: f64) -> CarouselEvent {
        CarouselEvent::Scroll {
            offset,
            card_width: 284.0,
        }
    }

    #[test]
    fn hint_is_shown_once_across_mounts() {
        let mut store = MemoryHintStore::default();
        let mut carousel = Carousel::attach(5, &store);
        assert!(carousel.hint_visible);

        let effects = carousel.update(scroll(15.0), &mut store);
        assert!(!carousel.hint_visible);
        assert_eq!(effects, vec![Effect::PersistHintSeen]);
        assert_eq!(store.get(SCROLL_HINT_KEY).as_deref(), Some("true"));

        let remounted = Carousel::attach(5, &store);
        assert!(!remounted.hint_visible);
    }

    #[test]
    fn small_scroll_keeps_hint() {
        let mut store = MemoryHintStore::default();
        let mut carousel = Carousel::attach(5, &store);

        let effects = carousel.update(scroll(10.0), &mut store);
        assert!(carousel.hint_visible);
        assert!(effects.is_empty());
        assert!(!store.hint_seen());
    }

    #[test]
    fn scroll_picks_nearest_card() {
        let mut store = MemoryHintStore::default();
        let mut carousel = Carousel::attach(4, &store);

        carousel.update(scroll(300.0), &mut store);
        assert_eq!(carousel.active_index, 1);
        carousel.update(scroll(449.0), &mut store);
        assert_eq!(carousel.active_index, 1);
        carousel.update(scroll(451.0), &mut store);
        assert_eq!(carousel.active_index, 2);
        carousel.update(scroll(10_000.0), &mut store);
        assert_eq!(carousel.active_index, 3);
        carousel.update(scroll(-40.0), &mut store);
        assert_eq!(carousel.active_index, 0);
    }

    #[test]
    fn arrows_move_until_the_edges() {
        let mut store = MemoryHintStore::default();
        let mut carousel = Carousel::attach(3, &store);

        assert!(carousel.update(key(Key::ArrowLeft), &mut store).is_empty());
        assert_eq!(carousel.active_index, 0);

        assert_eq!(
            carousel.update(key(Key::ArrowRight), &mut store),
            vec![Effect::ScrollIntoView { index: 1 }]
        );
        assert_eq!(
            carousel.update(key(Key::ArrowRight), &mut store),
            vec![Effect::ScrollIntoView { index: 2 }]
        );
        assert!(carousel.update(key(Key::ArrowRight), &mut store).is_empty());
        assert_eq!(carousel.active_index, 2);

        assert_eq!(
            carousel.update(key(Key::ArrowLeft), &mut store),
            vec![Effect::ScrollIntoView { index: 1 }]
        );
    }

    #[test]
    fn home_and_end_jump() {
        let mut store = MemoryHintStore::default();
        let mut carousel = Carousel::attach(6, &store);

        assert_eq!(
            carousel.update(key(Key::End), &mut store),
            vec![Effect::ScrollIntoView { index: 5 }]
        );
        assert!(carousel.update(key(Key::End), &mut store).is_empty());
        assert_eq!(
            carousel.update(key(Key::Home), &mut store),
            vec![Effect::ScrollIntoView { index: 0 }]
        );
    }

    #[test]
    fn keys_need_a_focused_card() {
        let mut store = MemoryHintStore::default();
        let mut carousel = Carousel::attach(3, &store);

        let effects = carousel.update(
            CarouselEvent::Key {
                key: Key::ArrowRight,
                card_focused: false,
            },
            &mut store,
        );
        assert!(effects.is_empty());
        assert_eq!(carousel.active_index, 0);
    }

    #[test]
    fn empty_carousel_ignores_navigation() {
        let mut store = MemoryHintStore::default();
        let mut carousel = Carousel::attach(0, &store);

        assert!(carousel.update(key(Key::ArrowRight), &mut store).is_empty());
        assert!(carousel.update(key(Key::End), &mut store).is_empty());
        carousel.update(scroll(600.0), &mut store);
        assert_eq!(carousel.active_index, 0);
    }

    #[test]
    fn detached_carousel_ignores_events() {
        let mut store = MemoryHintStore::default();
        let mut carousel = Carousel::attach(3, &store);

        carousel.update(CarouselEvent::Detach, &mut store);
        assert!(!carousel.is_attached());
        assert!(carousel.update(scroll(400.0), &mut store).is_empty());
        assert!(carousel.hint_visible);
        assert!(!store.hint_seen());
    }

    #[test]
    fn events_decode_from_json() {
        let event: CarouselEvent =
            serde_json::from_str(r#"{"type":"key","key":"ArrowRight","card_focused":true}"#)
                .unwrap();
        assert_eq!(event, key(Key::ArrowRight));
    }

    #[test]
    fn state_without_attached_flag_decodes_as_attached() {
        let carousel: Carousel =
            serde_json::from_str(r#"{"active_index":1,"hint_visible":false,"card_count":4}"#)
                .unwrap();
        assert!(carousel.is_attached());
        assert_eq!(carousel.active_index, 1);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileHintStore::new(dir.path().join("flags"));
        assert!(!store.hint_seen());

        let mut carousel = Carousel::attach(2, &store);
        carousel.update(scroll(50.0), &mut store);

        let reopened = FileHintStore::new(dir.path().join("flags"));
        assert!(reopened.hint_seen());
        assert!(!Carousel::attach(2, &reopened).hint_visible);
    }
}
