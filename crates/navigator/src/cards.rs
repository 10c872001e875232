//! Floating image cards that can be dragged around (and, for resizable cards,
//! resized) on top of a panel. Card state is ephemeral: it is rebuilt from
//! configuration on every remount and never feeds back into navigation.
use deckconfig::{CardConfig, CardKind, ViewportConfig, MIN_CARD_EDGE};
use serde::Serialize;

use crate::gesture::{PointerTarget, NO_SWIPE};

/// Below this width the layout switches to its mobile arrangement.
pub const MOBILE_BREAKPOINT: f32 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_mobile(&self) -> bool {
        self.width < MOBILE_BREAKPOINT
    }

    /// Cards may travel half a viewport from their origin in every direction.
    fn half_extent(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl From<ViewportConfig> for Viewport {
    fn from(config: ViewportConfig) -> Self {
        Self::new(config.width, config.height)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CardError {
    #[error("card '{0}' not found")]
    UnknownCard(String),
    #[error("card '{0}' is not resizable")]
    NotResizable(String),
    #[error("no card is currently grabbed")]
    NothingGrabbed,
}

/// What a pointer press on a card grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grab {
    /// The card body; moving the pointer moves the card.
    Move,
    /// The resize handle in the corner.
    Resize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardState {
    pub id: String,
    pub kind: CardKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CardState {
    fn from_config(config: &CardConfig, viewport: Viewport) -> Self {
        let (x, y, width, height) = config.geometry(viewport.is_mobile());
        Self {
            id: config.id.clone(),
            kind: config.kind,
            x,
            y,
            width,
            height,
        }
    }

    /// Pointer target for events over this card; always exempt from
    /// section navigation.
    pub fn pointer_target(&self) -> PointerTarget {
        PointerTarget::with_markers([format!("card:{}", self.id), NO_SWIPE.to_string()])
    }
}

#[derive(Debug, Clone)]
struct Press {
    index: usize,
    grab: Grab,
    origin: (f32, f32),
    start: CardState,
}

#[derive(Debug, Clone)]
pub struct CardBoard {
    configs: Vec<CardConfig>,
    cards: Vec<CardState>,
    viewport: Viewport,
    press: Option<Press>,
}

impl CardBoard {
    pub fn new(configs: &[CardConfig], viewport: Viewport) -> Self {
        Self {
            configs: configs.to_vec(),
            cards: layout(configs, viewport),
            viewport,
            press: None,
        }
    }

    pub fn cards(&self) -> &[CardState] {
        &self.cards
    }

    pub fn card(&self, id: &str) -> Option<&CardState> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remount: positions and sizes return to their configured values.
    pub fn reset(&mut self) {
        self.cards = layout(&self.configs, self.viewport);
        self.press = None;
    }

    pub fn press(&mut self, id: &str, grab: Grab, at: (f32, f32)) -> Result<(), CardError> {
        let index = self
            .cards
            .iter()
            .position(|card| card.id == id)
            .ok_or_else(|| CardError::UnknownCard(id.to_string()))?;
        let card = &self.cards[index];
        if grab == Grab::Resize && card.kind != CardKind::Resizable {
            return Err(CardError::NotResizable(id.to_string()));
        }
        self.press = Some(Press {
            index,
            grab,
            origin: at,
            start: card.clone(),
        });
        Ok(())
    }

    /// Applies pointer movement relative to where the press started.
    pub fn motion(&mut self, at: (f32, f32)) -> Result<&CardState, CardError> {
        let press = self.press.as_ref().ok_or(CardError::NothingGrabbed)?;
        let dx = at.0 - press.origin.0;
        let dy = at.1 - press.origin.1;
        let (half_w, half_h) = self.viewport.half_extent();
        let card = &mut self.cards[press.index];
        match press.grab {
            Grab::Move => {
                card.x = (press.start.x + dx).clamp(-half_w, half_w);
                card.y = (press.start.y + dy).clamp(-half_h, half_h);
            }
            Grab::Resize => {
                card.width = (press.start.width + dx).max(MIN_CARD_EDGE);
                card.height = (press.start.height + dy).max(MIN_CARD_EDGE);
            }
        }
        Ok(card)
    }

    pub fn release(&mut self) {
        self.press = None;
    }

    pub fn drag(&mut self, id: &str, dx: f32, dy: f32) -> Result<CardState, CardError> {
        self.gesture(id, Grab::Move, dx, dy)
    }

    pub fn resize(&mut self, id: &str, dw: f32, dh: f32) -> Result<CardState, CardError> {
        self.gesture(id, Grab::Resize, dw, dh)
    }

    fn gesture(&mut self, id: &str, grab: Grab, dx: f32, dy: f32) -> Result<CardState, CardError> {
        self.press(id, grab, (0.0, 0.0))?;
        let state = self.motion((dx, dy)).cloned();
        self.release();
        state
    }
}

fn layout(configs: &[CardConfig], viewport: Viewport) -> Vec<CardState> {
    configs
        .iter()
        .map(|config| CardState::from_config(config, viewport))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckconfig::CardGeometry;

    fn configs() -> Vec<CardConfig> {
        vec![
            CardConfig {
                id: "facade".into(),
                kind: CardKind::Draggable,
                x: 0.0,
                y: 0.0,
                width: 256.0,
                height: 160.0,
                mobile: Some(CardGeometry {
                    x: Some(-60.0),
                    y: Some(-200.0),
                    width: Some(180.0),
                    height: None,
                }),
            },
            CardConfig {
                id: "mosaic".into(),
                kind: CardKind::Resizable,
                x: 100.0,
                y: -50.0,
                width: 256.0,
                height: 256.0,
                mobile: None,
            },
        ]
    }

    fn board() -> CardBoard {
        CardBoard::new(&configs(), Viewport::new(1000.0, 800.0))
    }

    #[test]
    fn drag_is_clamped_to_half_the_viewport() {
        let mut board = board();
        let card = board.drag("facade", 900.0, -30.0).unwrap();
        assert_eq!(card.x, 500.0);
        assert_eq!(card.y, -30.0);
    }

    #[test]
    fn resize_respects_minimum_edge() {
        let mut board = board();
        let card = board.resize("mosaic", -400.0, 44.0).unwrap();
        assert_eq!(card.width, MIN_CARD_EDGE);
        assert_eq!(card.height, 300.0);
        assert_eq!(
            board.resize("facade", 10.0, 10.0).unwrap_err(),
            CardError::NotResizable("facade".into())
        );
    }

    #[test]
    fn motion_is_relative_to_the_press_origin() {
        let mut board = board();
        board.press("mosaic", Grab::Move, (10.0, 10.0)).unwrap();
        board.motion((20.0, 15.0)).unwrap();
        let card = board.motion((30.0, 20.0)).unwrap();
        assert_eq!((card.x, card.y), (120.0, -40.0));
        board.release();
        assert_eq!(board.motion((0.0, 0.0)).unwrap_err(), CardError::NothingGrabbed);
    }

    #[test]
    fn reset_restores_configured_layout() {
        let mut board = board();
        board.drag("facade", 40.0, 40.0).unwrap();
        board.reset();
        assert_eq!(board.card("facade").map(|c| (c.x, c.y)), Some((0.0, 0.0)));
    }

    #[test]
    fn unknown_cards_are_reported() {
        let mut board = board();
        assert_eq!(
            board.drag("missing", 1.0, 1.0).unwrap_err(),
            CardError::UnknownCard("missing".into())
        );
    }

    #[test]
    fn cards_are_exempt_targets() {
        let board = board();
        let target = board.card("facade").unwrap().pointer_target();
        assert!(target.markers().iter().any(|m| m == NO_SWIPE));
    }

    #[test]
    fn narrow_viewports_use_the_mobile_layout() {
        let viewport = Viewport::new(390.0, 844.0);
        assert!(viewport.is_mobile());
        assert!(!Viewport::new(MOBILE_BREAKPOINT, 720.0).is_mobile());

        let mut board = CardBoard::new(&configs(), viewport);
        let facade = board.card("facade").unwrap();
        assert_eq!(
            (facade.x, facade.y, facade.width, facade.height),
            (-60.0, -200.0, 180.0, 160.0)
        );
        let mosaic = board.card("mosaic").unwrap();
        assert_eq!((mosaic.x, mosaic.width), (100.0, 256.0));

        board.drag("facade", 500.0, 0.0).unwrap();
        assert_eq!(board.card("facade").map(|c| c.x), Some(195.0));
        board.reset();
        assert_eq!(board.card("facade").map(|c| (c.x, c.y)), Some((-60.0, -200.0)));
    }
}
