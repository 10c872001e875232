use serde::Serialize;

use crate::cards::CardState;

/// Point-in-time view of navigation state, for logging and tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigatorSnapshot {
    pub active_index: usize,
    pub target_index: usize,
    pub transitioning: bool,
    pub panels: Vec<PanelSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub ordinal: usize,
    pub name: String,
    pub active: bool,
    pub self_handling: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<CardSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepSnapshot {
    pub current: usize,
    pub len: usize,
    pub animating: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSnapshot {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<&CardState> for CardSnapshot {
    fn from(card: &CardState) -> Self {
        Self {
            id: card.id.clone(),
            x: card.x,
            y: card.y,
            width: card.width,
            height: card.height,
        }
    }
}
