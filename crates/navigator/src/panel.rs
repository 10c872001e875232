use deckconfig::PanelConfig;
use timeline::Animator;

use crate::cards::{CardBoard, Viewport};
use crate::choreography::{Choreographer, LayerId};
use crate::steps::{Boundaries, StepSequence};

/// One full-screen section, created at mount and kept for the whole session.
#[derive(Debug, Clone)]
pub struct Panel {
    ordinal: usize,
    name: String,
    self_handling: bool,
    captions: Vec<String>,
    steps: Option<StepSequence>,
    cards: CardBoard,
}

impl Panel {
    pub fn from_config(ordinal: usize, config: &PanelConfig, viewport: Viewport) -> Self {
        let self_handling = config.is_self_handling();
        let steps = self_handling.then(|| {
            StepSequence::new(
                ordinal,
                config.steps.len(),
                config.cooldown,
                config.wheel_threshold,
                Boundaries::adjacent(ordinal, config.chain_forward, config.chain_backward),
            )
        });
        Self {
            ordinal,
            name: config.name.clone(),
            self_handling,
            captions: config.steps.iter().map(|step| step.text.clone()).collect(),
            steps,
            cards: CardBoard::new(&config.cards, viewport),
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_self_handling(&self) -> bool {
        self.self_handling
    }

    pub fn steps(&self) -> Option<&StepSequence> {
        self.steps.as_ref()
    }

    pub(crate) fn steps_mut(&mut self) -> Option<&mut StepSequence> {
        self.steps.as_mut()
    }

    /// Caption of the step currently shown, if the panel declares any.
    pub fn caption(&self) -> Option<&str> {
        let step = self.steps.as_ref().map_or(0, StepSequence::current);
        self.captions.get(step).map(String::as_str)
    }

    pub fn cards(&self) -> &CardBoard {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut CardBoard {
        &mut self.cards
    }

    /// Called on the inactive → active edge. Re-entering always restarts the
    /// panel's own sequence from its first step.
    pub(crate) fn activate<A: Animator<LayerId>>(&mut self, choreo: &mut Choreographer<A>) {
        if let Some(steps) = self.steps.as_mut() {
            steps.reset(choreo);
        }
    }
}
