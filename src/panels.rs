#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    History,
    Stats,
    Help,
}

/// Data a freshly opened panel needs before it can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLoad {
    History,
    Stats,
}

/// At most one panel is visible; toggling the visible one closes it,
/// toggling another switches to it directly.
#[derive(Debug, Default)]
pub struct PanelController {
    visible: Option<Panel>,
}

impl PanelController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> Option<Panel> {
        self.visible
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.visible == Some(panel)
    }

    pub fn toggle(&mut self, panel: Panel) -> Option<PanelLoad> {
        if self.visible == Some(panel) {
            self.visible = None;
            return None;
        }

        self.visible = Some(panel);
        match panel {
            Panel::History => Some(PanelLoad::History),
            Panel::Stats => Some(PanelLoad::Stats),
            Panel::Help => None,
        }
    }
}
