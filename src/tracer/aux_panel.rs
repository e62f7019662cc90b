use crate::error::{Result, TracerError};
use crate::step::{AuxPanel, AuxPanelItem, Step};
use crate::value::Value;

/// Named secondary lists (queues, stacks, sets) shown next to the primary
/// visual. Panels keep the order of their first `add_panel` call.
#[derive(Debug, Clone, Default)]
pub struct AuxPanelTracer {
    panels: Vec<AuxPanel>,
}

impl AuxPanelTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a panel. Repeated calls leave the panel and its position alone.
    pub fn add_panel(&mut self, title: impl Into<String>) {
        let title = title.into();
        if self.panels.iter().all(|p| p.title != title) {
            self.panels.push(AuxPanel {
                title,
                items: Vec::new(),
            });
        }
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.panels.iter().map(|p| p.title.as_str())
    }

    pub fn items(&self, title: &str) -> Result<&[AuxPanelItem]> {
        self.panels
            .iter()
            .find(|p| p.title == title)
            .map(|p| p.items.as_slice())
            .ok_or_else(|| TracerError::UnknownPanel(title.to_string()))
    }

    fn panel_mut(&mut self, title: &str) -> Result<&mut AuxPanel> {
        self.panels
            .iter_mut()
            .find(|p| p.title == title)
            .ok_or_else(|| TracerError::UnknownPanel(title.to_string()))
    }

    fn item_mut(&mut self, title: &str, index: usize) -> Result<&mut AuxPanelItem> {
        let panel = self.panel_mut(title)?;
        let len = panel.items.len();
        panel.items.get_mut(index).ok_or(TracerError::ItemOutOfRange {
            title: title.to_string(),
            index,
            len,
        })
    }

    /// Appends an item at the back of the panel.
    pub fn push(&mut self, title: &str, label: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.panel_mut(title)?.items.push(AuxPanelItem::new(label, value));
        Ok(())
    }

    /// Removes the back item (stack order). An empty panel yields `None`.
    pub fn pop(&mut self, title: &str) -> Result<Option<AuxPanelItem>> {
        let item = self.panel_mut(title)?.items.pop();
        if item.is_none() {
            tracing::warn!(panel = title, "pop on empty aux panel");
        }
        Ok(item)
    }

    /// Removes the front item (queue order). An empty panel yields `None`.
    pub fn pop_front(&mut self, title: &str) -> Result<Option<AuxPanelItem>> {
        let panel = self.panel_mut(title)?;
        if panel.items.is_empty() {
            tracing::warn!(panel = title, "pop_front on empty aux panel");
            return Ok(None);
        }
        Ok(Some(panel.items.remove(0)))
    }

    pub fn clear_panel(&mut self, title: &str) -> Result<()> {
        self.panel_mut(title)?.items.clear();
        Ok(())
    }

    /// Replaces the whole contents of a panel, dropping any overlay flags.
    pub fn set_items<I, L, V>(&mut self, title: &str, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<Value>,
    {
        let panel = self.panel_mut(title)?;
        panel.items = pairs
            .into_iter()
            .map(|(label, value)| AuxPanelItem::new(label, value))
            .collect();
        Ok(())
    }

    pub fn select_item(&mut self, title: &str, index: usize) -> Result<()> {
        self.item_mut(title, index)?.selected = true;
        Ok(())
    }

    pub fn deselect_all_items(&mut self, title: &str) -> Result<()> {
        self.panel_mut(title)?
            .items
            .iter_mut()
            .for_each(|i| i.selected = false);
        Ok(())
    }

    pub fn patch_item(&mut self, title: &str, index: usize) -> Result<()> {
        self.item_mut(title, index)?.patched = true;
        Ok(())
    }

    pub fn depatch_all_items(&mut self, title: &str) -> Result<()> {
        self.panel_mut(title)?
            .items
            .iter_mut()
            .for_each(|i| i.patched = false);
        Ok(())
    }

    pub fn mark_item_error(&mut self, title: &str, index: usize) -> Result<()> {
        self.item_mut(title, index)?.error = true;
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<AuxPanel> {
        self.panels.clone()
    }
}

/// Attaches the aux tracer's current panels to a frame produced by any
/// primary tracer. Neither argument is modified; without a tracer the frame
/// comes back as is.
pub fn combine_step(step: &Step, aux: Option<&AuxPanelTracer>) -> Step {
    match aux {
        Some(aux) => step.with_aux_panels(aux.snapshot()),
        None => step.clone(),
    }
}
