use crate::keyframes::{EventKind, Placement, TextBlockSpec};

/// Overlays active for the current frame.
///
/// Props are one-shot and cleared once composited. Stamps and text blocks persist until
/// cleared by name; re-setting a name replaces the entry in place so paint order stays the
/// registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayRegistry {
    props: Vec<Placement>,
    stamps: Vec<(String, Placement)>,
    texts: Vec<TextBlockSpec>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an overlay event. Returns `false` for events that do not concern overlays.
    pub fn apply(&mut self, kind: &EventKind) -> bool {
        match kind {
            EventKind::Prop(p) => self.props.push(p.clone()),
            EventKind::StampSet { name, placement } => {
                match self.stamps.iter_mut().find(|(n, _)| n == name) {
                    Some((_, slot)) => *slot = placement.clone(),
                    None => self.stamps.push((name.clone(), placement.clone())),
                }
            }
            EventKind::StampClear { name } => {
                if !self.remove_stamp(name) {
                    tracing::debug!(name, "clear_stamp: no such stamp");
                }
            }
            EventKind::TextSet(spec) => match self.texts.iter_mut().find(|t| t.name == spec.name) {
                Some(slot) => *slot = spec.clone(),
                None => self.texts.push(spec.clone()),
            },
            EventKind::TextClear { name } => {
                let before = self.texts.len();
                self.texts.retain(|t| &t.name != name);
                if self.texts.len() == before {
                    tracing::debug!(name, "clear_text: no such text block");
                }
            }
            _ => return false,
        }
        true
    }

    fn remove_stamp(&mut self, name: &str) -> bool {
        let before = self.stamps.len();
        self.stamps.retain(|(n, _)| n != name);
        self.stamps.len() != before
    }

    /// Image overlays in paint order: props first, then stamps.
    pub fn image_layers(&self) -> impl Iterator<Item = &Placement> {
        self.props
            .iter()
            .chain(self.stamps.iter().map(|(_, p)| p))
    }

    pub fn text_blocks(&self) -> &[TextBlockSpec] {
        &self.texts
    }

    pub fn props(&self) -> &[Placement] {
        &self.props
    }

    pub fn stamp_names(&self) -> impl Iterator<Item = &str> {
        self.stamps.iter().map(|(n, _)| n.as_str())
    }

    /// Drop one-shot props after the frame that used them.
    pub fn clear_props(&mut self) {
        self.props.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.stamps.is_empty() && self.texts.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/registry.rs"]
mod tests;
