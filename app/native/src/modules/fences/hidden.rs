//! Registry of hidden fences, consumed by the tray-style "hidden fences"
//! surface.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenFence {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct HiddenRegistry {
    entries: Vec<HiddenFence>,
}

impl HiddenRegistry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Adds a fence, or refreshes its title if already listed.
    pub fn add(&mut self, id: &str, title: &str) {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => entry.title = title.to_string(),
            None => self.entries.push(HiddenFence { id: id.to_string(), title: title.to_string() }),
        }
    }

    /// Removes a fence. Returns whether it was listed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool { self.entries.iter().any(|entry| entry.id == id) }

    #[must_use]
    pub fn list(&self) -> &[HiddenFence] { &self.entries }

    pub fn clear(&mut self) { self.entries.clear(); }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
