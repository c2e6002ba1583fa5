//! Configuration for an editing session.

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed for reproducible table rolls. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Show each entry's chance when printing tables.
    pub show_probabilities: bool,
    /// List free slots when printing tables.
    pub show_free: bool,
    /// Write the document after every command that changes it.
    pub autosave: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            show_probabilities: true,
            show_free: false,
            autosave: true,
        }
    }
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Toggle probabilities in table listings.
    pub fn with_probabilities(mut self, show: bool) -> Self {
        self.show_probabilities = show;
        self
    }

    /// Toggle free slots in table listings.
    pub fn with_free_slots(mut self, show: bool) -> Self {
        self.show_free = show;
        self
    }

    /// Toggle saving after each changing command.
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }
}
