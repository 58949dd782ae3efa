//! Credential pools — interchangeable API keys read from the environment.

use rand::seq::SliceRandom;
use swarm_core::utils::mask_secret;

/// Primary hosted-API key variable. Numbered variants `OPENAI_API_KEY0..=9`
/// extend the pool.
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

/// Key used by the vision client.
pub const VISION_KEY_VAR: &str = "MULTIMODE_OPENAI_API_KEY";

const NUMBERED_KEY_SLOTS: usize = 10;

/// A pool of API keys. One key is chosen uniformly at random per call.
#[derive(Clone, Default)]
pub struct CredentialPool {
    keys: Vec<String>,
}

impl std::fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.keys.iter().map(|k| mask_secret(k)))
            .finish()
    }
}

impl CredentialPool {
    /// Build a pool from explicit keys; blank keys are dropped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .map(|k: String| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys }
    }

    /// Hosted-API pool from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Hosted-API pool from an arbitrary variable lookup:
    /// `OPENAI_API_KEY`, then `OPENAI_API_KEY0` through `OPENAI_API_KEY9`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let names = std::iter::once(OPENAI_KEY_VAR.to_string())
            .chain((0..NUMBERED_KEY_SLOTS).map(|i| format!("{OPENAI_KEY_VAR}{i}")));
        Self::new(names.filter_map(|name| lookup(&name)))
    }

    /// Single-key pool for the vision client.
    pub fn vision_from_env() -> Self {
        Self::new(std::env::var(VISION_KEY_VAR).ok())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Pick a key uniformly at random, independent of earlier picks.
    pub fn pick(&self) -> Option<&str> {
        self.keys.choose(&mut rand::thread_rng()).map(String::as_str)
    }

    /// Masked keys, for display.
    pub fn masked(&self) -> Vec<String> {
        self.keys.iter().map(|k| mask_secret(k)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_blank_keys_are_dropped() {
        let pool = CredentialPool::new(["sk-a", "", "  ", "sk-b"]);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_from_lookup_reads_numbered_slots() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-main"),
            ("OPENAI_API_KEY0", "sk-zero"),
            ("OPENAI_API_KEY7", "sk-seven"),
            ("OPENAI_API_KEY10", "sk-out-of-range"),
        ]
        .into_iter()
        .collect();

        let pool = CredentialPool::from_lookup(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_empty_pool_picks_nothing() {
        let pool = CredentialPool::default();
        assert!(pool.is_empty());
        assert!(pool.pick().is_none());
    }

    #[test]
    fn test_pick_covers_the_pool() {
        let pool = CredentialPool::new(["sk-1", "sk-2", "sk-3"]);
        let seen: HashSet<&str> = (0..300).filter_map(|_| pool.pick()).collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_debug_masks_keys() {
        let pool = CredentialPool::new(["sk-proj-abcdefghijklmnop"]);
        let debug = format!("{pool:?}");
        assert!(!debug.contains("abcdefghijkl"));
        assert!(debug.contains("mnop"));
    }
}
