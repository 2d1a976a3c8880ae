// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The guest's policy store and its load state machine.

use cedar_policy::PolicySet;

use crate::status::LoadError;

/// Observable state of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No policies held.
    Empty,
    /// Holding the result of the most recent successful non-empty parse.
    Loaded,
    /// The most recent load failed; the held policies are untouched.
    Rejected,
}

/// What a successful load did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Zero-length input; held policies were kept.
    AcceptedEmpty,
    /// The held set was replaced with `policies` policies and `templates` templates.
    Replaced { policies: usize, templates: usize },
}

#[derive(Debug)]
pub struct PolicyStore {
    policies: Option<PolicySet>,
    state: StoreState,
    last_load_empty: bool,
}

impl PolicyStore {
    pub const fn new() -> Self {
        Self {
            policies: None,
            state: StoreState::Empty,
            last_load_empty: false,
        }
    }

    /// Parse `bytes` as a Cedar policy set and apply it.
    ///
    /// Non-empty text replaces the held set in one step, even when it holds
    /// no statements (whitespace or comments only). Zero-length input is an
    /// empty load: accepted once, then rejected with
    /// [`LoadError::DuplicateEmptyLoad`] until a non-empty load re-arms the
    /// guard. Every failure leaves the held set unchanged.
    pub fn load(&mut self, bytes: &[u8]) -> Result<LoadOutcome, LoadError> {
        let result = self.apply(bytes);
        if result.is_err() {
            self.state = StoreState::Rejected;
        }
        result
    }

    fn apply(&mut self, bytes: &[u8]) -> Result<LoadOutcome, LoadError> {
        if bytes.is_empty() {
            if self.last_load_empty {
                return Err(LoadError::DuplicateEmptyLoad);
            }
            self.last_load_empty = true;
            self.state = self.settled_state();
            return Ok(LoadOutcome::AcceptedEmpty);
        }

        let text = std::str::from_utf8(bytes).map_err(|_| LoadError::InvalidUtf8)?;
        let set = parse_policies(text)?;

        let outcome = LoadOutcome::Replaced {
            policies: set.policies().count(),
            templates: set.templates().count(),
        };
        self.policies = Some(set);
        self.last_load_empty = false;
        self.state = StoreState::Loaded;
        Ok(outcome)
    }

    fn settled_state(&self) -> StoreState {
        if self.policies.is_some() {
            StoreState::Loaded
        } else {
            StoreState::Empty
        }
    }

    /// Number of static and template-linked policies held.
    pub fn count_policies(&self) -> usize {
        self.policies.as_ref().map_or(0, |p| p.policies().count())
    }

    /// Number of templates held.
    pub fn count_templates(&self) -> usize {
        self.policies.as_ref().map_or(0, |p| p.templates().count())
    }

    pub fn state(&self) -> StoreState {
        self.state
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_policies(text: &str) -> Result<PolicySet, LoadError> {
    text.parse().map_err(|_| LoadError::PolicyParsing)
}
