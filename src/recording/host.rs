// src/recording/host.rs
//! Capabilities supplied by the embedding capture layer
//!
//! The pipeline never reads the wall clock or the page directly. Time and the
//! current page URL come from a [`Host`], and form membership comes from a
//! [`FormResolver`], so tests can run against fixed values.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock and page context
pub trait Host: Send + Sync {
    /// Current time in milliseconds since the epoch
    fn now_millis(&self) -> u64;

    /// URL of the page being recorded
    fn current_url(&self) -> String;
}

/// Wall-clock host
#[derive(Debug, Clone)]
pub struct SystemHost {
    url: String,
}

impl SystemHost {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl Host for SystemHost {
    fn now_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }
}

/// Host with a manually advanced clock
#[derive(Debug)]
pub struct FixedHost {
    now: AtomicU64,
    url: RwLock<String>,
}

impl FixedHost {
    pub fn new(now: u64, url: impl Into<String>) -> Self {
        Self {
            now: AtomicU64::new(now),
            url: RwLock::new(url.into()),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::Relaxed);
    }

    pub fn set_url(&self, url: impl Into<String>) {
        *self.url.write() = url.into();
    }
}

impl Host for FixedHost {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }

    fn current_url(&self) -> String {
        self.url.read().clone()
    }
}

/// Resolves the form enclosing an element
///
/// Resolution is best effort: `None` means the element is not inside a form
/// or could not be located, and the grouper simply skips it.
pub trait FormResolver: Send + Sync {
    fn resolve_enclosing_form(&self, selector: &str) -> Option<String>;
}

/// Resolver that never finds a form
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFormResolver;

impl FormResolver for NullFormResolver {
    fn resolve_enclosing_form(&self, _selector: &str) -> Option<String> {
        None
    }
}

/// Resolver backed by a selector → form selector table
#[derive(Debug, Clone, Default)]
pub struct StaticFormResolver {
    forms: HashMap<String, String>,
}

impl StaticFormResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, selector: impl Into<String>, form: impl Into<String>) -> Self {
        self.forms.insert(selector.into(), form.into());
        self
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl From<HashMap<String, String>> for StaticFormResolver {
    fn from(forms: HashMap<String, String>) -> Self {
        Self { forms }
    }
}

impl FormResolver for StaticFormResolver {
    fn resolve_enclosing_form(&self, selector: &str) -> Option<String> {
        self.forms.get(selector).cloned()
    }
}
