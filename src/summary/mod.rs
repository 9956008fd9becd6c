//! In-memory model of accumulated time.
//!
//! A [Summary] maps an application name to an [AppRecord], and an [AppRecord] maps a window
//! title to the number of seconds spent in it. Every application also carries one derived
//! entry under [total_time_key], which [aggregate::recompute_total_time] keeps equal to the
//! sum of the other entries.

pub mod aggregate;

use std::collections::{btree_map, BTreeMap};

const TOTAL_TIME_SUFFIX: &str = "total time";

/// Name of the derived entry holding the total time of `app_name`.
pub fn total_time_key(app_name: &str) -> String {
    format!("{app_name} {TOTAL_TIME_SUFFIX}")
}

/// Seconds spent per window title of one application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppRecord {
    titles: BTreeMap<String, f64>,
}

impl AppRecord {
    pub fn get(&self, title: &str) -> Option<f64> {
        self.titles.get(title).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.titles.iter().map(|(title, seconds)| (title.as_str(), *seconds))
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Adds `seconds` to `title`, creating the entry if needed.
    pub fn add(&mut self, title: impl Into<String>, seconds: f64) {
        *self.titles.entry(title.into()).or_insert(0.) += seconds;
    }

    pub(crate) fn remove(&mut self, title: &str) -> Option<f64> {
        self.titles.remove(title)
    }

    pub(crate) fn insert(&mut self, title: String, seconds: f64) {
        self.titles.insert(title, seconds);
    }

    /// Sum of every entry currently present, derived entry included.
    pub fn sum(&self) -> f64 {
        self.titles.values().sum()
    }
}

impl<T: Into<String>> FromIterator<(T, f64)> for AppRecord {
    fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
        let mut record = AppRecord::default();
        for (title, seconds) in iter {
            record.add(title, seconds);
        }
        record
    }
}

/// Accumulated time for every application seen during a day (or a merge of days).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    apps: BTreeMap<String, AppRecord>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `seconds` to the `(app_name, title)` entry. Both the application and the title are
    /// created on first use. Inputs are not validated here.
    pub fn accumulate(&mut self, app_name: &str, title: &str, seconds: f64) {
        self.apps
            .entry(app_name.to_owned())
            .or_default()
            .add(title, seconds);
    }

    pub fn app(&self, app_name: &str) -> Option<&AppRecord> {
        self.apps.get(app_name)
    }

    pub fn apps(&self) -> impl Iterator<Item = (&str, &AppRecord)> {
        self.apps.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub(crate) fn apps_mut(&mut self) -> impl Iterator<Item = (&String, &mut AppRecord)> {
        self.apps.iter_mut()
    }

    pub(crate) fn app_entry(&mut self, app_name: String) -> btree_map::Entry<'_, String, AppRecord> {
        self.apps.entry(app_name)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Number of `(application, title)` entries, derived entries included.
    pub fn entry_count(&self) -> usize {
        self.apps.values().map(AppRecord::len).sum()
    }
}

impl<A: Into<String>> FromIterator<(A, AppRecord)> for Summary {
    fn from_iter<I: IntoIterator<Item = (A, AppRecord)>>(iter: I) -> Self {
        Summary {
            apps: iter
                .into_iter()
                .map(|(name, record)| (name.into(), record))
                .collect(),
        }
    }
}
