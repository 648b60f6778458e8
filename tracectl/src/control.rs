// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Runtime control of log levels.

use ordermap::OrderMap;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Registry, prelude::*, reload};

use crate::LevelFilter;
use crate::display::LogTargetDbByTag;
use crate::targets::LOG_TARGETS;
use crate::trace_target;

trace_target!("tracectl", LevelFilter::INFO, &["agent"]);

#[derive(Debug, Error, PartialEq)]
pub enum TraceCtlError {
    #[error("Invalid syntax '{0}': expected tag=level")]
    Syntax(String),
    #[error("Invalid log level '{0}'")]
    BadLevel(String),
    #[error("Unknown tag '{0}'")]
    UnknownTag(String),
}

#[derive(Debug, Clone)]
pub struct TargetCfg {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: Vec<&'static str>,
}
impl TargetCfg {
    fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        // a target can always be addressed by its own name
        let mut tags = tags.to_vec();
        if !tags.contains(&name) {
            tags.push(name);
        }
        Self {
            target,
            name,
            level,
            tags,
        }
    }
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

#[derive(Debug)]
pub(crate) struct LogTargetDb {
    pub(crate) level: LevelFilter,
    pub(crate) targets: OrderMap<&'static str, TargetCfg>,
    pub(crate) tags: OrderMap<&'static str, BTreeSet<&'static str>>,
}

impl LogTargetDb {
    fn new(level: LevelFilter) -> Self {
        let mut db = Self {
            level,
            targets: OrderMap::new(),
            tags: OrderMap::new(),
        };
        for target in LOG_TARGETS {
            db.register(target.target, target.name, target.level, target.tags);
        }
        db
    }
    fn register(
        &mut self,
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) {
        let tconfig = TargetCfg::new(target, name, level, tags);
        for tag in &tconfig.tags {
            self.tags.entry(*tag).or_default().insert(target);
        }
        if let Some(exist) = self.targets.insert(target, tconfig) {
            warn!("Log target {} declared more than once", exist.target);
        }
    }
    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(self.level.to_string());
        for target in self.targets.values() {
            if let Ok(directive) = format!("{}={}", target.target, target.level).parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }
    fn tag_targets_mut(&mut self, tag: &str) -> impl Iterator<Item = &mut TargetCfg> {
        let members = self.tags.get(tag).cloned().unwrap_or_default();
        self.targets
            .values_mut()
            .filter(move |t| members.contains(t.target))
    }
    fn as_config_string(&self) -> String {
        let mut out = format!("default={}", self.level);
        for target in self.targets.values() {
            out += &format!(",{}={}", target.name, target.level);
        }
        out
    }
}

/// Handle to change log levels of the agent at runtime
#[derive(Debug)]
pub struct LogControl {
    db: Mutex<LogTargetDb>,
    reload_filter: reload::Handle<EnvFilter, Registry>,
}

static LOG_CTL: OnceLock<LogControl> = OnceLock::new();

/// Get the process-wide [`LogControl`], installing the tracing subscriber on first use
pub fn get_log_ctl() -> &'static LogControl {
    LOG_CTL.get_or_init(LogControl::new)
}

impl LogControl {
    fn new() -> Self {
        let db = LogTargetDb::new(LevelFilter::INFO);
        let (filter, reload_filter) = reload::Layer::new(db.env_filter());
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_line_number(true)
            .with_target(true)
            .with_thread_names(true)
            .with_level(true);

        // another subscriber may already be set, e.g. by tracing-test
        if tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .with(ErrorLayer::default())
            .try_init()
            .is_err()
        {
            warn!("A tracing subscriber was already installed");
        }
        Self {
            db: Mutex::new(db),
            reload_filter,
        }
    }
    fn lock(&self) -> MutexGuard<'_, LogTargetDb> {
        // a panic while holding the lock leaves the db usable
        self.db
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
    fn reload(&self, db: &LogTargetDb) {
        if let Err(e) = self.reload_filter.reload(db.env_filter()) {
            error!("Failed to reload log filter: {e}");
        }
    }

    /// Initialize logging and apply a level configuration string such as
    /// `default=info,sonic=debug`.
    pub fn init(config: Option<&str>) -> Result<&'static LogControl, TraceCtlError> {
        let ctl = get_log_ctl();
        if let Some(config) = config {
            ctl.setup_from_string(config)?;
        }
        Ok(ctl)
    }

    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) -> Result<usize, TraceCtlError> {
        let mut db = self.lock();
        if !db.tags.contains_key(tag) {
            return Err(TraceCtlError::UnknownTag(tag.to_owned()));
        }
        let mut changed = 0;
        for target in db.tag_targets_mut(tag) {
            if target.level != level {
                target.level = level;
                changed += 1;
            }
        }
        if changed > 0 {
            self.reload(&db);
        }
        info!("Log level for tag '{tag}' is now {level} ({changed} targets changed)");
        Ok(changed)
    }
    pub fn set_level_all(&self, level: LevelFilter) {
        let mut db = self.lock();
        db.targets.values_mut().for_each(|t| t.level = level);
        self.reload(&db);
    }
    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.lock();
        if db.level != level {
            db.level = level;
            self.reload(&db);
        }
    }
    #[must_use]
    pub fn default_level(&self) -> LevelFilter {
        self.lock().level
    }

    /// Parse comma-separated `tag=level` items
    fn parse_config(input: &str) -> Result<OrderMap<String, LevelFilter>, TraceCtlError> {
        let mut result = OrderMap::new();
        for item in input.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let Some((tag, level)) = item.split_once('=') else {
                return Err(TraceCtlError::Syntax(item.to_owned()));
            };
            let level = LevelFilter::from_str(level.trim())
                .map_err(|_| TraceCtlError::BadLevel(level.trim().to_owned()))?;
            result.insert(tag.trim().to_owned(), level);
        }
        Ok(result)
    }

    /// Apply a configuration string. `default=` sets the default level, `all=` sets every
    /// known target and any other key is a tag. Later items override earlier ones, so
    /// `all=warn,sonic=debug` is valid.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TraceCtlError> {
        let config = Self::parse_config(input)?;
        for (tag, level) in &config {
            match tag.as_str() {
                "default" => self.set_default_level(*level),
                "all" => self.set_level_all(*level),
                tag => {
                    self.set_tag_level(tag, *level)?;
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn target(&self, target: &str) -> Option<TargetCfg> {
        self.lock().targets.get(target).cloned()
    }
    #[must_use]
    pub fn targets_by_tag(&self, tag: &str) -> Vec<TargetCfg> {
        let db = self.lock();
        let Some(members) = db.tags.get(tag) else {
            return vec![];
        };
        db.targets
            .values()
            .filter(|t| members.contains(t.target))
            .cloned()
            .collect()
    }
    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.lock().as_config_string()
    }
    pub fn dump(&self) {
        let db = self.lock();
        info!("{}", LogTargetDbByTag(&db));
    }
}
