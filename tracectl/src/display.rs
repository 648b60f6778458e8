// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Display implementations

use crate::control::{LogTargetDb, TargetCfg};
use std::fmt::Display;

impl Display for TargetCfg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<48} : {:<5}", self.target, self.level)
    }
}

pub(crate) struct LogTargetDbByTag<'a>(pub(crate) &'a LogTargetDb);
impl Display for LogTargetDbByTag<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let db = self.0;
        writeln!(f)?;
        writeln!(f, " ──────── Log targets by tag (default: {}) ────────", db.level)?;
        for (tag, members) in &db.tags {
            writeln!(f, " {tag}:")?;
            for target in db.targets.values().filter(|t| members.contains(t.target)) {
                writeln!(f, "    {target}")?;
            }
        }
        Ok(())
    }
}
