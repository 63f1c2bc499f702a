//! Best-effort removal of the ephemeral resources a step leaves behind.
//!
//! Individual deletion failures are logged and collected, never raised; only
//! the inability to construct a scratch configuration at all is fatal, since
//! no cleanup can proceed without one.

use crate::compiler::conf::{JobConf, keys};
use crate::error::{CleanupError, SnapshotError};
use crate::step::{FlowStep, StepLog, StepSnapshot};
use crate::tap::TapRef;

/// What happened to one resource during cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The backing resource was removed.
    Deleted,
    /// Not an ephemeral resource; left in place for the tap cleanup hook.
    Skipped,
    /// Deletion was attempted and failed; cleanup continued regardless.
    Failed(String),
}

/// One `(resource, outcome)` pair of a cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupEntry {
    pub resource: String,
    pub outcome: CleanupOutcome,
}

/// The collected outcomes of a cleanup run: the sink first, then the
/// map-phase traps, then the reduce-phase traps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    entries: Vec<CleanupEntry>,
}

impl CleanupReport {
    pub fn entries(&self) -> &[CleanupEntry] {
        &self.entries
    }

    pub fn failures(&self) -> impl Iterator<Item = &CleanupEntry> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, CleanupOutcome::Failed(_)))
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl FlowStep {
    /// Removes any temporary resources used by this step, logging a warning
    /// for every resource that refuses to go away.
    ///
    /// Safe to run concurrently with cleanup of unrelated steps; each step's
    /// resources are disjoint.
    pub fn clean(&self, parent: &JobConf) -> Result<CleanupReport, CleanupError> {
        let log = self.log();

        let conf = self
            .scratch_conf(parent)
            .map_err(|err| CleanupError::Handle {
                step: self.name().to_string(),
                message: err.to_string(),
            })?;

        let mut report = CleanupReport::default();

        clean_one(&mut report, &log, &conf, self.sink(), "sink");

        for (name, tap) in self.mapper_traps() {
            clean_one(&mut report, &log, &conf, tap, name);
        }

        for (name, tap) in self.reducer_traps() {
            clean_one(&mut report, &log, &conf, tap, name);
        }

        Ok(report)
    }

    /// The working configuration cleanup operates under: the parent
    /// configuration plus this step's embedded identity.
    fn scratch_conf(&self, parent: &JobConf) -> Result<JobConf, SnapshotError> {
        let mut conf = parent.derived();

        conf.set_int(keys::STEP_ID, i64::from(self.id()));
        conf.set(keys::STEP, StepSnapshot::capture(self).to_json()?);

        Ok(conf)
    }
}

fn clean_one(
    report: &mut CleanupReport,
    log: &StepLog,
    conf: &JobConf,
    tap: &TapRef,
    resource: &str,
) {
    let outcome = if tap.is_ephemeral() {
        match tap.delete_path(conf) {
            Ok(()) => CleanupOutcome::Deleted,
            Err(err) => {
                log.warn(format!(
                    "unable to remove temporary resource '{}': {}",
                    tap.identifier(),
                    err
                ));
                CleanupOutcome::Failed(err.to_string())
            }
        }
    } else {
        clean_tap(conf, tap);
        CleanupOutcome::Skipped
    };

    report.entries.push(CleanupEntry {
        resource: resource.to_string(),
        outcome,
    });
}

/// Extension point for reclaiming non-ephemeral taps. Intentionally does
/// nothing today.
fn clean_tap(_conf: &JobConf, _tap: &TapRef) {}
