use std::collections::{BTreeMap, HashMap};

use engine_logging::{engine_debug, engine_warn};

use crate::{Job, JobId};

/// A local edit applied on top of the server's list until the server answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingEdit {
    /// Hidden while the delete request is in flight.
    Delete,
}

/// Jobs as last reported by the server, plus an overlay of unconfirmed local edits.
///
/// `base` is only ever replaced wholesale by a poll or trimmed by a confirmed
/// delete, so rolling back an edit is just dropping it from the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSnapshot {
    base: Vec<Job>,
    overlay: BTreeMap<JobId, PendingEdit>,
}

impl JobSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full replace with the server's list. Duplicate ids collapse onto the first
    /// position, carrying the last reported data.
    pub fn replace_all(&mut self, server_list: Vec<Job>) {
        let mut positions: HashMap<JobId, usize> = HashMap::with_capacity(server_list.len());
        let mut next: Vec<Job> = Vec::with_capacity(server_list.len());
        for job in server_list {
            if let Some(&index) = positions.get(&job.id) {
                engine_warn!("Server listed job {} more than once", job.id);
                next[index] = job;
            } else {
                positions.insert(job.id.clone(), next.len());
                next.push(job);
            }
        }

        for job in &next {
            if let Some(previous) = self.base.iter().find(|old| old.id == job.id) {
                if job.status.rank() < previous.status.rank() {
                    engine_warn!(
                        "Job {} moved backwards from {} to {}; keeping server value",
                        job.id,
                        previous.status,
                        job.status
                    );
                }
            }
        }

        self.base = next;
    }

    /// Jobs visible to consumers, in server order, with pending edits applied.
    pub fn visible(&self) -> impl Iterator<Item = &Job> + '_ {
        self.base
            .iter()
            .filter(move |job| !self.overlay.contains_key(&job.id))
    }

    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.visible().find(|job| &job.id == id)
    }

    pub fn len(&self) -> usize {
        self.visible().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_edit(&self, id: &JobId) -> Option<&PendingEdit> {
        self.overlay.get(id)
    }

    /// Hides `id` until the delete is confirmed or rolled back. Returns false if
    /// the id is not visible.
    pub fn begin_delete(&mut self, id: &JobId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.overlay.insert(id.clone(), PendingEdit::Delete);
        true
    }

    /// Server confirmed the delete: drop the entry from the base list.
    pub fn commit_delete(&mut self, id: &JobId) {
        if self.overlay.remove(id).is_none() {
            engine_debug!("Delete confirmation for {} without a pending edit", id);
        }
        self.base.retain(|job| &job.id != id);
    }

    /// Server refused the delete: the entry becomes visible again, unchanged.
    pub fn rollback_delete(&mut self, id: &JobId) {
        if self.overlay.remove(id).is_none() {
            engine_debug!("Delete rollback for {} without a pending edit", id);
        }
    }
}
