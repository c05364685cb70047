//! Validated edits to project timelines.
//!
//! The board renders whatever is stored; these operations are the write path
//! used by the editor and keep dependencies unique and acyclic.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use super::{DependencyKind, Milestone, Project, ProjectTimeline, TimelineDependency};
use crate::error::TimelineError;

fn find(projects: &[Project], id: Uuid) -> Result<&Project, TimelineError> {
    projects
        .iter()
        .find(|p| p.id == id)
        .ok_or(TimelineError::UnknownProject(id))
}

fn timeline_mut(project: &mut Project) -> Result<&mut ProjectTimeline, TimelineError> {
    let name = project.name.clone();
    project.timeline.as_mut().ok_or(TimelineError::NoTimeline(name))
}

/// Opt a project into scheduling, starting `today` with default values.
/// An existing (possibly disabled) timeline is re-enabled instead.
pub fn enable(project: &mut Project, today: NaiveDate) {
    match project.timeline.as_mut() {
        Some(timeline) => timeline.enabled = true,
        None => project.timeline = Some(ProjectTimeline::new(today)),
    }
    project.touch();
}

/// Remove the timeline together with its milestones and dependencies.
pub fn detach(project: &mut Project) {
    project.timeline = None;
    project.touch();
}

/// True if `from` reaches `to` by following stored dependencies.
fn reaches(projects: &[Project], from: Uuid, to: Uuid) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();
    while let Some(id) = stack.pop() {
        if id == to {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        if let Some(timeline) = projects.iter().find(|p| p.id == id).and_then(|p| p.timeline.as_ref()) {
            stack.extend(timeline.dependencies.iter().map(|d| d.project_id));
        }
    }
    false
}

/// Make `target` depend on `source`.
pub fn add_dependency(
    projects: &mut [Project],
    target: Uuid,
    source: Uuid,
    kind: DependencyKind,
) -> Result<(), TimelineError> {
    if target == source {
        return Err(TimelineError::SelfDependency);
    }
    let source_name = find(projects, source)?.name.clone();
    let target_project = find(projects, target)?;
    let target_name = target_project.name.clone();

    let timeline = target_project
        .timeline
        .as_ref()
        .ok_or_else(|| TimelineError::NoTimeline(target_name.clone()))?;
    if timeline.depends_on(source) {
        return Err(TimelineError::DuplicateDependency {
            target: target_name,
            source_name,
        });
    }
    if reaches(projects, source, target) {
        return Err(TimelineError::Cycle {
            target: target_name,
            source_name,
        });
    }

    let project = projects
        .iter_mut()
        .find(|p| p.id == target)
        .ok_or(TimelineError::UnknownProject(target))?;
    timeline_mut(project)?.dependencies.push(TimelineDependency {
        project_id: source,
        kind,
    });
    project.touch();
    tracing::debug!(target = %target_name, source = %source_name, kind = kind.short_label(), "dependency added");
    Ok(())
}

pub fn remove_dependency(project: &mut Project, source: Uuid) -> Result<(), TimelineError> {
    timeline_mut(project)?
        .dependencies
        .retain(|d| d.project_id != source);
    project.touch();
    Ok(())
}

pub fn add_milestone(
    project: &mut Project,
    name: impl Into<String>,
    date: NaiveDate,
) -> Result<Uuid, TimelineError> {
    let milestone = Milestone::new(name, date);
    let id = milestone.id;
    let timeline = timeline_mut(project)?;
    timeline.milestones.push(milestone);
    timeline
        .milestones
        .sort_by_key(|m| m.date.date().unwrap_or(NaiveDate::MAX));
    project.touch();
    Ok(id)
}

pub fn toggle_milestone(project: &mut Project, milestone: Uuid) -> Result<bool, TimelineError> {
    let entry = timeline_mut(project)?
        .milestones
        .iter_mut()
        .find(|m| m.id == milestone)
        .ok_or(TimelineError::MilestoneNotFound(milestone))?;
    entry.completed = !entry.completed;
    let completed = entry.completed;
    project.touch();
    Ok(completed)
}

pub fn remove_milestone(project: &mut Project, milestone: Uuid) -> Result<(), TimelineError> {
    let timeline = timeline_mut(project)?;
    let before = timeline.milestones.len();
    timeline.milestones.retain(|m| m.id != milestone);
    if timeline.milestones.len() == before {
        return Err(TimelineError::MilestoneNotFound(milestone));
    }
    project.touch();
    Ok(())
}

pub fn set_progress(project: &mut Project, progress: u8) -> Result<(), TimelineError> {
    timeline_mut(project)?.progress = progress.min(100);
    project.touch();
    Ok(())
}
