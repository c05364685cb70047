pub mod capacity;
pub mod color;
pub mod contact;
pub mod directory;
pub mod project;
pub mod scheduling;
pub mod timeline;

pub use capacity::{CapacityEntry, CapacityUtilization, QuarterKey, QuarterSlot};
pub use color::Rgb;
pub use contact::Contact;
pub use directory::Directory;
pub use project::{Project, ProjectStatus};
pub use timeline::{
    CalendarDate, DependencyKind, Milestone, ProjectTimeline, TimelineDependency, TimelineWindow,
};
