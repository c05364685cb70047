pub mod board;
pub mod dialogs;
pub mod project_list;
pub mod theme;
pub mod timeline_editor;
pub mod toolbar;
