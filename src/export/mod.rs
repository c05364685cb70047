//! Static, paginated export of the timeline.
//!
//! [`renderer`] lays the timeline out onto pages, [`svg`] encodes them and a
//! [`sink::ExportSink`] delivers the result.

pub mod document;
pub mod renderer;
pub mod sink;
pub mod svg;

pub use document::{ExportDocument, PageKind, PageSize};
pub use renderer::{render_document, ExportOptions};
pub use sink::{ExportReceipt, ExportSink, LocalFileSink};
