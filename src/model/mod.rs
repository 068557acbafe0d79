pub mod layout;
pub mod task;
pub mod timeline;
pub mod tree;
pub mod view;

pub use layout::BarLayout;
pub use task::{Task, TaskId, TaskPatch};
pub use timeline::{DateRange, Granularity, TimeUnit};
pub use view::{CurrentMarker, TimelinePlacement, ViewAction, ViewState};
