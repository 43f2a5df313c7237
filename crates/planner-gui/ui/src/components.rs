mod day_cell;
mod filters_panel;
mod month_grid;
mod task_chip;
mod task_modal;
mod toolbar;
mod video_overlay;

pub use day_cell::DayCellView;
pub use filters_panel::FiltersPanel;
pub use month_grid::MonthGrid;
pub use task_chip::TaskChip;
pub use task_modal::TaskModal;
pub use toolbar::Toolbar;
pub use video_overlay::VideoOverlay;
