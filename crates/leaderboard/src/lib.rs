pub mod entities;
pub mod run_id;
pub mod run_time;
pub mod service;
pub mod views;

pub use entities::{RunType, SortDirection, UserRole};
pub use service::{
    CreateCategoryError, CreateLeaderboardError, CreateRunError, DeleteCategoryError,
    LeaderboardService, ListRunsError, NewCategory, NewRun, Page, RunsPage,
};
pub use views::{CategoryView, LeaderboardView, RunView, UserView};
