//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the portal's four tables. None of them reference
//! each other: device and category are free-text tags.

pub mod guideline;
pub mod maintenance_log;
pub mod setting;
pub mod work_log;

// Re-export specific types to avoid conflicts
pub use guideline::{Column as GuidelineColumn, Entity as Guideline, Model as GuidelineModel};
pub use maintenance_log::{
    Column as MaintenanceLogColumn, Entity as MaintenanceLog, Model as MaintenanceLogModel,
};
pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel, SettingKey};
pub use work_log::{Column as WorkLogColumn, Entity as WorkLog, Model as WorkLogModel};
