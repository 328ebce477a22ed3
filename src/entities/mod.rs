pub mod expedition_log;
pub mod movement_log;
pub mod task;
pub mod task_log;
pub mod user_profile;
pub mod warehouse_slot;
pub mod warehouse_supply;
pub mod warehouse_supply_log;
