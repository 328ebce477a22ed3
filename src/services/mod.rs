pub mod captures;
pub mod expeditions;
pub mod imports;
pub mod movements;
pub mod profiles;
pub mod reports;
pub mod slots;
pub mod speech;
pub mod supplies;
pub mod tasks;
