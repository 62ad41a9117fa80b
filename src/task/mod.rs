/*!
 * Task Module
 * Task records and the arena that owns them
 */

pub mod record;
pub mod table;

pub use record::{TaskContext, TaskRecord};
pub use table::{TaskHandle, TaskTable};
