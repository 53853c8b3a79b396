pub mod frame;
pub mod table_io;
pub mod report_io;

pub use frame::{Column, ColumnData, Frame};
pub use table_io::{read_table, read_table_str, write_csv};
pub use report_io::{load_json, save_json};
