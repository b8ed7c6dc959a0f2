pub mod bar_reader;
pub mod pipeline;
pub mod report;
pub mod row_writer;
pub use bar_reader::BarReader;
pub use pipeline::{run, InvalidBarPolicy, RunStats};
pub use report::Report;
pub use row_writer::{RowWriter, COLUMNS};
