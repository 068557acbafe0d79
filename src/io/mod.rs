pub mod csv_export;
pub mod csv_import;
pub mod png_export;

pub use csv_export::{export_csv, export_csv_string, write_csv};
pub use csv_import::{import_csv, parse_csv};
pub use png_export::{ensure_png_extension, write_png};
