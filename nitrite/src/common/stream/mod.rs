mod document_cursor;
mod joined_cursor;
mod projected_cursor;
pub(crate) mod single_stream;
pub(crate) mod indexed_stream;
pub(crate) mod map_values;
pub(crate) mod filtered_stream;
pub(crate) mod unique_stream;
pub(crate) mod union_stream;
pub(crate) mod sorted_stream;

pub use document_cursor::*;
pub use joined_cursor::*;
pub use projected_cursor::*;



