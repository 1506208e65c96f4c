//! History Loader: the user's listening export and saved library.

mod load;
mod models;

pub use load::{
    discover_history_partitions, load_streaming_history, read_history_partition, read_library,
    read_streaming_history, LIBRARY_FILE_NAME,
};
pub use models::{parse_end_time, track_key, LibraryEntry, StreamEvent, END_TIME_FORMAT};
