pub mod file;
pub mod push;
pub mod record;
pub mod sink;

pub use file::FileSink;
pub use push::PushSink;
pub use record::AccessLogRecord;
pub use sink::{LogSink, MemorySink, MultiSink, TracingSink};
