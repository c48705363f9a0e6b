mod record;

pub use self::record::{NewRecord, ReferenceRecord};
pub(crate) use self::record::RecordRow;
