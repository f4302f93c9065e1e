mod builder;
mod construct;
pub mod gc;
mod instance;
mod record_type;
mod reduce;
mod replace;
mod repr;

pub use builder::{build_type, build_type_with};
pub use construct::{FieldMap, construct, construct_from_value};
pub use gc::{Collector, InstanceId, NoopCollector, Traceable, Traced, TrackingCollector};
pub use instance::RecordInstance;
pub use record_type::{RecordType, TypeRef};
pub use reduce::{Reduced, ReducedRecord, reduce};
pub use repr::{repr, value_repr};
