//! Domain model (IDs, image descriptors, policy, plan, report, errors).

pub mod ids;
pub mod timestamp;
pub mod image;
pub mod policy;
pub mod plan;
pub mod report;
pub mod errors;

pub use ids::{Id, IdMarker, ImageId, SnapshotId};
pub use timestamp::{CREATION_DATE_FORMAT, CreationDate};
pub use image::{BlockDevice, ImageDescriptor};
pub use policy::{IDENTIFIER_TAG_KEY, RetentionPolicy, TagFilter};
pub use plan::RetentionPlan;
pub use report::RetentionReport;
pub use errors::{CullerError, ErrorKind, ProviderError, ProviderOperation};
