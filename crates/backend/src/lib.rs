#![forbid(unsafe_code)]

pub mod contract;
pub mod memory;
pub mod remote;

pub use contract::{
    AccessControl, AvatarStore, Backend, BackendError, CourseCatalog, IdentityProvider,
    NewCourseRecord, ProfileStore, ProgressStore, ProgressUpsert,
};
pub use memory::InMemoryBackend;
pub use remote::{RemoteBackend, RemoteConfig, RemoteConfigError};
