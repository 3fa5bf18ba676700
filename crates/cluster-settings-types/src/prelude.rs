pub use crate::error::{ClResult, Error};
pub use crate::types::{Class, InternalKey, SettingName, TenantKind, ValueOrigin, Visibility};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
