pub use cluster_settings_types::prelude::*;

pub use crate::setting::{NonMaskedSetting, Setting};

// vim: ts=4
