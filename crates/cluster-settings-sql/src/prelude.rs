pub use cluster_settings::prelude::*;

// vim: ts=4
