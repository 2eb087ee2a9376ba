// Version string shown in the host's footer

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_string() -> String {
    format!("v{}", VERSION)
}

pub fn full_version_info() -> String {
    format!("FINISH site {}", version_string())
}
