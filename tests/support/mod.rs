#[cfg(unix)]
pub mod fake_tools;
