pub mod control;
pub mod hid_report;
pub mod report_descriptor;

#[cfg(test)]
mod control_test;
