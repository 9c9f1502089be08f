pub mod bthid;
